// Per-frame layering: base at the bottom, overlay on top with its alpha eaten
// by the reveal mask, then flattened into the frame the window shows.

use crate::error::{Error, Result};
use crate::gamma::GammaLut;
use crate::types::{alpha_of, with_alpha, FrameBuffer, Mask, Region};

pub struct Compositor {
    lut: GammaLut,
    layer: FrameBuffer, // overlay copy whose alpha we attenuate
    frame: FrameBuffer, // flattened result, 0x00RRGGBB
}

impl Compositor {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            lut: GammaLut::new(),
            layer: FrameBuffer::filled(width, height, 0),
            frame: FrameBuffer::filled(width, height, 0),
        }
    }

    /// Build this frame.
    ///
    /// `opacity` scales the whole overlay (the intro cross-fade uses it; 1.0 otherwise).
    /// Only pixels inside `region` read the mask; everything else keeps the
    /// overlay's own alpha.
    pub fn compose(
        &mut self,
        base: &FrameBuffer,
        overlay: &FrameBuffer,
        mask: &Mask,
        region: Option<Region>,
        opacity: f32,
    ) -> Result<&FrameBuffer> {
        if !base.same_size(overlay) || !base.same_size(&self.frame) {
            return Err(Error::dimensions(format!(
                "compose: base {}x{}, overlay {}x{}, frame {}x{}",
                base.width, base.height, overlay.width, overlay.height, self.frame.width, self.frame.height
            )));
        }
        if mask.width != base.width || mask.height != base.height {
            return Err(Error::dimensions("compose: mask does not match the images"));
        }

        // 1) bottom layer
        for (dst, &src) in self.frame.pixels.iter_mut().zip(&base.pixels) {
            *dst = src & 0x00FF_FFFF;
        }
        // 2) top layer
        self.layer.pixels.copy_from_slice(&overlay.pixels);

        let opacity = opacity.clamp(0.0, 1.0);
        if opacity < 1.0 {
            for px in &mut self.layer.pixels {
                let a = (alpha_of(*px) as f32 * opacity).floor() as u8;
                *px = with_alpha(*px, a);
            }
        }

        // 3) punch the reveal into the overlay's alpha
        if let Some(r) = region {
            let w = self.layer.width;
            for y in r.y0..r.y1 {
                for x in r.x0..r.x1 {
                    let reveal = mask.get(x, y);
                    if reveal <= 0.0 { continue; }
                    let idx = y * w + x;
                    let px = self.layer.pixels[idx];
                    let a = (alpha_of(px) as f32 * (1.0 - reveal)).floor() as u8;
                    self.layer.pixels[idx] = with_alpha(px, a);
                }
            }
        }

        // 4) flatten top over bottom
        for (dst, &top) in self.frame.pixels.iter_mut().zip(&self.layer.pixels) {
            match alpha_of(top) {
                0 => {}
                255 => *dst = top & 0x00FF_FFFF,
                a => *dst = self.lut.mix(*dst, top, a as f32 / 255.0),
            }
        }

        Ok(&self.frame)
    }

    /// Overlay after this frame's alpha attenuation.
    pub fn layer(&self) -> &FrameBuffer {
        &self.layer
    }
}
