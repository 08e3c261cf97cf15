// sRGB <-> linear lookup tables so the overlay can be mixed over the base
// in linear light without a powf per channel per pixel.

use crate::types::pack_argb;

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1) as f32
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255) via 4096-step quantization
    linear_to_srgb: [u8; 4096],
}

impl GammaLut {
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = (i as f32) / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Source-over of `top` onto `bottom` at coverage `a` in [0,1], mixed in linear light.
    /// Returns a 0x00RRGGBB pixel.
    #[inline]
    pub fn mix(&self, bottom: u32, top: u32, a: f32) -> u32 {
        let inv = 1.0 - a;
        let ch = |shift: u32| {
            let b = self.srgb_u8_to_linear(((bottom >> shift) & 0xFF) as u8);
            let t = self.srgb_u8_to_linear(((top >> shift) & 0xFF) as u8);
            self.linear_to_srgb_u8(a * t + inv * b)
        };
        pack_argb(0, ch(16), ch(8), ch(0))
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}
