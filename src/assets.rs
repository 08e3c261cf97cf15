// Decodes the two pictures and scales them onto the viewport grid.
// Visual: both end up stretched to exactly width x height, so pixel (x,y)
// of the overlay sits right on top of pixel (x,y) of the base.

use std::path::Path;

use image::{imageops::FilterType, RgbaImage};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{pack_argb, FrameBuffer};

pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|e| Error::ImageLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), width = img.width(), height = img.height(), "decoded image");
    Ok(img.to_rgba8())
}

/// Stretch `img` to `width x height` and pack it as 0xAARRGGBB.
pub fn to_frame(img: &RgbaImage, width: usize, height: usize) -> FrameBuffer {
    let resized;
    let src = if img.width() as usize == width && img.height() as usize == height {
        img
    } else {
        resized = image::imageops::resize(img, width as u32, height as u32, FilterType::Triangle);
        &resized
    };
    let pixels = src.pixels().map(|p| pack_argb(p[3], p[0], p[1], p[2])).collect();
    FrameBuffer { width, height, pixels }
}

/// Overlay (drawn on top, erased by the reveal) and base (revealed underneath),
/// kept at decoded size so a resize can rescale from the originals.
pub struct ImagePair {
    overlay: RgbaImage,
    base: RgbaImage,
}

impl ImagePair {
    pub fn new(overlay: RgbaImage, base: RgbaImage) -> Self {
        Self { overlay, base }
    }

    pub fn load(overlay: &Path, base: &Path) -> Result<Self> {
        Ok(Self::new(load_rgba(overlay)?, load_rgba(base)?))
    }

    /// (overlay, base) at viewport size.
    pub fn scaled(&self, width: usize, height: usize) -> (FrameBuffer, FrameBuffer) {
        (to_frame(&self.overlay, width, height), to_frame(&self.base, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn same_size_is_packed_verbatim() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));
        let fb = to_frame(&img, 3, 2);
        assert_eq!(fb.pixels, vec![pack_argb(4, 1, 2, 3); 6]);
    }

    #[test]
    fn pair_scales_both_to_the_viewport() {
        let pair = ImagePair::new(
            RgbaImage::from_pixel(10, 20, Rgba([255, 0, 0, 255])),
            RgbaImage::from_pixel(40, 5, Rgba([0, 0, 255, 255])),
        );
        let (over, base) = pair.scaled(16, 12);
        assert!(over.same_size(&base));
        assert_eq!((over.width, over.height), (16, 12));
        assert_eq!(over.pixels[0], 0xFF_FF_00_00);
        assert_eq!(base.pixels[0], 0xFF_00_00_FF);
    }

    #[test]
    fn missing_file_is_an_image_load_error() {
        let err = load_rgba(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }
}
