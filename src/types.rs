// Core buffers shared by the rasterizer, compositor and window.

#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0xAARRGGBB; minifb ignores the top byte
}

impl FrameBuffer {
    /// A buffer filled with one packed colour.
    pub fn filled(width: usize, height: usize, argb: u32) -> Self {
        Self { width, height, pixels: vec![argb; width * height] }
    }

    pub fn same_size(&self, other: &FrameBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }
}

#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn alpha_of(px: u32) -> u8 {
    (px >> 24) as u8
}

#[inline]
pub fn with_alpha(px: u32, a: u8) -> u32 {
    (px & 0x00FF_FFFF) | ((a as u32) << 24)
}

/// Reveal amount in [0,1] per pixel; 1 = base fully visible, 0 = overlay untouched.
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub reveal: Vec<f32>,  // length = width * height, values clamped to [0.0, 1.0]
    dirty: Option<Region>, // area written since the last clear
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, reveal: vec![0.0; width * height], dirty: None }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.reveal[y * self.width + x]
    }

    /// Write one cell, clamping into [0,1].
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        self.reveal[y * self.width + x] = v.clamp(0.0, 1.0);
    }

    /// Zero whatever the previous frame wrote and remember `next` as the new dirty area.
    pub fn reset_to(&mut self, next: Option<Region>) {
        if let Some(r) = self.dirty.take() {
            for y in r.y0..r.y1 {
                let row = y * self.width;
                self.reveal[row + r.x0..row + r.x1].fill(0.0);
            }
        }
        self.dirty = next;
    }

    pub fn is_clear(&self) -> bool {
        self.dirty.is_none()
    }
}

/// Precomputed circular Gaussian "stamp" painted into the trail buffer.
pub struct Stamp {
    pub radius: i32,       // pixels from center to edge
    pub weights: Vec<f32>, // (2r+1)*(2r+1), centered kernel, already normalized to peak 1.0
}

/// Half-open pixel rectangle `[x0,x1) x [y0,y1)`, always inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Region {
    /// Build from float bounds, clamped to `[0,width) x [0,height)`. None when empty.
    pub fn clamped(min_x: f32, min_y: f32, max_x: f32, max_y: f32, width: usize, height: usize) -> Option<Self> {
        let x0 = min_x.floor().max(0.0) as usize;
        let y0 = min_y.floor().max(0.0) as usize;
        let x1 = (max_x.ceil().max(0.0) as usize).min(width);
        let y1 = (max_y.ceil().max(0.0) as usize).min(height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Self { x0, y0, x1, y1 })
    }

    pub fn union(self, other: Region) -> Region {
        Region {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}
