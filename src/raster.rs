// Mask rasterizer. Two reveal sources fill the same Mask:
// • FieldRasterizer samples the summed blob field on a coarse grid inside the
//   blobs' bounding box, upsamples bilinearly and maps it through the
//   threshold + smoothstep curve. Nothing persists between frames.
// • TrailBuffer keeps a per-pixel accumulation that fades by a fixed step each
//   tick and is dabbed with soft stamps at every new spawn.
// Both return the region they touched, or None when nothing is revealed.
// Visual: soft-edged liquid holes that merge where blobs overlap.

use crate::config::RevealConfig;
use crate::field::BlobField;
use crate::rng::Rng32;
use crate::types::{Mask, Region, Stamp};

#[inline]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Map a raw field value to a reveal amount in [0,1].
/// At or below `low` this is 0, at or above `high` it is 1.
pub fn reveal_amount(f: f32, low: f32, high: f32, passes: u32) -> f32 {
    if !(f > low) {
        return 0.0;
    }
    let mut t = ((f - low) / (high - low)).clamp(0.0, 1.0);
    for _ in 0..passes {
        t = smoothstep(t);
    }
    t
}

pub struct FieldRasterizer {
    width: usize,
    height: usize,
    scale: usize,
    grid_w: usize,
    grid_h: usize,
    grid: Vec<f32>, // coarse field samples, row-major grid_w x grid_h
}

impl FieldRasterizer {
    pub fn new(width: usize, height: usize, downsample: usize) -> Self {
        let scale = downsample.max(1);
        let grid_w = width.div_ceil(scale);
        let grid_h = height.div_ceil(scale);
        Self { width, height, scale, grid_w, grid_h, grid: vec![0.0; grid_w * grid_h] }
    }

    /// Bounding box on the coarse grid, clamped to it.
    fn grid_region(&self, field: &BlobField, cfg: &RevealConfig) -> Option<Region> {
        let s = self.scale as f32;
        let (x0, y0, x1, y1) = field.bounds(cfg.margin_px())?;
        Region::clamped(x0 / s, y0 / s, x1 / s, y1 / s, self.grid_w, self.grid_h)
    }

    pub fn rasterize(&mut self, field: &BlobField, cfg: &RevealConfig, mask: &mut Mask) -> Option<Region> {
        let Some(g) = self.grid_region(field, cfg) else {
            mask.reset_to(None);
            return None;
        };

        // One extra column/row so bilinear lookups at the far edge read fresh samples.
        let sx1 = (g.x1 + 1).min(self.grid_w);
        let sy1 = (g.y1 + 1).min(self.grid_h);
        for sy in g.y0..sy1 {
            for sx in g.x0..sx1 {
                let px = (sx * self.scale) as f32;
                let py = (sy * self.scale) as f32;
                self.grid[sy * self.grid_w + sx] = field.field_at(px, py, cfg.center_gain);
            }
        }

        let region = Region {
            x0: g.x0 * self.scale,
            y0: g.y0 * self.scale,
            x1: (g.x1 * self.scale).min(self.width),
            y1: (g.y1 * self.scale).min(self.height),
        };
        mask.reset_to(Some(region));

        let inv = 1.0 / self.scale as f32;
        for y in region.y0..region.y1 {
            let fy = y as f32 * inv;
            let y0 = fy.floor() as usize;
            let y1 = (y0 + 1).min(self.grid_h - 1);
            let dy = fy - y0 as f32;
            for x in region.x0..region.x1 {
                let fx = x as f32 * inv;
                let x0 = fx.floor() as usize;
                let x1 = (x0 + 1).min(self.grid_w - 1);
                let dx = fx - x0 as f32;

                let f00 = self.grid[y0 * self.grid_w + x0];
                let f10 = self.grid[y0 * self.grid_w + x1];
                let f01 = self.grid[y1 * self.grid_w + x0];
                let f11 = self.grid[y1 * self.grid_w + x1];
                let f = f00 * (1.0 - dx) * (1.0 - dy)
                    + f10 * dx * (1.0 - dy)
                    + f01 * (1.0 - dx) * dy
                    + f11 * dx * dy;

                let a = reveal_amount(f, cfg.low_threshold, cfg.high_threshold, cfg.smoothstep_passes);
                mask.set(x, y, a);
            }
        }
        Some(region)
    }
}

/// Make a circular Gaussian stamp with peak 1.0 at the center.
pub fn make_gaussian_stamp(radius: i32, sigma: f32) -> Stamp {
    let d = 2 * radius + 1;
    let mut weights = Vec::with_capacity((d * d) as usize);
    let s2 = 2.0 * sigma * sigma;
    let mut maxw = 0.0_f32;

    for y in -radius..=radius {
        for x in -radius..=radius {
            let r2 = (x as f32) * (x as f32) + (y as f32) * (y as f32);
            // zero outside the disc so the stamp is round, not square
            let w = if r2 > (radius * radius) as f32 { 0.0 } else { (-r2 / s2).exp() };
            if w > maxw { maxw = w; }
            weights.push(w);
        }
    }
    // Normalize to peak 1.0 (not sum=1); we want full strength at the center
    if maxw > 0.0 {
        for w in &mut weights { *w /= maxw; }
    }

    Stamp { radius, weights }
}

pub struct TrailBuffer {
    width: usize,
    height: usize,
    cells: Vec<f32>,
    active: Option<Region>, // everything non-zero lies in here
    stamp: Stamp,
    satellite: Stamp,
}

impl TrailBuffer {
    pub fn new(width: usize, height: usize, cfg: &RevealConfig) -> Self {
        let r = cfg.blob_radius.round().max(1.0) as i32;
        let sr = (cfg.blob_radius * 0.35).round().max(1.0) as i32;
        Self {
            width,
            height,
            cells: vec![0.0; width * height],
            active: None,
            stamp: make_gaussian_stamp(r, r as f32 * 0.5),
            satellite: make_gaussian_stamp(sr, sr as f32 * 0.5),
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.cells[y * self.width + x]
    }

    /// Pull every live cell toward zero by `step`. Clears `active` once all are zero.
    pub fn fade(&mut self, step: f32) {
        let Some(r) = self.active else { return };
        let mut any = false;
        for y in r.y0..r.y1 {
            let row = y * self.width;
            for v in &mut self.cells[row + r.x0..row + r.x1] {
                *v = (*v - step).max(0.0);
                any |= *v > 0.0;
            }
        }
        if !any {
            self.active = None;
        }
    }

    /// Add a stamp at (cx,cy) scaled by `gain`, clamping each cell to 1.0.
    fn dab(&mut self, cx: i32, cy: i32, which: StampKind, gain: f32) {
        let stamp = match which {
            StampKind::Main => &self.stamp,
            StampKind::Satellite => &self.satellite,
        };
        let r = stamp.radius;
        let Some(bounds) = Region::clamped(
            (cx - r) as f32,
            (cy - r) as f32,
            (cx + r + 1) as f32,
            (cy + r + 1) as f32,
            self.width,
            self.height,
        ) else {
            return;
        };
        let d = (2 * r + 1) as usize;
        for sy in bounds.y0..bounds.y1 {
            let ky = (sy as i32 - cy + r) as usize;
            for sx in bounds.x0..bounds.x1 {
                let kx = (sx as i32 - cx + r) as usize;
                let idx = sy * self.width + sx;
                let a = self.cells[idx] + stamp.weights[ky * d + kx] * gain;
                self.cells[idx] = a.min(1.0);
            }
        }
        self.active = Some(match self.active {
            Some(prev) => prev.union(bounds),
            None => bounds,
        });
    }

    /// Paint a soft spot plus a few smaller satellites at each new reveal point.
    pub fn paint(&mut self, points: &[(f32, f32)], cfg: &RevealConfig, rng: &mut Rng32) {
        let spread = cfg.blob_radius * 0.6;
        for &(x, y) in points {
            self.dab(x.round() as i32, y.round() as i32, StampKind::Main, 1.0);
            for _ in 0..cfg.trail_satellites {
                let ox = x + rng.centered(spread);
                let oy = y + rng.centered(spread);
                let gain = rng.range(0.3, 0.6);
                self.dab(ox.round() as i32, oy.round() as i32, StampKind::Satellite, gain);
            }
        }
    }

    /// One tick of the persistent source: fade, paint, copy into the mask.
    pub fn rasterize(
        &mut self,
        points: &[(f32, f32)],
        cfg: &RevealConfig,
        rng: &mut Rng32,
        mask: &mut Mask,
    ) -> Option<Region> {
        self.fade(cfg.trail_fade_step());
        self.paint(points, cfg, rng);

        mask.reset_to(self.active);
        let r = self.active?;
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                mask.set(x, y, smoothstep(self.get(x, y)));
            }
        }
        Some(r)
    }

    pub fn active(&self) -> Option<Region> {
        self.active
    }
}

#[derive(Clone, Copy)]
enum StampKind {
    Main,
    Satellite,
}
