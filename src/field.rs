// The live blob collection. Spawn order is kept so eviction is FIFO.

use std::collections::VecDeque;

use crate::blob::Blob;
use crate::config::RevealConfig;
use crate::rng::Rng32;

pub struct BlobField {
    blobs: VecDeque<Blob>,
    max_blobs: usize,
}

impl BlobField {
    pub fn new(max_blobs: usize) -> Self {
        Self { blobs: VecDeque::with_capacity(max_blobs + 1), max_blobs }
    }

    /// Append, evicting from the front until we are back under the cap.
    pub fn add(&mut self, blob: Blob) {
        self.blobs.push_back(blob);
        while self.blobs.len() > self.max_blobs {
            self.blobs.pop_front();
        }
    }

    /// Advance every blob one tick, then drop the dead ones.
    pub fn tick(&mut self, cfg: &RevealConfig, rng: &mut Rng32) {
        for b in self.blobs.iter_mut() {
            b.update(cfg, rng);
        }
        self.blobs.retain(|b| !b.is_expired());
    }

    /// Summed field at (px,py). Overlaps add, which is what makes blobs merge.
    #[inline]
    pub fn field_at(&self, px: f32, py: f32, center_gain: f32) -> f32 {
        self.blobs.iter().map(|b| b.field_at(px, py, center_gain)).sum()
    }

    /// (min_x, min_y, max_x, max_y) of all centers padded by `margin`, or None when idle.
    pub fn bounds(&self, margin: f32) -> Option<(f32, f32, f32, f32)> {
        self.blobs.iter().fold(None, |acc, b| {
            let (x0, y0, x1, y1) = (b.x - margin, b.y - margin, b.x + margin, b.y + margin);
            Some(match acc {
                None => (x0, y0, x1, y1),
                Some((a0, b0, a1, b1)) => (a0.min(x0), b0.min(y0), a1.max(x1), b1.max(y1)),
            })
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Blob> {
        self.blobs.iter()
    }

    pub fn len(&self) -> usize { self.blobs.len() }
    pub fn is_empty(&self) -> bool { self.blobs.is_empty() }
    pub fn clear(&mut self) { self.blobs.clear(); }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(field: &mut BlobField, id: u64, x: f32, y: f32, cfg: &RevealConfig, rng: &mut Rng32) {
        field.add(Blob::spawn(id, x, y, cfg, rng));
    }

    #[test]
    fn eviction_is_fifo() {
        let cfg = RevealConfig::default();
        let mut rng = Rng32::from_seed(1);
        let mut field = BlobField::new(22);
        for id in 0..30 {
            spawn(&mut field, id, id as f32 * 10.0, 0.0, &cfg, &mut rng);
            assert!(field.len() <= 22);
        }
        let ids: Vec<u64> = field.iter().map(|b| b.id).collect();
        assert_eq!(ids, (8..30).collect::<Vec<_>>());
    }

    #[test]
    fn tick_prunes_expired() {
        let cfg = RevealConfig::default();
        let mut rng = Rng32::from_seed(2);
        let mut field = BlobField::new(4);
        spawn(&mut field, 0, 10.0, 10.0, &cfg, &mut rng);
        spawn(&mut field, 1, 20.0, 10.0, &cfg, &mut rng);
        let mut guard = 0;
        while !field.is_empty() {
            let before = field.len();
            field.tick(&cfg, &mut rng);
            assert!(field.len() <= before);
            guard += 1;
            assert!(guard < 1000);
        }
        assert!(field.bounds(10.0).is_none());
    }

    #[test]
    fn sum_dominates_each_contribution() {
        let cfg = RevealConfig::default();
        let mut rng = Rng32::from_seed(3);
        let mut field = BlobField::new(8);
        spawn(&mut field, 0, 40.0, 40.0, &cfg, &mut rng);
        spawn(&mut field, 1, 70.0, 40.0, &cfg, &mut rng);
        spawn(&mut field, 2, 55.0, 60.0, &cfg, &mut rng);
        for &(px, py) in &[(40.0, 40.0), (55.0, 45.0), (0.0, 0.0), (200.0, 3.0)] {
            let total = field.field_at(px, py, cfg.center_gain);
            let best = field
                .iter()
                .map(|b| b.field_at(px, py, cfg.center_gain))
                .fold(0.0f32, f32::max);
            assert!(total >= 0.0);
            assert!(total >= best);
        }
    }

    #[test]
    fn bounds_cover_every_center_plus_margin() {
        let cfg = RevealConfig::default();
        let mut rng = Rng32::from_seed(4);
        let mut field = BlobField::new(8);
        spawn(&mut field, 0, 10.0, 90.0, &cfg, &mut rng);
        spawn(&mut field, 1, 60.0, 20.0, &cfg, &mut rng);
        assert_eq!(field.bounds(5.0), Some((5.0, 15.0, 65.0, 95.0)));
    }
}
