// Tiny deterministic RNG: jitter, decay variation and drift all draw from here,
// so a fixed seed replays the same reveal.

/// Xorshift32. Fast and good enough for visual noise.
#[derive(Clone, Debug)]
pub struct Rng32 { state: u32 }

impl Rng32 {
    pub fn from_seed(seed: u32) -> Self { Self { state: seed | 1 } }

    #[inline] pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform [0,1)
    #[inline] pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / ((1u32 << 24) as f32)
    }

    #[inline] pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Uniform [-half, half)
    #[inline] pub fn centered(&mut self, half: f32) -> f32 {
        self.range(-half, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Rng32::from_seed(42);
        let mut b = Rng32::from_seed(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn floats_stay_in_range() {
        let mut r = Rng32::from_seed(0);
        for _ in 0..10_000 {
            let v = r.next_f32();
            assert!((0.0..1.0).contains(&v));
            let c = r.centered(10.0);
            assert!((-10.0..10.0).contains(&c));
        }
    }
}
