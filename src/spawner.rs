// Turns the pointer stream into new blobs.
//
// Input handlers only touch `PointerState`; the spawner reads it once per
// tick, so spawn rate is tied to the frame cadence rather than to how often
// the OS reports mouse motion.

use crate::blob::Blob;
use crate::config::RevealConfig;
use crate::field::BlobField;
use crate::rng::Rng32;

/// Latest pointer sample in image pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub active: bool,
    /// Bumped on every enter / touch start; a new gesture never continues the last one's trail.
    pub gesture: u32,
}

impl PointerState {
    /// Enter / move / touch start / touch move.
    pub fn move_to(&mut self, x: f32, y: f32) {
        if !self.active {
            self.gesture = self.gesture.wrapping_add(1);
        }
        self.x = x;
        self.y = y;
        self.active = true;
    }

    /// Leave / touch end.
    pub fn leave(&mut self) {
        self.active = false;
    }

    pub fn inside(&self, width: usize, height: usize) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x < width as f32 && self.y < height as f32
    }
}

pub struct Spawner {
    last_spawn: Option<(f32, f32)>,
    last_gesture: u32,
    next_id: u64,
}

impl Spawner {
    pub fn new() -> Self {
        Self { last_spawn: None, last_gesture: 0, next_id: 0 }
    }

    /// Run the spawn check for tick `tick`. Returns the centers of the blobs added.
    pub fn step(
        &mut self,
        tick: u64,
        pointer: &PointerState,
        width: usize,
        height: usize,
        field: &mut BlobField,
        cfg: &RevealConfig,
        rng: &mut Rng32,
    ) -> Vec<(f32, f32)> {
        if tick % cfg.spawn_cadence as u64 != 0 {
            return Vec::new();
        }
        if !pointer.active || !pointer.inside(width, height) {
            return Vec::new();
        }

        // Distance and fill-in only apply within one gesture.
        if pointer.gesture != self.last_gesture {
            self.last_spawn = None;
            self.last_gesture = pointer.gesture;
        }

        let (px, py) = (pointer.x, pointer.y);
        let dist = match self.last_spawn {
            Some((lx, ly)) => ((px - lx).powi(2) + (py - ly).powi(2)).sqrt(),
            None => f32::INFINITY,
        };
        if !(dist > cfg.spawn_gap || field.is_empty()) {
            return Vec::new();
        }

        // Long jumps get evenly spaced fill-in spawns so the trail has no holes.
        let targets: Vec<(f32, f32)> = match self.last_spawn {
            Some((lx, ly)) if dist.is_finite() && dist > cfg.trail_gap => {
                let steps = (dist / cfg.trail_gap).ceil() as usize;
                (1..=steps)
                    .map(|i| {
                        let t = i as f32 / steps as f32;
                        (lx + (px - lx) * t, ly + (py - ly) * t)
                    })
                    .collect()
            }
            _ => vec![(px, py)],
        };

        let mut spawned = Vec::with_capacity(targets.len());
        for (tx, ty) in targets {
            let x = tx + rng.centered(cfg.spawn_jitter * 0.5);
            let y = ty + rng.centered(cfg.spawn_jitter * 0.5);
            field.add(Blob::spawn(self.next_id, x, y, cfg, rng));
            self.next_id += 1;
            spawned.push((x, y));
        }
        self.last_spawn = Some((px, py));
        spawned
    }
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rig {
        cfg: RevealConfig,
        rng: Rng32,
        field: BlobField,
        spawner: Spawner,
        pointer: PointerState,
    }

    impl Rig {
        fn new() -> Self {
            let cfg = RevealConfig::default();
            Self {
                rng: Rng32::from_seed(9),
                field: BlobField::new(cfg.max_blobs),
                spawner: Spawner::new(),
                pointer: PointerState::default(),
                cfg,
            }
        }

        fn step(&mut self, tick: u64) -> usize {
            self.spawner
                .step(tick, &self.pointer, 200, 200, &mut self.field, &self.cfg, &mut self.rng)
                .len()
        }
    }

    #[test]
    fn inactive_pointer_never_spawns() {
        let mut rig = Rig::new();
        rig.pointer.move_to(100.0, 100.0);
        rig.pointer.leave();
        for t in 1..=40 {
            assert_eq!(rig.step(t), 0);
        }
        assert!(rig.field.is_empty());
    }

    #[test]
    fn outside_viewport_never_spawns() {
        let mut rig = Rig::new();
        for &(x, y) in &[(-1.0, 10.0), (10.0, -0.5), (200.0, 10.0), (10.0, 250.0)] {
            rig.pointer.move_to(x, y);
            assert_eq!(rig.step(4), 0);
        }
        assert!(rig.field.is_empty());
    }

    #[test]
    fn cadence_gates_spawning() {
        let mut rig = Rig::new();
        rig.pointer.move_to(100.0, 100.0);
        assert_eq!(rig.step(1), 0);
        assert_eq!(rig.step(2), 0);
        assert_eq!(rig.step(3), 0);
        assert_eq!(rig.step(4), 1);
    }

    #[test]
    fn stationary_pointer_does_not_respawn() {
        let mut rig = Rig::new();
        rig.pointer.move_to(100.0, 100.0);
        assert_eq!(rig.step(4), 1);
        for t in 5..=44 {
            assert_eq!(rig.step(t), 0);
        }
    }

    #[test]
    fn small_moves_are_gated_by_distance() {
        let mut rig = Rig::new();
        rig.pointer.move_to(100.0, 100.0);
        rig.step(4);
        rig.pointer.move_to(105.0, 100.0);
        assert_eq!(rig.step(8), 0);
        rig.pointer.move_to(112.0, 100.0);
        assert_eq!(rig.step(12), 1);
    }

    #[test]
    fn fast_moves_fill_the_gap() {
        let mut rig = Rig::new();
        rig.pointer.move_to(10.0, 100.0);
        rig.step(4);
        rig.pointer.move_to(170.0, 100.0);
        // 160 px at a 40 px trail gap
        assert_eq!(rig.step(8), 4);
        assert_eq!(rig.field.len(), 5);
        let xs: Vec<f32> = rig.field.iter().skip(1).map(|b| b.x).collect();
        for (i, x) in xs.iter().enumerate() {
            let expect = 10.0 + 40.0 * (i + 1) as f32;
            assert!((x - expect).abs() <= rig.cfg.spawn_jitter * 0.5);
        }
    }

    #[test]
    fn reentering_elsewhere_starts_a_fresh_trail() {
        let mut rig = Rig::new();
        rig.pointer.move_to(10.0, 100.0);
        assert_eq!(rig.step(4), 1);
        rig.pointer.leave();
        assert_eq!(rig.step(8), 0);
        rig.pointer.move_to(190.0, 100.0);
        assert_eq!(rig.step(12), 1);
        assert_eq!(rig.field.len(), 2);
        let last = rig.field.iter().last().unwrap();
        assert!((last.x - 190.0).abs() <= rig.cfg.spawn_jitter * 0.5);
    }

    #[test]
    fn leave_and_reenter_between_checks_is_still_a_new_gesture() {
        let mut rig = Rig::new();
        rig.pointer.move_to(10.0, 100.0);
        rig.step(4);
        // never observed inactive by the spawner
        rig.pointer.leave();
        rig.pointer.move_to(190.0, 100.0);
        assert_eq!(rig.step(8), 1);
    }

    #[test]
    fn moving_within_a_gesture_keeps_the_gesture() {
        let mut p = PointerState::default();
        p.move_to(1.0, 1.0);
        let g = p.gesture;
        p.move_to(50.0, 50.0);
        assert_eq!(p.gesture, g);
        p.leave();
        p.move_to(2.0, 2.0);
        assert_ne!(p.gesture, g);
    }

    #[test]
    fn empty_field_allows_respawn_in_place() {
        let mut rig = Rig::new();
        rig.pointer.move_to(100.0, 100.0);
        rig.step(4);
        rig.field.clear();
        assert_eq!(rig.step(8), 1);
    }
}
