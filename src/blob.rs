// One metaball: a decaying, drifting source of reveal field.

use crate::config::RevealConfig;
use crate::rng::Rng32;

#[derive(Clone, Debug)]
pub struct Blob {
    pub id: u64,                 // spawn order, unique per effect instance
    pub x: f32, pub y: f32,      // center in image pixels
    pub base_radius: f32,
    pub radius: f32,             // current, shaped by strength and wobble
    pub strength: f32,           // 1.0 at birth, 0.0 = dead
    pub decay_rate: f32,         // strength lost per tick
    pub vx: f32, pub vy: f32,    // drift in px/tick
    pub wobble_phase: f32,
    pub wobble_speed: f32,
}

impl Blob {
    /// A fresh blob at full strength with randomized decay, drift and wobble.
    pub fn spawn(id: u64, x: f32, y: f32, cfg: &RevealConfig, rng: &mut Rng32) -> Self {
        let angle = rng.range(0.0, std::f32::consts::TAU);
        let speed = rng.range(cfg.drift_speed.0, cfg.drift_speed.1);
        Self {
            id,
            x, y,
            base_radius: cfg.blob_radius,
            radius: cfg.blob_radius,
            strength: 1.0,
            decay_rate: cfg.decay_rate + rng.next_f32() * cfg.decay_jitter,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            wobble_phase: rng.range(0.0, std::f32::consts::TAU),
            wobble_speed: rng.range(cfg.wobble_speed.0, cfg.wobble_speed.1),
        }
    }

    /// Advance one tick: decay, drift, wobble, then reshape the radius.
    /// The radius follows strength^exponent so a blob fades before it shrinks.
    pub fn update(&mut self, cfg: &RevealConfig, rng: &mut Rng32) {
        self.strength = (self.strength - self.decay_rate).max(0.0);

        self.x += self.vx;
        self.y += self.vy;
        self.vx = (self.vx + rng.centered(cfg.drift_turbulence * 0.5)) * cfg.drift_damping;
        self.vy = (self.vy + rng.centered(cfg.drift_turbulence * 0.5)) * cfg.drift_damping;

        self.wobble_phase += self.wobble_speed;
        let wobble = 1.0 + self.wobble_phase.sin() * cfg.wobble_amplitude;
        self.radius = self.base_radius * self.strength.powf(cfg.radius_exponent) * wobble;
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.strength <= 0.0
    }

    /// Inverse-square contribution at (px,py). Finite at the exact center.
    #[inline]
    pub fn field_at(&self, px: f32, py: f32, center_gain: f32) -> f32 {
        let dx = px - self.x;
        let dy = py - self.y;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq == 0.0 {
            return self.strength * center_gain;
        }
        (self.radius * self.radius * self.strength) / dist_sq
    }
}
