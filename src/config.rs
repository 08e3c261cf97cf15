// Effect tunables.
// Every field has a default, so a JSON file only needs the keys it changes.
// Visual: blob size and how quickly the holes heal.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where the per-pixel reveal comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskMode {
    /// Recompute the summed blob field from scratch every frame.
    #[default]
    Metaball,
    /// Paint into a persistent buffer that fades on its own.
    Trail,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub mode: MaskMode,

    /// Live blobs kept at once; the oldest is evicted past this.
    pub max_blobs: usize,
    /// Radius (px) of a freshly spawned blob.
    pub blob_radius: f32,
    /// Spawn check runs once every this many ticks.
    pub spawn_cadence: u32,
    /// Pointer must travel further than this (px) from the last spawn.
    pub spawn_gap: f32,
    /// Longer jumps are filled with interpolated spawns at this spacing (px).
    pub trail_gap: f32,
    /// Full width (px) of the random offset applied to each spawn.
    pub spawn_jitter: f32,

    /// Strength lost per tick, plus up to `decay_jitter` extra per blob.
    pub decay_rate: f32,
    pub decay_jitter: f32,
    /// radius = base * strength^exponent * wobble
    pub radius_exponent: f32,
    pub wobble_amplitude: f32,
    pub wobble_speed: (f32, f32),
    pub drift_speed: (f32, f32),
    pub drift_turbulence: f32,
    pub drift_damping: f32,
    /// Field at a blob's exact center is `strength * center_gain`.
    pub center_gain: f32,

    pub low_threshold: f32,
    pub high_threshold: f32,
    pub smoothstep_passes: u32,
    /// Field is sampled every `downsample` pixels and bilinearly upsampled.
    pub downsample: usize,
    /// Bounding box margin around each blob, in multiples of `blob_radius`.
    pub bbox_margin: f32,

    /// Seconds a fully revealed trail cell takes to fade back to zero.
    pub trail_persistence_secs: f32,
    pub trail_satellites: u32,

    pub intro: bool,
    pub intro_hold_secs: f32,
    /// Fade progress gained per second during the intro cross-fade.
    pub intro_fade_speed: f32,

    pub frame_rate: f32,
    pub seed: u32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            mode: MaskMode::Metaball,
            max_blobs: 22,
            blob_radius: 52.0,
            spawn_cadence: 4,
            spawn_gap: 8.0,
            trail_gap: 40.0,
            spawn_jitter: 20.0,
            decay_rate: 0.008,
            decay_jitter: 0.008,
            radius_exponent: 0.4,
            wobble_amplitude: 0.15,
            wobble_speed: (0.05, 0.13),
            drift_speed: (0.8, 2.0),
            drift_turbulence: 0.3,
            drift_damping: 0.98,
            center_gain: 10.0,
            low_threshold: 0.16,
            high_threshold: 1.6,
            smoothstep_passes: 2,
            downsample: 4,
            bbox_margin: 2.5,
            trail_persistence_secs: 3.0,
            trail_satellites: 3,
            intro: true,
            intro_hold_secs: 1.0,
            intro_fade_speed: 1.2,
            frame_rate: 60.0,
            seed: 0xC0FFEE,
        }
    }
}

impl RevealConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_blobs == 0 {
            return Err(Error::config("max_blobs must be at least 1"));
        }
        if !(self.blob_radius > 0.0) {
            return Err(Error::config("blob_radius must be > 0"));
        }
        if self.spawn_cadence == 0 {
            return Err(Error::config("spawn_cadence must be at least 1"));
        }
        if !(self.decay_rate > 0.0) || self.decay_jitter < 0.0 {
            return Err(Error::config("decay_rate must be > 0 and decay_jitter >= 0"));
        }
        if !(self.trail_gap > 0.0) || self.spawn_gap < 0.0 {
            return Err(Error::config("trail_gap must be > 0 and spawn_gap >= 0"));
        }
        if !(self.radius_exponent > 0.0) {
            return Err(Error::config("radius_exponent must be > 0"));
        }
        if !(self.center_gain >= 0.0) {
            return Err(Error::config("center_gain must be >= 0"));
        }
        if !(self.bbox_margin > 0.0) {
            return Err(Error::config("bbox_margin must be > 0"));
        }
        if !(self.low_threshold < self.high_threshold) {
            return Err(Error::config("low_threshold must be below high_threshold"));
        }
        if self.downsample == 0 {
            return Err(Error::config("downsample must be at least 1"));
        }
        if !(self.frame_rate > 0.0) {
            return Err(Error::config("frame_rate must be > 0"));
        }
        if !(self.trail_persistence_secs > 0.0) {
            return Err(Error::config("trail_persistence_secs must be > 0"));
        }
        if self.intro && !(self.intro_fade_speed > 0.0) {
            return Err(Error::config("intro_fade_speed must be > 0"));
        }
        Ok(())
    }

    /// Bounding-box padding around a blob center, in pixels.
    pub fn margin_px(&self) -> f32 {
        self.blob_radius * self.bbox_margin
    }

    /// Amount a trail cell loses each tick.
    pub fn trail_fade_step(&self) -> f32 {
        1.0 / (self.trail_persistence_secs * self.frame_rate)
    }
}
