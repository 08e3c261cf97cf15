// Frame driver. RevealEffect owns every piece of per-effect state: pointer,
// blobs, mask, buffers and images. The host calls tick() once per display
// refresh; pointer handlers only record input.
//
// Phases: Uninitialized -> WaitingForAssets -> Intro -> Running. Intro is
// skipped when disabled in the config. A viewport change throws away all
// sized state and starts over from WaitingForAssets.
// Visual: photograph, then the portrait fades in, then the pointer eats holes.

use std::time::Duration;

use tracing::{debug, info};

use crate::assets::ImagePair;
use crate::composite::Compositor;
use crate::config::{MaskMode, RevealConfig};
use crate::error::Result;
use crate::field::BlobField;
use crate::raster::{smoothstep, FieldRasterizer, TrailBuffer};
use crate::rng::Rng32;
use crate::spawner::{PointerState, Spawner};
use crate::types::{FrameBuffer, Mask, Region};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Uninitialized,
    WaitingForAssets,
    /// Base fully visible for `intro_hold_secs`.
    IntroHold { elapsed: f32 },
    /// Overlay fading in; opacity is smoothstep(progress).
    IntroFade { progress: f32 },
    Running,
}

enum MaskSource {
    Field(FieldRasterizer),
    Trail(TrailBuffer),
}

/// Everything that depends on the viewport size.
struct Viewport {
    width: usize,
    height: usize,
    mask: Mask,
    source: MaskSource,
    compositor: Compositor,
    images: Option<(FrameBuffer, FrameBuffer)>, // (overlay, base) at viewport size
}

impl Viewport {
    fn new(width: usize, height: usize, cfg: &RevealConfig) -> Self {
        let source = match cfg.mode {
            MaskMode::Metaball => MaskSource::Field(FieldRasterizer::new(width, height, cfg.downsample)),
            MaskMode::Trail => MaskSource::Trail(TrailBuffer::new(width, height, cfg)),
        };
        Self {
            width,
            height,
            mask: Mask::new(width, height),
            source,
            compositor: Compositor::new(width, height),
            images: None,
        }
    }
}

pub struct RevealEffect {
    cfg: RevealConfig,
    phase: Phase,
    tick: u64,
    rng: Rng32,
    pointer: PointerState,
    spawner: Spawner,
    field: BlobField,
    viewport: Option<Viewport>,
    assets: Option<ImagePair>,
    region: Option<Region>, // what the rasterizer touched this tick
}

impl RevealEffect {
    pub fn new(cfg: RevealConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            rng: Rng32::from_seed(cfg.seed),
            field: BlobField::new(cfg.max_blobs),
            cfg,
            phase: Phase::Uninitialized,
            tick: 0,
            pointer: PointerState::default(),
            spawner: Spawner::new(),
            viewport: None,
            assets: None,
            region: None,
        })
    }

    /// Convenience: new + resize in one go.
    pub fn with_viewport(cfg: RevealConfig, width: usize, height: usize) -> Result<Self> {
        let mut fx = Self::new(cfg)?;
        fx.resize(width, height);
        Ok(fx)
    }

    /// (Re)size the viewport. Any change is a full reset of in-flight state.
    #[tracing::instrument(skip(self))]
    pub fn resize(&mut self, width: usize, height: usize) {
        if let Some(vp) = &self.viewport {
            if vp.width == width && vp.height == height {
                return;
            }
        }
        debug!(width, height, "viewport reset");
        self.field.clear();
        self.spawner = Spawner::new();
        self.pointer = PointerState::default();
        self.region = None;
        self.tick = 0;
        self.viewport = Some(Viewport::new(width, height, &self.cfg));
        self.set_phase(Phase::WaitingForAssets);
        self.place_assets();
    }

    /// Readiness signal: both images are decoded.
    pub fn assets_ready(&mut self, images: ImagePair) {
        self.assets = Some(images);
        self.place_assets();
    }

    fn place_assets(&mut self) {
        let (Some(vp), Some(pair)) = (self.viewport.as_mut(), self.assets.as_ref()) else {
            return;
        };
        vp.images = Some(pair.scaled(vp.width, vp.height));
        info!(width = vp.width, height = vp.height, "both images ready");
        let next = if self.cfg.intro { Phase::IntroHold { elapsed: 0.0 } } else { Phase::Running };
        self.set_phase(next);
    }

    fn set_phase(&mut self, next: Phase) {
        if std::mem::discriminant(&self.phase) != std::mem::discriminant(&next) {
            info!(from = ?self.phase, to = ?next, "phase change");
        }
        self.phase = next;
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.move_to(x, y);
    }

    pub fn pointer_left(&mut self) {
        self.pointer.leave();
    }

    /// One display refresh. Returns the frame to show, or None while the
    /// images are not ready (the host keeps showing the overlay as-is).
    pub fn tick(&mut self, dt: Duration) -> Result<Option<&FrameBuffer>> {
        let dt = dt.as_secs_f32();
        match self.phase {
            Phase::Uninitialized | Phase::WaitingForAssets => return Ok(None),
            Phase::IntroHold { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.cfg.intro_hold_secs {
                    self.set_phase(Phase::IntroFade { progress: 0.0 });
                } else {
                    self.phase = Phase::IntroHold { elapsed };
                }
                return self.compose(0.0);
            }
            Phase::IntroFade { progress } => {
                let progress = (progress + self.cfg.intro_fade_speed * dt).min(1.0);
                if progress >= 1.0 {
                    self.set_phase(Phase::Running);
                } else {
                    self.phase = Phase::IntroFade { progress };
                }
                return self.compose(smoothstep(progress));
            }
            Phase::Running => {}
        }

        // Fixed order: counter, spawn, blob tick, rasterize, composite.
        self.tick += 1;
        let Some(vp) = self.viewport.as_mut() else { return Ok(None) };
        let spawned = self.spawner.step(
            self.tick,
            &self.pointer,
            vp.width,
            vp.height,
            &mut self.field,
            &self.cfg,
            &mut self.rng,
        );
        self.field.tick(&self.cfg, &mut self.rng);
        self.region = match &mut vp.source {
            MaskSource::Field(r) => r.rasterize(&self.field, &self.cfg, &mut vp.mask),
            MaskSource::Trail(t) => t.rasterize(&spawned, &self.cfg, &mut self.rng, &mut vp.mask),
        };
        self.compose(1.0)
    }

    fn compose(&mut self, opacity: f32) -> Result<Option<&FrameBuffer>> {
        let Some(vp) = self.viewport.as_mut() else { return Ok(None) };
        let Some((overlay, base)) = vp.images.as_ref() else { return Ok(None) };
        let region = if matches!(self.phase, Phase::Running) { self.region } else { None };
        let frame = vp.compositor.compose(base, overlay, &vp.mask, region, opacity)?;
        Ok(Some(frame))
    }

    pub fn phase(&self) -> Phase { self.phase }
    pub fn ticks(&self) -> u64 { self.tick }
    pub fn field(&self) -> &BlobField { &self.field }
    pub fn pointer(&self) -> &PointerState { &self.pointer }
    pub fn config(&self) -> &RevealConfig { &self.cfg }
    pub fn region(&self) -> Option<Region> { self.region }

    pub fn size(&self) -> Option<(usize, usize)> {
        self.viewport.as_ref().map(|vp| (vp.width, vp.height))
    }

    pub fn mask(&self) -> Option<&Mask> {
        self.viewport.as_ref().map(|vp| &vp.mask)
    }

    /// Overlay with this frame's alpha applied, for inspection.
    pub fn overlay_layer(&self) -> Option<&FrameBuffer> {
        self.viewport.as_ref().map(|vp| vp.compositor.layer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const FRAME: Duration = Duration::from_millis(16);

    fn pair() -> ImagePair {
        ImagePair::new(
            RgbaImage::from_pixel(8, 8, Rgba([250, 250, 250, 255])),
            RgbaImage::from_pixel(8, 8, Rgba([5, 5, 5, 255])),
        )
    }

    fn no_intro() -> RevealConfig {
        RevealConfig { intro: false, ..RevealConfig::default() }
    }

    #[test]
    fn starts_uninitialized_and_waits_for_assets() {
        let mut fx = RevealEffect::new(no_intro()).unwrap();
        assert_eq!(fx.phase(), Phase::Uninitialized);
        assert!(fx.tick(FRAME).unwrap().is_none());
        fx.resize(64, 48);
        assert_eq!(fx.phase(), Phase::WaitingForAssets);
        fx.pointer_moved(10.0, 10.0);
        for _ in 0..10 {
            assert!(fx.tick(FRAME).unwrap().is_none());
        }
        assert!(fx.field().is_empty());
        assert_eq!(fx.ticks(), 0);
    }

    #[test]
    fn assets_before_viewport_are_kept() {
        let mut fx = RevealEffect::new(no_intro()).unwrap();
        fx.assets_ready(pair());
        assert_eq!(fx.phase(), Phase::Uninitialized);
        fx.resize(32, 32);
        assert_eq!(fx.phase(), Phase::Running);
    }

    #[test]
    fn intro_holds_then_fades_then_runs() {
        let cfg = RevealConfig { intro_hold_secs: 0.1, intro_fade_speed: 5.0, ..RevealConfig::default() };
        let mut fx = RevealEffect::with_viewport(cfg, 16, 16).unwrap();
        fx.assets_ready(pair());
        assert!(matches!(fx.phase(), Phase::IntroHold { .. }));

        // base only while holding
        let f = fx.tick(Duration::from_millis(50)).unwrap().unwrap();
        assert_eq!(f.pixels[0], 0x00_05_05_05);
        fx.tick(Duration::from_millis(60)).unwrap();
        assert!(matches!(fx.phase(), Phase::IntroFade { .. }));

        let mut seen = Vec::new();
        while fx.phase() != Phase::Running {
            let f = fx.tick(Duration::from_millis(20)).unwrap().unwrap();
            seen.push((f.pixels[0] >> 16) & 0xFF);
            assert!(seen.len() < 100);
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 250);
    }

    #[test]
    fn resize_discards_in_flight_state() {
        let mut fx = RevealEffect::with_viewport(no_intro(), 64, 64).unwrap();
        fx.assets_ready(pair());
        fx.pointer_moved(32.0, 32.0);
        for _ in 0..8 {
            fx.tick(FRAME).unwrap();
        }
        assert!(!fx.field().is_empty());

        fx.resize(40, 30);
        assert!(fx.field().is_empty());
        assert!(!fx.pointer().active);
        assert_eq!(fx.size(), Some((40, 30)));
        assert_eq!(fx.phase(), Phase::Running);
        let f = fx.tick(FRAME).unwrap().unwrap();
        assert_eq!((f.width, f.height), (40, 30));
    }

    #[test]
    fn same_size_resize_is_ignored() {
        let mut fx = RevealEffect::with_viewport(no_intro(), 64, 64).unwrap();
        fx.assets_ready(pair());
        fx.pointer_moved(32.0, 32.0);
        for _ in 0..4 {
            fx.tick(FRAME).unwrap();
        }
        fx.resize(64, 64);
        assert_eq!(fx.field().len(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = RevealConfig { downsample: 0, ..RevealConfig::default() };
        assert!(RevealEffect::new(cfg).is_err());
    }
}
