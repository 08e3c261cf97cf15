// What you SEE:
// • On start the photograph shows for a moment, then the portrait overlay fades in over it.
// • Move the mouse over the window: liquid blobs follow it and eat holes into the
//   overlay, revealing the photograph. They wobble, drift and melt away on their own.
// • Resize the window to restart the effect at the new size. ESC quits.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use image::RgbaImage;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use portrait_reveal::assets::{load_rgba, to_frame};
use portrait_reveal::draw::Drawer;
use portrait_reveal::{FrameBuffer, ImagePair, MaskMode, RevealConfig, RevealEffect};

#[derive(Parser, Debug)]
#[command(name = "portrait-reveal", version)]
struct Cli {
    /// Image drawn on top and erased by the pointer.
    #[arg(long)]
    overlay: PathBuf,

    /// Image revealed underneath.
    #[arg(long)]
    base: PathBuf,

    /// JSON file with effect tunables; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 480)]
    width: usize,

    #[arg(long, default_value_t = 600)]
    height: usize,

    /// Override the mask mode from the config.
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    /// Skip the photograph-then-fade intro.
    #[arg(long)]
    no_intro: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Metaball,
    Trail,
}

enum Loaded {
    Both(ImagePair),
    /// Base failed; show the overlay statically.
    OverlayOnly(RgbaImage),
    Failed(portrait_reveal::Error),
}

fn load_images(overlay: PathBuf, base: PathBuf) -> Loaded {
    let over = match load_rgba(&overlay) {
        Ok(img) => img,
        Err(e) => return Loaded::Failed(e),
    };
    match load_rgba(&base) {
        Ok(b) => Loaded::Both(ImagePair::new(over, b)),
        Err(e) => {
            warn!(error = %e, "base image failed to load; showing overlay without the effect");
            Loaded::OverlayOnly(over)
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    /* --- Config ---
       Visual: blob size, how long the reveal lingers, how soft its edge is. */
    let mut cfg = match &cli.config {
        Some(path) => RevealConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => RevealConfig::default(),
    };
    if let Some(m) = cli.mode {
        cfg.mode = match m {
            ModeChoice::Metaball => MaskMode::Metaball,
            ModeChoice::Trail => MaskMode::Trail,
        };
    }
    if cli.no_intro {
        cfg.intro = false;
    }
    let fps = cfg.frame_rate.round().max(1.0) as usize;

    /* --- Window + effect ---
       Visual: an empty window until both pictures are decoded. */
    let mut drawer = Drawer::new("Portrait Reveal", cli.width, cli.height, fps)?;
    let (mut w, mut h) = drawer.size();
    let mut effect = RevealEffect::with_viewport(cfg.clone(), w, h)?;
    info!(mode = ?cfg.mode, width = w, height = h, "effect created");

    /* --- Decode off the frame thread ---
       The loop keeps presenting while this runs; the result is the readiness signal. */
    let (tx, rx) = mpsc::channel();
    let (overlay_path, base_path) = (cli.overlay.clone(), cli.base.clone());
    thread::spawn(move || {
        let _ = tx.send(load_images(overlay_path, base_path));
    });

    let mut blank = FrameBuffer::filled(w, h, 0);
    let mut fallback: Option<(RgbaImage, FrameBuffer)> = None;

    let mut last_frame_time = Instant::now();
    let mut last_stats = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();
        let dt = now - last_frame_time;
        last_frame_time = now;

        // 1) Readiness
        match rx.try_recv() {
            Ok(Loaded::Both(pair)) => effect.assets_ready(pair),
            Ok(Loaded::OverlayOnly(img)) => {
                let frame = to_frame(&img, w, h);
                fallback = Some((img, frame));
            }
            Ok(Loaded::Failed(e)) => return Err(e).context("overlay image is required"),
            Err(_) => {}
        }

        // 2) Viewport changes reset everything
        let (nw, nh) = drawer.size();
        if (nw, nh) != (w, h) && nw > 0 && nh > 0 {
            (w, h) = (nw, nh);
            effect.resize(w, h);
            blank = FrameBuffer::filled(w, h, 0);
            if let Some((img, frame)) = fallback.as_mut() {
                *frame = to_frame(img, w, h);
            }
        }

        // 3) Input: record only, the tick consumes it
        match drawer.pointer() {
            Some((x, y)) => effect.pointer_moved(x, y),
            None => effect.pointer_left(),
        }

        // 4) Tick + present
        let static_frame = fallback.as_ref().map(|(_, f)| f).unwrap_or(&blank);
        match effect.tick(dt)? {
            Some(frame) => drawer.present(frame)?,
            None => drawer.present(static_frame)?,
        }

        frames_this_second += 1;
        let since = now.duration_since(last_stats);
        if since >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / since.as_secs_f32();
            debug!(fps, blobs = effect.field().len(), phase = ?effect.phase(), "frame stats");
            frames_this_second = 0;
            last_stats = now;
        }
    }

    Ok(())
}
