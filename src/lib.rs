//! Pointer-driven "liquid reveal": a portrait overlay is erased by decaying
//! metaballs (or a fading paint trail) that follow the pointer, exposing the
//! photograph underneath.
//!
//! Data flow per tick: pointer -> [`spawner`] -> [`field`] -> [`raster`] ->
//! [`composite`], all sequenced by [`driver::RevealEffect`].

#![forbid(unsafe_code)]

pub mod assets;
pub mod blob;
pub mod composite;
pub mod config;
pub mod draw;
pub mod driver;
pub mod error;
pub mod field;
pub mod gamma;
pub mod raster;
pub mod rng;
pub mod spawner;
pub mod types;

pub use assets::ImagePair;
pub use config::{MaskMode, RevealConfig};
pub use driver::{Phase, RevealEffect};
pub use error::{Error, Result};
pub use types::{FrameBuffer, Mask, Region};
