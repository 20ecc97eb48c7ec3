//! GoldenEyes - face-tracked eyeball overlay
//!
//! Two small spheres ride on a tracked head and swell as the mouth opens:
//! - Face tracking input over VMC/OSC or MediaPipe JSON (UDP)
//! - In-memory scene graph with tap picking through a front-camera model
//! - Two authoring paths, scene-file shaped and procedural, sharing one updater
//! - A click sound when an eye is tapped

pub mod audio;
pub mod config;
pub mod demo;
pub mod error;
pub mod eyes;
pub mod scene;
pub mod session;
pub mod tracking;

pub use config::Config;
pub use error::{GoldenEyesError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
