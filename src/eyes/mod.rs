//! Eye markers
//!
//! Builds the two-eye rig and animates it from face tracking frames.

pub mod curve;
pub mod rig;
pub mod updater;

pub use curve::ScaleCurve;
pub use rig::{EyeRig, RigSpec, RigStyle};
pub use updater::FaceAnimationUpdater;
