//! Tracking module
//!
//! Face tracking input for driving the eye markers:
//! - VMC/OSC protocol (iFacialMocap, VSeeFace, etc.)
//! - MediaPipe Face Landmarker (JSON over UDP)
//!
//! Both decoders produce strongly typed [`FaceFrame`]s. Whatever is not a face
//! update (body bones, status messages, frames without a face) is filtered out
//! here so consumers never inspect raw payloads.

pub mod mediapipe;
pub mod udp;
pub mod vmc;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::TrackingError;

pub use udp::UdpFaceTracker;

/// Head pose in tracking space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadTransform {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for HeadTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl HeadTransform {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Split a rigid anchor matrix into translation and rotation, ignoring scale
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (_, orientation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }
}

/// One tracking update: head pose plus blendshape coefficients
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceFrame {
    pub head: HeadTransform,
    /// ARKit blendshape name -> value (0.0 - 1.0)
    pub blendshapes: HashMap<String, f32>,
}

impl FaceFrame {
    pub fn new(head: HeadTransform) -> Self {
        Self {
            head,
            blendshapes: HashMap::new(),
        }
    }

    pub fn with_blendshape(mut self, name: &str, value: f32) -> Self {
        self.blendshapes.insert(name.to_string(), value);
        self
    }

    /// Get a blendshape coefficient, if the tracker reported it
    pub fn blendshape(&self, name: &str) -> Option<f32> {
        self.blendshapes.get(name).copied()
    }

    /// Mouth openness, absent when the tracker did not report a finite `jawOpen`
    pub fn jaw_open(&self) -> Option<f32> {
        self.blendshape(blendshapes::JAW_OPEN)
            .filter(|value| value.is_finite())
    }
}

/// Identifier of one tracking session, unique per tracker instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// A frame stamped with the session that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFrame {
    pub session: SessionId,
    pub frame: FaceFrame,
}

/// Options passed to the tracker when a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingOptions {
    pub reset_tracking: bool,
    pub remove_existing_anchors: bool,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            reset_tracking: true,
            remove_existing_anchors: true,
        }
    }
}

/// A source of face tracking sessions.
///
/// `start` either begins frame delivery for a fresh session or fails with
/// [`TrackingError::Unavailable`]. After `stop`, no frame stamped with that
/// session is delivered anymore.
pub trait FaceTracker {
    fn start(&mut self, options: &TrackingOptions) -> Result<SessionId, TrackingError>;

    fn stop(&mut self, session: SessionId);
}

/// Common ARKit blendshape names
pub mod blendshapes {
    pub const EYE_BLINK_LEFT: &str = "eyeBlinkLeft";
    pub const EYE_BLINK_RIGHT: &str = "eyeBlinkRight";

    pub const JAW_FORWARD: &str = "jawForward";
    pub const JAW_LEFT: &str = "jawLeft";
    pub const JAW_OPEN: &str = "jawOpen";
    pub const JAW_RIGHT: &str = "jawRight";

    pub const MOUTH_CLOSE: &str = "mouthClose";
    pub const MOUTH_FUNNEL: &str = "mouthFunnel";
    pub const MOUTH_PUCKER: &str = "mouthPucker";
    pub const MOUTH_SMILE_LEFT: &str = "mouthSmileLeft";
    pub const MOUTH_SMILE_RIGHT: &str = "mouthSmileRight";
}
