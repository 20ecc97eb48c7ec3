//! jawOpen → marker scale mapping

use serde::{Deserialize, Serialize};

/// Linear mapping `base + gain * jawOpen`.
///
/// Input is clamped to [0, 1], so the output stays within
/// `[base, base + gain]` and never decreases as the mouth opens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleCurve {
    pub base: f32,
    pub gain: f32,
}

impl ScaleCurve {
    /// `1 + 1.6 * jawOpen`, used by the procedural eyes
    pub const PROCEDURAL: Self = Self {
        base: 1.0,
        gain: 1.6,
    };

    /// `0.3 + 0.5 * jawOpen`, used by the scene-file eyes
    pub const SCENE_FILE: Self = Self {
        base: 0.3,
        gain: 0.5,
    };

    pub fn new(base: f32, gain: f32) -> Self {
        Self { base, gain }
    }

    pub fn apply(&self, jaw_open: f32) -> f32 {
        self.base + jaw_open.clamp(0.0, 1.0) * self.gain
    }

    /// Output range over the whole input domain
    pub fn range(&self) -> (f32, f32) {
        (self.apply(0.0), self.apply(1.0))
    }
}
