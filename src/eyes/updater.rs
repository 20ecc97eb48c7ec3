//! Per-frame eye animation.
//!
//! Procedural rigs get the head pose written onto their anchor, then each
//! marker's local rotation is reset to `inverse(head) * head`, which is the
//! identity. The reset cancels nothing: markers turn with the head. Scene-file
//! rigs skip both steps because their anchor follows the face on its own.
//!
//! Both styles then scale the two markers uniformly from `jawOpen`. A frame
//! without `jawOpen` leaves the previous scale in place.

use glam::{Quat, Vec3};

use super::curve::ScaleCurve;
use super::rig::{EyeRig, RigStyle};
use crate::scene::SceneGraph;
use crate::tracking::FaceFrame;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceAnimationUpdater {
    style: RigStyle,
    curve: ScaleCurve,
}

impl FaceAnimationUpdater {
    pub fn new(style: RigStyle, curve: ScaleCurve) -> Self {
        Self { style, curve }
    }

    pub fn procedural(curve: ScaleCurve) -> Self {
        Self::new(RigStyle::Procedural, curve)
    }

    pub fn scene_file(curve: ScaleCurve) -> Self {
        Self::new(RigStyle::SceneFile, curve)
    }

    pub fn style(&self) -> RigStyle {
        self.style
    }

    pub fn curve(&self) -> ScaleCurve {
        self.curve
    }

    /// Apply one frame to the rig
    pub fn update<S: SceneGraph + ?Sized>(&self, scene: &mut S, rig: &EyeRig, frame: &FaceFrame) {
        if self.style == RigStyle::Procedural {
            let head = frame.head;
            scene.set_anchor_pose(rig.anchor, head.position, head.orientation);

            let local = local_eye_rotation(head.orientation);
            for marker in rig.markers() {
                scene.set_local_rotation(marker, local);
            }
        }

        let Some(jaw_open) = frame.jaw_open() else {
            tracing::trace!("No jawOpen in frame, keeping scale");
            return;
        };

        let scale = self.curve.apply(jaw_open);
        for marker in rig.markers() {
            scene.set_scale(marker, Vec3::splat(scale));
        }
        tracing::trace!(jaw_open, scale, "Eye scale updated");
    }
}

/// `inverse(parent) * parent` collapses to the identity for any unit head
/// orientation, so the markers keep the anchor's rotation.
fn local_eye_rotation(_head: Quat) -> Quat {
    Quat::IDENTITY
}
