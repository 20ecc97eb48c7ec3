//! Eye rig: a head anchor with two marker spheres

use glam::Vec3;

use crate::config::EyesConfig;
use crate::scene::{AnchorHandle, AnchorTracking, EntityId, Material, MarkerDesc, SceneGraph, Transform};

/// Which authoring path built the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigStyle {
    /// Built in code; the anchor pose is written every frame
    Procedural,
    /// Shaped like the authored scene; the anchor follows the face by itself
    SceneFile,
}

impl RigStyle {
    pub fn anchor_tracking(self) -> AnchorTracking {
        match self {
            Self::Procedural => AnchorTracking::Manual,
            Self::SceneFile => AnchorTracking::Face,
        }
    }

    pub fn marker_names(self) -> (&'static str, &'static str) {
        match self {
            Self::Procedural => ("leftEye", "rightEye"),
            Self::SceneFile => ("eyeL", "eyeR"),
        }
    }
}

/// Geometry shared by both markers
#[derive(Debug, Clone, PartialEq)]
pub struct RigSpec {
    pub radius: f32,
    pub collision_half_extent: f32,
    pub left_offset: Vec3,
    pub right_offset: Vec3,
    pub material: Material,
}

impl Default for RigSpec {
    fn default() -> Self {
        Self::from(&EyesConfig::default())
    }
}

impl From<&EyesConfig> for RigSpec {
    fn from(config: &EyesConfig) -> Self {
        Self {
            radius: config.radius,
            collision_half_extent: config.collision_half_extent,
            left_offset: Vec3::from(config.left_offset),
            right_offset: Vec3::from(config.right_offset),
            material: Material {
                color: config.color,
                metallic: config.metallic,
            },
        }
    }
}

impl RigSpec {
    fn marker(&self, name: &str) -> MarkerDesc {
        MarkerDesc {
            name: name.to_string(),
            radius: self.radius,
            material: self.material,
            collision_half_extent: self.collision_half_extent,
        }
    }
}

/// Handles to the anchor and both markers, returned at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeRig {
    pub anchor: AnchorHandle,
    pub left: EntityId,
    pub right: EntityId,
}

impl EyeRig {
    /// Create the anchor and attach both markers at their fixed offsets
    pub fn spawn<S: SceneGraph + ?Sized>(scene: &mut S, spec: &RigSpec, style: RigStyle) -> Self {
        let anchor = scene.create_anchor(style.anchor_tracking());
        let (left_name, right_name) = style.marker_names();

        let left = scene.create_marker(
            &spec.marker(left_name),
            Transform::from_translation(spec.left_offset),
        );
        scene.attach_child(anchor, left);

        let right = scene.create_marker(
            &spec.marker(right_name),
            Transform::from_translation(spec.right_offset),
        );
        scene.attach_child(anchor, right);

        tracing::debug!("Spawned {:?} eye rig at anchor {:?}", style, anchor.entity());
        Self {
            anchor,
            left,
            right,
        }
    }

    pub fn markers(&self) -> [EntityId; 2] {
        [self.left, self.right]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::scene::{Camera, SceneWorld};

    #[test]
    fn test_spawn_places_markers_at_offsets() {
        let mut scene = SceneWorld::new(Camera::new(&CameraConfig::default()));
        let rig = EyeRig::spawn(&mut scene, &RigSpec::default(), RigStyle::Procedural);

        let left = scene.local_transform(rig.left).unwrap();
        let right = scene.local_transform(rig.right).unwrap();
        assert_eq!(left.translation, Vec3::new(0.03, 0.02, 0.05));
        assert_eq!(right.translation, Vec3::new(-0.03, 0.02, 0.05));
        assert_eq!(left.scale, Vec3::ONE);

        assert_eq!(scene.name(rig.left), Some("leftEye"));
        assert_eq!(scene.name(rig.right), Some("rightEye"));
        assert_eq!(scene.children(rig.anchor), &[rig.left, rig.right]);
    }

    #[test]
    fn test_scene_file_rig_is_face_tracked() {
        let mut scene = SceneWorld::new(Camera::new(&CameraConfig::default()));
        let rig = EyeRig::spawn(&mut scene, &RigSpec::default(), RigStyle::SceneFile);

        assert_eq!(scene.name(rig.left), Some("eyeL"));
        assert_eq!(scene.name(rig.right), Some("eyeR"));
        assert_eq!(RigStyle::SceneFile.anchor_tracking(), AnchorTracking::Face);
    }
}
