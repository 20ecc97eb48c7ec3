//! Scene graph
//!
//! The eye rig lives in a scene of anchors and marker entities. The
//! [`SceneGraph`] trait is the narrow surface the animation code talks to;
//! [`SceneWorld`] is the in-memory implementation used by the demo.

pub mod camera;
pub mod world;

use glam::{Mat4, Quat, Vec3};

use crate::tracking::HeadTransform;

pub use camera::Camera;
pub use world::SceneWorld;

/// Handle to any entity in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Handle to an anchor entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorHandle(pub EntityId);

impl AnchorHandle {
    pub fn entity(self) -> EntityId {
        self.0
    }
}

/// Local transform of an entity relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// How an anchor's pose is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorTracking {
    /// Pose is written explicitly by the owner of the anchor
    Manual,
    /// Pose follows the tracked face automatically
    Face,
}

/// Surface material of a marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub metallic: bool,
}

/// Geometry and hit region of a marker sphere
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDesc {
    pub name: String,
    pub radius: f32,
    pub material: Material,
    /// Half-extent of the cubic collision box used for picking
    pub collision_half_extent: f32,
}

/// Scene operations used by the eye rig.
///
/// Geometry construction is the scene's business: callers describe a marker
/// and get back a handle.
pub trait SceneGraph {
    fn create_anchor(&mut self, tracking: AnchorTracking) -> AnchorHandle;

    fn create_marker(&mut self, desc: &MarkerDesc, transform: Transform) -> EntityId;

    fn attach_child(&mut self, parent: AnchorHandle, child: EntityId);

    /// Remove every anchor together with its children
    fn remove_all_anchors(&mut self);

    /// Entity under the given screen point, if any
    fn pick(&self, x: f32, y: f32) -> Option<EntityId>;

    /// Move face-tracked anchors to the latest head pose
    fn track_face(&mut self, head: &HeadTransform);

    fn set_anchor_pose(&mut self, anchor: AnchorHandle, position: Vec3, orientation: Quat);

    fn set_local_rotation(&mut self, entity: EntityId, rotation: Quat);

    fn set_scale(&mut self, entity: EntityId, scale: Vec3);

    fn local_transform(&self, entity: EntityId) -> Option<Transform>;
}
