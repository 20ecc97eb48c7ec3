//! In-memory scene graph.
//!
//! Anchors are roots; markers hang below them. Only entities under an anchor
//! are considered rendered and can be picked.

use glam::{Mat4, Quat, Vec3};
use std::collections::BTreeMap;

use super::camera::{Camera, Ray};
use super::{AnchorHandle, AnchorTracking, EntityId, MarkerDesc, SceneGraph, Transform};
use crate::tracking::HeadTransform;

#[derive(Debug, Clone)]
enum NodeKind {
    Anchor(AnchorTracking),
    Marker(MarkerDesc),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    transform: Transform,
}

/// Scene of anchors and marker spheres with ray picking
#[derive(Debug, Clone)]
pub struct SceneWorld {
    nodes: BTreeMap<EntityId, Node>,
    next_id: u64,
    camera: Camera,
    /// Bumped on every write to the scene
    revision: u64,
}

impl SceneWorld {
    pub fn new(camera: Camera) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
            camera,
            revision: 0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Counter of scene writes, for detecting mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn anchors(&self) -> Vec<AnchorHandle> {
        self.nodes
            .iter()
            .filter(|(_, node)| matches!(node.kind, NodeKind::Anchor(_)))
            .map(|(id, _)| AnchorHandle(*id))
            .collect()
    }

    /// Markers currently attached under an anchor
    pub fn attached_markers(&self) -> Vec<EntityId> {
        self.nodes
            .iter()
            .filter(|(id, node)| matches!(node.kind, NodeKind::Marker(_)) && self.is_rendered(**id))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn children(&self, anchor: AnchorHandle) -> &[EntityId] {
        self.nodes
            .get(&anchor.entity())
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn name(&self, entity: EntityId) -> Option<&str> {
        match &self.nodes.get(&entity)?.kind {
            NodeKind::Marker(desc) => Some(desc.name.as_str()),
            NodeKind::Anchor(_) => None,
        }
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.nodes.contains_key(&entity)
    }

    /// World matrix composed from the root down
    pub fn world_matrix(&self, entity: EntityId) -> Option<Mat4> {
        let node = self.nodes.get(&entity)?;
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    fn is_rendered(&self, entity: EntityId) -> bool {
        let mut current = entity;
        loop {
            let Some(node) = self.nodes.get(&current) else {
                return false;
            };
            match (&node.kind, node.parent) {
                (NodeKind::Anchor(_), _) => return true,
                (_, Some(parent)) => current = parent,
                (_, None) => return false,
            }
        }
    }

    fn allocate(&mut self, kind: NodeKind, transform: Transform) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                kind,
                parent: None,
                children: Vec::new(),
                transform,
            },
        );
        self.revision += 1;
        id
    }

    fn remove_subtree(&mut self, entity: EntityId) {
        if let Some(node) = self.nodes.remove(&entity) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }

    fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        match self.nodes.get_mut(&entity) {
            Some(node) => {
                self.revision += 1;
                Some(&mut node.transform)
            }
            None => {
                tracing::warn!("Write to unknown entity {:?}", entity);
                None
            }
        }
    }
}

impl SceneGraph for SceneWorld {
    fn create_anchor(&mut self, tracking: AnchorTracking) -> AnchorHandle {
        AnchorHandle(self.allocate(NodeKind::Anchor(tracking), Transform::IDENTITY))
    }

    fn create_marker(&mut self, desc: &MarkerDesc, transform: Transform) -> EntityId {
        self.allocate(NodeKind::Marker(desc.clone()), transform)
    }

    fn attach_child(&mut self, parent: AnchorHandle, child: EntityId) {
        if !self.nodes.contains_key(&parent.entity()) || !self.nodes.contains_key(&child) {
            tracing::warn!("Cannot attach {:?} to {:?}: unknown entity", child, parent);
            return;
        }

        let previous = self.nodes.get_mut(&child).and_then(|node| {
            let previous = node.parent;
            node.parent = Some(parent.entity());
            previous
        });
        if let Some(previous) = previous.and_then(|p| self.nodes.get_mut(&p)) {
            previous.children.retain(|c| *c != child);
        }
        if let Some(anchor) = self.nodes.get_mut(&parent.entity()) {
            anchor.children.push(child);
        }
        self.revision += 1;
    }

    fn remove_all_anchors(&mut self) {
        let anchors = self.anchors();
        for anchor in &anchors {
            self.remove_subtree(anchor.entity());
        }
        if !anchors.is_empty() {
            self.revision += 1;
            tracing::debug!("Removed {} anchors", anchors.len());
        }
    }

    fn pick(&self, x: f32, y: f32) -> Option<EntityId> {
        let ray = self.camera.screen_ray(x, y);

        self.nodes
            .iter()
            .filter(|(id, _)| self.is_rendered(**id))
            .filter_map(|(id, node)| match &node.kind {
                NodeKind::Marker(desc) => {
                    let world = self.world_matrix(*id)?;
                    hit_box(&ray, world, desc.collision_half_extent).map(|t| (*id, t))
                }
                NodeKind::Anchor(_) => None,
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn track_face(&mut self, head: &HeadTransform) {
        let mut moved = false;
        for node in self.nodes.values_mut() {
            if let NodeKind::Anchor(AnchorTracking::Face) = node.kind {
                node.transform.translation = head.position;
                node.transform.rotation = head.orientation;
                moved = true;
            }
        }
        if moved {
            self.revision += 1;
        }
    }

    fn set_anchor_pose(&mut self, anchor: AnchorHandle, position: Vec3, orientation: Quat) {
        if let Some(transform) = self.transform_mut(anchor.entity()) {
            transform.translation = position;
            transform.rotation = orientation;
        }
    }

    fn set_local_rotation(&mut self, entity: EntityId, rotation: Quat) {
        if let Some(transform) = self.transform_mut(entity) {
            transform.rotation = rotation;
        }
    }

    fn set_scale(&mut self, entity: EntityId, scale: Vec3) {
        if let Some(transform) = self.transform_mut(entity) {
            transform.scale = scale;
        }
    }

    fn local_transform(&self, entity: EntityId) -> Option<Transform> {
        self.nodes.get(&entity).map(|node| node.transform)
    }
}

/// Ray parameter of the entry point into a cube of the given half-extent in
/// the entity's local space. The parameter is shared with world space since
/// the mapping is affine.
fn hit_box(ray: &Ray, world: Mat4, half_extent: f32) -> Option<f32> {
    let inverse = world.inverse();
    if !inverse.is_finite() {
        return None;
    }
    let origin = inverse.transform_point3(ray.origin);
    let direction = inverse.transform_vector3(ray.direction);

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < f32::EPSILON {
            if o < -half_extent || o > half_extent {
                return None;
            }
            continue;
        }
        let t1 = (-half_extent - o) / d;
        let t2 = (half_extent - o) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }

    if t_max < t_min || t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}
