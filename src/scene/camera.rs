//! Front camera model for tap picking.
//!
//! Tracking space has the camera at the origin looking down -Z with +Y up, so
//! a face in front of the phone sits at negative z. Screen coordinates are in
//! points with the origin in the top-left corner.

use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraConfig;

const NEAR: f32 = 0.01;
const FAR: f32 = 100.0;

/// A ray in tracking space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Not normalized; points are `origin + t * direction`
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    viewport: Vec2,
    view_projection: Mat4,
    inverse_view_projection: Mat4,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let viewport = Vec2::new(config.viewport_width, config.viewport_height);
        let projection = Mat4::perspective_rh(
            config.vertical_fov_deg.to_radians(),
            viewport.x / viewport.y,
            NEAR,
            FAR,
        );
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let view_projection = projection * view;

        Self {
            viewport,
            view_projection,
            inverse_view_projection: view_projection.inverse(),
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Ray through a screen point, from the near plane toward the far plane
    pub fn screen_ray(&self, x: f32, y: f32) -> Ray {
        let ndc_x = 2.0 * x / self.viewport.x - 1.0;
        let ndc_y = 1.0 - 2.0 * y / self.viewport.y;

        let near = self
            .inverse_view_projection
            .project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = self
            .inverse_view_projection
            .project_point3(Vec3::new(ndc_x, ndc_y, 1.0));

        Ray {
            origin: near,
            direction: far - near,
        }
    }

    /// Screen point of a world position, `None` when it is behind the camera
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        if point.z >= -NEAR {
            return None;
        }
        let ndc = self.view_projection.project_point3(point);
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_forward() {
        let camera = Camera::new(&CameraConfig::default());
        let ray = camera.screen_ray(195.0, 422.0);

        let dir = ray.direction.normalize();
        assert!((dir - Vec3::NEG_Z).length() < 1e-3);
        assert!(ray.origin.z < 0.0);
    }

    #[test]
    fn test_world_to_screen_round_trip() {
        let camera = Camera::new(&CameraConfig::default());
        let point = Vec3::new(0.05, -0.02, -0.4);
        let screen = camera.world_to_screen(point).unwrap();

        let ray = camera.screen_ray(screen.x, screen.y);
        // Distance from the point to the ray line
        let dir = ray.direction.normalize();
        let to_point = point - ray.origin;
        let off_axis = to_point - dir * to_point.dot(dir);
        assert!(off_axis.length() < 1e-4);
    }

    #[test]
    fn test_behind_camera() {
        let camera = Camera::new(&CameraConfig::default());
        assert!(camera.world_to_screen(Vec3::new(0.0, 0.0, 0.5)).is_none());
    }
}
