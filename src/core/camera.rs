use glam::{Mat4, Vec2, Vec3, Vec4};

use super::geom::Ray;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
}

impl Camera {
    pub fn new(view_matrix: Mat4, projection_matrix: Mat4) -> Self {
        Self {
            view_matrix,
            projection_matrix,
        }
    }

    pub fn perspective_lookat(
        eye: Vec3,
        center: Vec3,
        up: Vec3,
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self::new(
            Mat4::look_at_rh(eye, center, up),
            Mat4::perspective_rh(fov, aspect, near, far),
        )
    }

    pub fn position(&self) -> Vec3 {
        self.view_matrix.inverse().col(3).truncate()
    }

    /// Converts a pixel position (origin top-left) into normalized device coordinates.
    pub fn screen_to_ndc(screen_position: Vec2, screen_size: Vec2) -> Vec2 {
        Vec2::new(
            (screen_position.x / screen_size.x) * 2.0 - 1.0,
            -(screen_position.y / screen_size.y) * 2.0 + 1.0,
        )
    }

    /// Ray from the camera through `ndc` (both axes in [-1, 1], +y up).
    pub fn ndc_to_ray(&self, ndc: Vec2) -> Ray {
        let inv_proj = self.projection_matrix.inverse();
        let inv_view = self.view_matrix.inverse();

        let clip = Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let eye = inv_proj * clip;
        let eye = Vec4::new(eye.x, eye.y, -1.0, 0.0);
        let world = (inv_view * eye).truncate();

        Ray::new(inv_view.col(3).truncate(), world)
    }

    pub fn screen_to_ray(&self, screen_position: Vec2, screen_size: Vec2) -> Ray {
        self.ndc_to_ray(Self::screen_to_ndc(screen_position, screen_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::perspective_lookat(
            Vec3::new(0.0, 2.0, 5.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::Y,
            75f32.to_radians(),
            16.0 / 9.0,
            0.1,
            100.0,
        )
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = camera();
        let ray = camera.ndc_to_ray(Vec2::ZERO);
        assert!((ray.origin - Vec3::new(0.0, 2.0, 5.0)).length() < 1e-4);
        let expected = (Vec3::new(0.0, 1.0, 0.0) - ray.origin).normalize();
        assert!((ray.direction - expected).length() < 1e-4);
    }

    #[test]
    fn test_screen_to_ndc() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(Camera::screen_to_ndc(Vec2::new(400.0, 300.0), size), Vec2::ZERO);
        assert_eq!(Camera::screen_to_ndc(Vec2::ZERO, size), Vec2::new(-1.0, 1.0));
        assert_eq!(Camera::screen_to_ndc(size, size), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_right_edge_ray_points_right() {
        let ray = camera().ndc_to_ray(Vec2::new(1.0, 0.0));
        assert!(ray.direction.x > 0.0);
    }
}
