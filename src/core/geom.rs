use glam::{Mat4, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Möller-Trumbore ray/triangle test, double sided.
    ///
    /// Returns the distance along the ray to the hit point.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        const EPSILON: f32 = 1e-7;

        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t > EPSILON).then_some(t)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);

        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        Self { min, max }
    }

    pub fn contains(&self, point: &Vec3) -> bool {
        self.min.cmple(*point).all() && self.max.cmpge(*point).all()
    }

    /// Slab test. Returns the entry distance, or the exit distance when the origin is inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;

        let tmin = t0.min(t1).max_element();
        let tmax = t0.max(t1).min_element();

        if tmax < tmin || tmax < 0.0 {
            return None;
        }

        if tmin < 0.0 {
            return Some(tmax);
        }

        Some(tmin)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    pub fn transformed(&self, matrix: Mat4) -> Self {
        let points = [
            matrix.transform_point3(self.min),
            matrix.transform_point3(Vec3::new(self.min.x, self.min.y, self.max.z)),
            matrix.transform_point3(Vec3::new(self.min.x, self.max.y, self.min.z)),
            matrix.transform_point3(Vec3::new(self.min.x, self.max.y, self.max.z)),
            matrix.transform_point3(Vec3::new(self.max.x, self.min.y, self.min.z)),
            matrix.transform_point3(Vec3::new(self.max.x, self.min.y, self.max.z)),
            matrix.transform_point3(Vec3::new(self.max.x, self.max.y, self.min.z)),
            matrix.transform_point3(self.max),
        ];

        Self::from_points(&points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_triangle_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 5.0), -Vec3::Z);
        let hit = ray.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(hit, Some(5.0));

        let miss = Ray::new(Vec3::new(2.0, 2.0, 5.0), -Vec3::Z);
        assert_eq!(miss.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y), None);

        let behind = Ray::new(Vec3::new(0.25, 0.25, 5.0), Vec3::Z);
        assert_eq!(behind.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y), None);
    }

    #[test]
    fn test_aabb_ray() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);
        assert_eq!(aabb.intersect_ray(&ray), Some(9.0));

        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(aabb.intersect_ray(&inside), Some(1.0));

        let away = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert_eq!(aabb.intersect_ray(&away), None);
    }

    #[test]
    fn test_aabb_transformed() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let moved = aabb.transformed(Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(moved.center(), Vec3::new(5.0, 0.0, 0.0));
        assert!(moved.contains(&Vec3::new(4.5, 0.5, -0.5)));
    }
}
