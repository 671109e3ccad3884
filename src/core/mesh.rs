use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

use super::geom::{Aabb, Ray};

/// Indexed triangle geometry in the owning object's local frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub aabb: Aabb,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let aabb = Aabb::from_points(&positions);
        Self {
            positions,
            indices,
            aabb,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn transformed(&self, matrix: Mat4) -> Self {
        let positions = self
            .positions
            .iter()
            .map(|p| matrix.transform_point3(*p))
            .collect();
        Self::new(positions, self.indices.clone())
    }

    /// Triangles as index triplets, dropping a trailing partial triangle.
    pub fn triangle_indices(&self) -> Vec<[u32; 3]> {
        self.indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect()
    }

    /// Nearest intersection of `ray` with this mesh placed by `matrix`.
    pub fn intersect_ray(&self, ray: &Ray, matrix: Mat4) -> Option<f32> {
        if self.positions.is_empty() {
            return None;
        }
        self.aabb.transformed(matrix).intersect_ray(ray)?;

        let world: Vec<Vec3> = self
            .positions
            .iter()
            .map(|p| matrix.transform_point3(*p))
            .collect();

        self.indices
            .chunks_exact(3)
            .filter_map(|c| {
                let a = *world.get(c[0] as usize)?;
                let b = *world.get(c[1] as usize)?;
                let c = *world.get(c[2] as usize)?;
                ray.intersect_triangle(a, b, c)
            })
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Axis-aligned box centered on the origin.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let h = Vec3::new(width, height, depth) / 2.0;
        let positions = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            4, 5, 6, 4, 6, 7, // +z
            1, 0, 3, 1, 3, 2, // -z
            5, 1, 2, 5, 2, 6, // +x
            0, 4, 7, 0, 7, 3, // -x
            3, 7, 6, 3, 6, 2, // +y
            0, 1, 5, 0, 5, 4, // -y
        ];
        Self::new(positions, indices)
    }

    /// Latitude/longitude sphere.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut positions = Vec::new();
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                positions.push(Vec3::new(
                    -radius * (u * TAU).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * TAU).sin() * (v * PI).sin(),
                ));
            }
        }

        let row = width_segments + 1;
        let mut indices = Vec::new();
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self::new(positions, indices)
    }

    /// Capped cylinder along the Y axis, centered on the origin.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        let radial_segments = radial_segments.max(3);
        let half_height = height / 2.0;
        let ring = move |radius: f32, y: f32| {
            (0..=radial_segments).map(move |x| {
                let theta = x as f32 / radial_segments as f32 * TAU;
                Vec3::new(radius * theta.sin(), y, radius * theta.cos())
            })
        };

        let mut positions: Vec<Vec3> = ring(radius_top, half_height).collect();
        positions.extend(ring(radius_bottom, -half_height));

        let row = radial_segments + 1;
        let mut indices = Vec::new();
        for x in 0..radial_segments {
            let a = x;
            let b = row + x;
            let c = row + x + 1;
            let d = x + 1;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }

        for (radius, y, top) in [(radius_top, half_height, true), (radius_bottom, -half_height, false)] {
            if radius <= 0.0 {
                continue;
            }
            let center = positions.len() as u32;
            positions.push(Vec3::new(0.0, y, 0.0));
            let start = positions.len() as u32;
            positions.extend(ring(radius, y));
            for x in 0..radial_segments {
                if top {
                    indices.extend_from_slice(&[start + x, start + x + 1, center]);
                } else {
                    indices.extend_from_slice(&[start + x + 1, start + x, center]);
                }
            }
        }

        Self::new(positions, indices)
    }

    /// Regular icosahedron with its vertices on a sphere of `radius`.
    pub fn icosahedron(radius: f32) -> Self {
        let t = (1.0 + 5.0f32.sqrt()) / 2.0;
        let positions = [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .into_iter()
        .map(|(x, y, z)| Vec3::new(x, y, z).normalize() * radius)
        .collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11,
            1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8,
            3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9,
            4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
        ];

        Self::new(positions, indices)
    }

    /// (p, q) torus knot swept with a circular tube.
    pub fn torus_knot(
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    ) -> Self {
        let tubular_segments = tubular_segments.max(3);
        let radial_segments = radial_segments.max(3);
        let (pf, qf) = (p as f32, q as f32);

        let curve = |u: f32| {
            let quo_p = qf / pf * u;
            let cs = quo_p.cos();
            Vec3::new(
                radius * (2.0 + cs) * 0.5 * u.cos(),
                radius * (2.0 + cs) * 0.5 * u.sin(),
                radius * quo_p.sin() * 0.5,
            )
        };

        let mut positions = Vec::new();
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * pf * TAU;
            let p1 = curve(u);
            let p2 = curve(u + 0.01);

            let tangent = p2 - p1;
            let normal = p2 + p1;
            let binormal = tangent.cross(normal);
            let normal = binormal.cross(tangent).normalize();
            let binormal = binormal.normalize();

            for j in 0..=radial_segments {
                let v = j as f32 / radial_segments as f32 * TAU;
                let cx = -tube * v.cos();
                let cy = tube * v.sin();
                positions.push(p1 + normal * cx + binormal * cy);
            }
        }

        let row = radial_segments + 1;
        let mut indices = Vec::new();
        for j in 1..=tubular_segments {
            for i in 1..=radial_segments {
                let a = row * (j - 1) + (i - 1);
                let b = row * j + (i - 1);
                let c = row * j + i;
                let d = row * (j - 1) + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self::new(positions, indices)
    }
}
