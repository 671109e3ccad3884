use glam::{Quat, Vec3};
use rapier3d::prelude::*;

use super::{to_point, to_rotation, to_vector, PhysicsError};

/// Geometric part of a collider, in the local frame of the body it attaches to.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeDesc {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
    /// Y-aligned cylinder.
    Cylinder { half_height: f32, radius: f32 },
    /// Point cloud; the hull itself is computed when the collider is built.
    ConvexHull { points: Vec<Vec3> },
    TriMesh { vertices: Vec<Vec3>, indices: Vec<[u32; 3]> },
}

impl ShapeDesc {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeDesc::Cuboid { .. } => "cuboid",
            ShapeDesc::Ball { .. } => "ball",
            ShapeDesc::Cylinder { .. } => "cylinder",
            ShapeDesc::ConvexHull { .. } => "convex hull",
            ShapeDesc::TriMesh { .. } => "triangle mesh",
        }
    }
}

/// Everything needed to attach one collider to a body.
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderDesc {
    pub shape: ShapeDesc,
    /// Explicit mass. When `None` the mass follows from unit density.
    pub mass: Option<f32>,
    pub restitution: f32,
    pub translation: Vec3,
    pub rotation: Quat,
}

impl ColliderDesc {
    pub fn new(shape: ShapeDesc) -> Self {
        Self {
            shape,
            mass: None,
            restitution: 0.0,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::new(ShapeDesc::Cuboid {
            half_extents: Vec3::new(hx, hy, hz),
        })
    }

    pub fn ball(radius: f32) -> Self {
        Self::new(ShapeDesc::Ball { radius })
    }

    pub fn cylinder(half_height: f32, radius: f32) -> Self {
        Self::new(ShapeDesc::Cylinder {
            half_height,
            radius,
        })
    }

    pub fn convex_hull(points: Vec<Vec3>) -> Self {
        Self::new(ShapeDesc::ConvexHull { points })
    }

    pub fn trimesh(vertices: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self::new(ShapeDesc::TriMesh { vertices, indices })
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builds the rapier collider. Fails on empty or degenerate point data.
    pub fn build(&self) -> Result<Collider, PhysicsError> {
        let builder = match &self.shape {
            ShapeDesc::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ShapeDesc::Ball { radius } => ColliderBuilder::ball(*radius),
            ShapeDesc::Cylinder {
                half_height,
                radius,
            } => ColliderBuilder::cylinder(*half_height, *radius),
            ShapeDesc::ConvexHull { points } => {
                if points.is_empty() {
                    return Err(PhysicsError::EmptyShape(self.shape.name()));
                }
                let points: Vec<Point<Real>> = points.iter().map(|p| to_point(*p)).collect();
                ColliderBuilder::convex_hull(&points).ok_or(PhysicsError::DegenerateHull {
                    points: points.len(),
                })?
            }
            ShapeDesc::TriMesh { vertices, indices } => {
                if vertices.is_empty() || indices.is_empty() {
                    return Err(PhysicsError::EmptyShape(self.shape.name()));
                }
                let vertex_count = vertices.len();
                if let Some(bad) = indices
                    .iter()
                    .flatten()
                    .find(|&&i| i as usize >= vertex_count)
                {
                    return Err(PhysicsError::IndexOutOfBounds {
                        index: *bad,
                        vertex_count,
                    });
                }
                let vertices = vertices.iter().map(|v| to_point(*v)).collect();
                ColliderBuilder::trimesh(vertices, indices.clone())
            }
        };

        let mut builder = builder
            .restitution(self.restitution)
            .translation(to_vector(self.translation))
            .rotation(to_rotation(self.rotation).scaled_axis());
        if let Some(mass) = self.mass {
            builder = builder.mass(mass);
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_primitives() -> anyhow::Result<()> {
        let cuboid = ColliderDesc::cuboid(0.5, 0.5, 0.5)
            .mass(1.0)
            .restitution(0.5)
            .build()?;
        assert_eq!(cuboid.restitution(), 0.5);

        let wheel = ColliderDesc::cylinder(0.1, 0.3)
            .rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2))
            .translation(Vec3::new(0.2, 0.0, 0.0))
            .build()?;
        assert!(wheel.shape().as_cylinder().is_some());
        assert!((wheel.position().translation.vector.x - 0.2).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn test_convex_hull_needs_points() {
        let empty = ColliderDesc::convex_hull(Vec::new()).build();
        assert!(matches!(empty, Err(PhysicsError::EmptyShape(_))));

        let cube = ColliderDesc::convex_hull(crate::core::mesh::Mesh::cuboid(1.0, 1.0, 1.0).positions)
            .build();
        assert!(cube.is_ok());
    }

    #[test]
    fn test_trimesh_validates_indices() {
        let bad = ColliderDesc::trimesh(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 3]]).build();
        assert!(matches!(
            bad,
            Err(PhysicsError::IndexOutOfBounds {
                index: 3,
                vertex_count: 3
            })
        ));

        let ok = ColliderDesc::trimesh(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2]]).build();
        assert!(ok.is_ok());
    }
}
