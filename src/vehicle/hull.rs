use glam::Vec3;

use crate::scene::{Object, ObjectId, Scene};

/// Gathers every mesh vertex in the subtree at `root`, in world space.
///
/// Points are neither deduplicated nor reduced; the collider builder computes
/// the hull. Meshes without vertices contribute nothing.
pub fn extract_points(scene: &Scene, root: ObjectId) -> Vec<Vec3> {
    let mut points = Vec::new();
    for id in scene.descendants(root) {
        let Some(mesh) = scene.get(id).and_then(Object::as_mesh) else {
            continue;
        };
        if mesh.is_empty() {
            continue;
        }
        let Some(world) = scene.world_matrix(id) else {
            continue;
        };
        points.extend(mesh.positions.iter().map(|p| world.transform_point3(*p)));
    }
    points
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use crate::core::{mesh::Mesh, transform::Transform};

    use super::*;

    #[test]
    fn test_point_count_is_sum_of_vertex_counts() {
        let mut scene = Scene::new();
        let chassis = scene.add_to_root(
            Object::group("body").with_transform(Transform::from_translation(Vec3::new(0.0, 1.0, 0.0))),
        );

        let empty = Mesh::new(Vec::new(), Vec::new());
        let triangle = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]);
        let cube = Mesh::cuboid(2.0, 2.0, 2.0);

        scene.add(Object::mesh(empty), chassis);
        let tri = scene.add(
            Object::mesh(triangle.clone()).with_transform(
                Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
                    .with_scale(Vec3::splat(2.0)),
            ),
            chassis,
        );
        let grouped = scene.add(
            Object::new().with_transform(Transform::from_translation(Vec3::new(3.0, 0.0, 0.0))),
            chassis,
        );
        let boxed = scene.add(Object::mesh(cube.clone()), grouped);

        let points = extract_points(&scene, chassis);
        assert_eq!(points.len(), 11);

        let tri_world = scene.world_matrix(tri).unwrap();
        let box_world = scene.world_matrix(boxed).unwrap();
        let expected: Vec<Vec3> = triangle
            .positions
            .iter()
            .map(|p| tri_world.transform_point3(*p))
            .chain(cube.positions.iter().map(|p| box_world.transform_point3(*p)))
            .collect();
        assert_eq!(points, expected);

        assert!(points[3..]
            .iter()
            .all(|p| (2.0..=4.0).contains(&p.x) && (0.0..=2.0).contains(&p.y)));
    }

    #[test]
    fn test_no_geometry_yields_no_points() {
        let mut scene = Scene::new();
        let chassis = scene.add_to_root(Object::group("body"));
        scene.add(Object::new(), chassis);
        assert!(extract_points(&scene, chassis).is_empty());
    }
}
