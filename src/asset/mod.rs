use std::path::Path;

use anyhow::{anyhow, bail, Result};
use glam::{Mat4, Quat, Vec3};
use itertools::Itertools;

use crate::{
    core::{mesh::Mesh, transform::Transform},
    scene::{Object, ObjectId, Scene},
    vehicle::{PartRole, WheelRole},
};

/// Loads a glTF file into a standalone scene mirroring its node tree.
pub fn load_gltf(path: impl AsRef<Path>) -> Result<Scene> {
    let (document, buffers, _) = gltf::import(path.as_ref())?;
    scene_from_document(&document, &buffers)
}

pub fn load_gltf_slice(bytes: &[u8]) -> Result<Scene> {
    let (document, buffers, _) = gltf::import_slice(bytes)?;
    scene_from_document(&document, &buffers)
}

fn scene_from_document(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<Scene> {
    let source = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| anyhow!("glTF file has no scenes"))?;

    let mut scene = Scene::new();
    let root = scene.root();
    for node in source.nodes() {
        add_node(&mut scene, &node, buffers, root)?;
    }
    if scene.is_empty() {
        bail!("glTF scene has no nodes");
    }
    Ok(scene)
}

fn add_node(
    scene: &mut Scene,
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: ObjectId,
) -> Result<()> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform::from_scale_rotation_translation(
        Vec3::from(scale),
        Quat::from_array(rotation),
        Vec3::from(translation),
    );

    let mut object = match node.mesh() {
        Some(mesh) => Object::mesh(load_mesh(&mesh, buffers)?),
        None => Object::new(),
    };
    object.name = node.name().map(str::to_owned);
    object.transform = transform;

    let id = scene.add(object, parent);
    for child in node.children() {
        add_node(scene, &child, buffers, id)?;
    }
    Ok(())
}

/// Merges every triangle primitive of `mesh` into one indexed mesh.
fn load_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Mesh> {
    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "skipping {:?} primitive of mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));

        let primitive_positions = reader
            .read_positions()
            .ok_or_else(|| anyhow!("mesh primitive does not have positions: {:?}", primitive))?
            .map(Vec3::from)
            .collect_vec();

        let vertex_offset = positions.len() as u32;
        match reader.read_indices() {
            Some(read) => indices.extend(read.into_u32().map(|index| index + vertex_offset)),
            None => indices.extend(
                (0..primitive_positions.len() as u32).map(|index| index + vertex_offset),
            ),
        }
        positions.extend(primitive_positions);
    }

    Ok(Mesh::new(positions, indices))
}

/// Procedural stand-in for a vehicle model, with every part the rig builder needs.
pub fn placeholder_vehicle() -> Scene {
    let mut scene = Scene::new();
    let car = scene.add_to_root(Object::group("car"));

    let chassis = Object::mesh(Mesh::cuboid(1.0, 0.4, 1.6))
        .with_name(PartRole::Chassis.part_name())
        .with_transform(Transform::from_translation(Vec3::new(0.0, 0.3, 0.0)));
    scene.add(chassis, car);

    // Turned in the vertices: body sync owns the object rotation.
    for role in WheelRole::ALL {
        let turn = Mat4::from_rotation_z(role.side() * std::f32::consts::FRAC_PI_2);
        let wheel = Object::mesh(Mesh::cylinder(0.3, 0.3, 0.2, 16).transformed(turn))
            .with_name(PartRole::Wheel(role).part_name())
            .with_transform(Transform::from_translation(role.chassis_anchor()));
        scene.add(wheel, car);
    }

    scene
}

#[cfg(test)]
mod tests {
    use crate::scene::Geometry;

    use super::*;

    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "car", "translation": [0.0, 1.0, 0.0], "children": [1] },
            { "name": "body", "mesh": 0, "scale": [2.0, 2.0, 2.0] }
        ],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }]
    }"#;

    #[test]
    fn test_load_gltf_slice() -> anyhow::Result<()> {
        let scene = load_gltf_slice(TRIANGLE_GLTF.as_bytes())?;
        assert_eq!(scene.len(), 3);

        let car = scene.find_by_name(scene.root(), "car").unwrap();
        let body = scene.find_by_name(car, "body").unwrap();
        assert_eq!(scene.parent_of(body), Some(car));

        let object = scene.get(body).unwrap();
        assert_eq!(object.transform.scale, Vec3::splat(2.0));
        let Geometry::Mesh(mesh) = &object.geometry else {
            panic!("body has no mesh");
        };
        assert_eq!(mesh.positions, vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);

        let world = scene.world_matrix(body).unwrap();
        assert_eq!(world.transform_point3(Vec3::X), Vec3::new(2.0, 1.0, 0.0));
        Ok(())
    }

    #[test]
    fn test_load_gltf_rejects_garbage() {
        assert!(load_gltf_slice(b"not a model").is_err());
    }

    #[test]
    fn test_placeholder_has_every_part() {
        let scene = placeholder_vehicle();
        for role in PartRole::ALL {
            let id = scene.find_by_name(scene.root(), role.part_name()).unwrap();
            assert!(matches!(scene.get(id).unwrap().geometry, Geometry::Mesh(_)));
        }
    }
}
