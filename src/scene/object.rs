use petgraph::graph::NodeIndex;

use crate::core::{mesh::Mesh, transform::Transform};

use super::lines::LineSegments;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub(crate) NodeIndex);

impl ObjectId {
    pub fn index(&self) -> usize {
        self.0.index()
    }
}

#[derive(Debug, Clone, Default)]
pub enum Geometry {
    #[default]
    Empty,
    Mesh(Mesh),
    Lines(LineSegments),
}

/// A node of the visual scene.
#[derive(Debug, Clone)]
pub struct Object {
    pub name: Option<String>,
    pub transform: Transform,
    pub geometry: Geometry,
    pub visible: bool,
}

impl Object {
    pub fn new() -> Self {
        Self {
            name: None,
            transform: Transform::new(),
            geometry: Geometry::Empty,
            visible: true,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    pub fn mesh(mesh: Mesh) -> Self {
        Self {
            geometry: Geometry::Mesh(mesh),
            ..Self::new()
        }
    }

    pub fn lines() -> Self {
        Self {
            geometry: Geometry::Lines(LineSegments::new()),
            ..Self::new()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.geometry {
            Geometry::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_lines(&self) -> Option<&LineSegments> {
        match &self.geometry {
            Geometry::Lines(lines) => Some(lines),
            _ => None,
        }
    }

    pub fn as_lines_mut(&mut self) -> Option<&mut LineSegments> {
        match &mut self.geometry {
            Geometry::Lines(lines) => Some(lines),
            _ => None,
        }
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}
