use rapier3d::pipeline::{DebugRenderBackend, DebugRenderObject};
use rapier3d::prelude::*;

use crate::core::color::Color;

/// One frame's worth of physics wireframe, as flat line-list buffers.
///
/// `vertices` holds 3 floats per vertex and `colors` 4 floats (RGBA) per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugBuffers {
    pub vertices: Vec<f32>,
    pub colors: Vec<f32>,
}

impl DebugBuffers {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl DebugRenderBackend for DebugBuffers {
    fn draw_line(
        &mut self,
        _object: DebugRenderObject,
        a: Point<Real>,
        b: Point<Real>,
        color: [f32; 4],
    ) {
        self.vertices
            .extend_from_slice(&[a.x, a.y, a.z, b.x, b.y, b.z]);

        let rgba = Color::from_hsla(color[0], color[1], color[2], color[3]).to_array();
        self.colors.extend_from_slice(&rgba);
        self.colors.extend_from_slice(&rgba);
    }
}
