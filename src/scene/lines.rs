use glam::Vec3;

/// Line-segment drawable: every consecutive pair of vertices is one segment.
///
/// Positions are packed as 3 floats per vertex, colors as 4 (RGBA). Both buffers are
/// replaced wholesale and may change length every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSegments {
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl LineSegments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_positions(&mut self, positions: Vec<f32>) {
        self.positions = positions;
    }

    pub fn set_colors(&mut self, colors: Vec<f32>) {
        self.colors = colors;
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn segment_count(&self) -> usize {
        self.vertex_count() / 2
    }

    pub fn points(&self) -> &[Vec3] {
        bytemuck::cast_slice(&self.positions[..self.vertex_count() * 3])
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_resize_freely() {
        let mut lines = LineSegments::new();
        lines.set_positions(vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
        lines.set_colors(vec![1.0; 8]);
        assert_eq!(lines.vertex_count(), 2);
        assert_eq!(lines.segment_count(), 1);
        assert_eq!(lines.points()[1], Vec3::new(1.0, 2.0, 3.0));

        lines.set_positions(vec![0.0; 3 * 6]);
        lines.set_colors(vec![0.0; 4 * 6]);
        assert_eq!(lines.vertex_count(), 6);
        assert_eq!(lines.colors().len(), 24);

        lines.clear();
        assert_eq!(lines.vertex_count(), 0);
    }
}
