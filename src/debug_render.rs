use crate::{
    physics::PhysicsWorld,
    scene::{Object, ObjectId, Scene},
};

/// Mirrors the physics world's wireframe into a line-segment object of the scene.
#[derive(Debug)]
pub struct DebugRenderer {
    object: ObjectId,
    enabled: bool,
}

impl DebugRenderer {
    pub fn new(scene: &mut Scene, enabled: bool) -> Self {
        let object = scene.add_to_root(Object::lines().with_name("physics_debug"));
        if let Some(lines) = scene.get_mut(object) {
            lines.visible = enabled;
        }
        Self { object, enabled }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Replaces the line buffers with this frame's physics wireframe, or just hides
    /// the lines when disabled.
    pub fn update(&mut self, physics: &mut PhysicsWorld, scene: &mut Scene) {
        if !self.enabled {
            if let Some(object) = scene.get_mut(self.object) {
                object.visible = false;
            }
            return;
        }

        let buffers = physics.debug_render();
        let Some(object) = scene.get_mut(self.object) else {
            log::warn!("debug line object was removed from the scene");
            return;
        };
        object.visible = true;
        if let Some(lines) = object.as_lines_mut() {
            lines.set_positions(buffers.vertices);
            lines.set_colors(buffers.colors);
        }
    }
}
