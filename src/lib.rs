pub mod app;
pub mod asset;
pub mod binding;
pub mod core;
pub mod debug_render;
pub mod error;
pub mod physics;
pub mod scene;
pub mod vehicle;

pub mod prelude {
    pub use crate::app::{loader::ConstructionTask, App, SimulationConfig};
    pub use crate::binding::{Binding, BindingRegistry};
    pub use crate::core::{
        camera::Camera, color::Color, geom::Ray, mesh::Mesh, time::Time, transform::Transform,
    };
    pub use crate::debug_render::DebugRenderer;
    pub use crate::error::ConstructionError;
    pub use crate::physics::{BodyDesc, BodyKind, ColliderDesc, PhysicsError, PhysicsWorld};
    pub use crate::scene::{Object, ObjectId, Scene};
    pub use crate::vehicle::{PartRole, RigBuilder, RigId, RigManifest, VehicleRig, WheelRole};
    pub use anyhow;
    pub use glam::*;
}
