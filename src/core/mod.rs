pub mod camera;
pub mod color;
pub mod geom;
pub mod mesh;
pub mod time;
pub mod transform;
