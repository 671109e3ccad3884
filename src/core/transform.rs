use glam::{Mat4, Quat, Vec3};

/// Local transform of a scene object relative to its parent.
///
/// Stored decomposed so that pose copies from the physics world are exact.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new() -> Self {
        Self::IDENTITY
    }

    #[inline]
    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_scale_rotation_translation(Vec3::ONE, Quat::IDENTITY, translation)
    }

    #[inline]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self::from_scale_rotation_translation(Vec3::ONE, rotation, Vec3::ZERO)
    }

    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_scale_rotation_translation(scale, Quat::IDENTITY, Vec3::ZERO)
    }

    #[inline]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    #[inline]
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.translation += Vec3::new(x, y, z);
    }

    #[inline]
    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        self.rotation = Quat::from_axis_angle(axis, angle) * self.rotation;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
