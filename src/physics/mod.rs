pub mod debug;
pub mod shape;

use glam::{Quat, Vec3};
use rapier3d::pipeline::DebugRenderPipeline;
use rapier3d::prelude::*;
use thiserror::Error;

pub use self::{
    debug::DebugBuffers,
    shape::{ColliderDesc, ShapeDesc},
};
pub use rapier3d::prelude::{ColliderHandle, ImpulseJointHandle, RigidBodyHandle};

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("rigid body {0:?} does not exist in the physics world")]
    MissingBody(RigidBodyHandle),
    #[error("cannot build a {0} collider from empty geometry")]
    EmptyShape(&'static str),
    #[error("convex hull of {points} points is degenerate")]
    DegenerateHull { points: usize },
    #[error("triangle index {index} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyKind {
    Dynamic,
    Fixed,
}

/// Rigid body creation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub translation: Vec3,
    pub can_sleep: bool,
}

impl BodyDesc {
    pub fn dynamic() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            translation: Vec3::ZERO,
            can_sleep: true,
        }
    }

    pub fn fixed() -> Self {
        Self {
            kind: BodyKind::Fixed,
            ..Self::dynamic()
        }
    }

    pub fn translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    fn build(&self) -> RigidBody {
        let builder = match self.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
        };
        builder
            .translation(to_vector(self.translation))
            .can_sleep(self.can_sleep)
            .build()
    }
}

/// Revolute joint: two local anchors and one rotation axis shared by both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevoluteDesc {
    pub anchor1: Vec3,
    pub anchor2: Vec3,
    pub axis: Vec3,
}

impl RevoluteDesc {
    pub fn new(anchor1: Vec3, anchor2: Vec3, axis: Vec3) -> Self {
        Self {
            anchor1,
            anchor2,
            axis,
        }
    }
}

/// The rapier simulation state plus the handful of operations the app needs from it.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub broad_phase: BroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub ccd_solver: CCDSolver,
    pub island_manager: IslandManager,
    pub query_pipeline: QueryPipeline,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    debug_pipeline: DebugRenderPipeline,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: gravity.into(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            ccd_solver: CCDSolver::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            debug_pipeline: DebugRenderPipeline::default(),
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity.into()
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity.into();
    }

    /// Duration of the most recent step.
    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Advances the simulation by exactly one step of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    pub fn create_body(&mut self, desc: &BodyDesc) -> RigidBodyHandle {
        self.bodies.insert(desc.build())
    }

    pub fn create_collider(
        &mut self,
        desc: &ColliderDesc,
        body: RigidBodyHandle,
    ) -> Result<ColliderHandle, PhysicsError> {
        if !self.bodies.contains(body) {
            return Err(PhysicsError::MissingBody(body));
        }
        let collider = desc.build()?;
        Ok(self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies))
    }

    pub fn create_revolute_joint(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        desc: &RevoluteDesc,
    ) -> Result<ImpulseJointHandle, PhysicsError> {
        for body in [body1, body2] {
            if !self.bodies.contains(body) {
                return Err(PhysicsError::MissingBody(body));
            }
        }
        let joint = RevoluteJointBuilder::new(UnitVector::new_normalize(to_vector(desc.axis)))
            .local_anchor1(to_point(desc.anchor1))
            .local_anchor2(to_point(desc.anchor2))
            .build();
        Ok(self.impulse_joint_set.insert(body1, body2, joint, true))
    }

    /// Removes a body together with its colliders and joints.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    pub fn apply_impulse(
        &mut self,
        handle: RigidBodyHandle,
        impulse: Vec3,
    ) -> Result<(), PhysicsError> {
        let rb = self
            .bodies
            .get_mut(handle)
            .ok_or(PhysicsError::MissingBody(handle))?;
        rb.apply_impulse(impulse.into(), true);
        Ok(())
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_translation(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|rb| (*rb.translation()).into())
    }

    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        let rb = self.bodies.get(handle)?;
        Some(((*rb.translation()).into(), (*rb.rotation()).into()))
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|rb| (*rb.linvel()).into())
    }

    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joint_set.len()
    }

    /// Number of joints with `handle` at either end.
    pub fn joints_attached_to(&self, handle: RigidBodyHandle) -> usize {
        self.impulse_joint_set.attached_joints(handle).count()
    }

    /// Wireframe of the current simulation state, regenerated on every call.
    pub fn debug_render(&mut self) -> DebugBuffers {
        let mut buffers = DebugBuffers::default();
        self.debug_pipeline.render(
            &mut buffers,
            &self.bodies,
            &self.colliders,
            &self.impulse_joint_set,
            &self.multibody_joint_set,
            &self.narrow_phase,
        );
        buffers
    }
}

pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub(crate) fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

pub(crate) fn to_rotation(q: Quat) -> Rotation<Real> {
    Rotation::new_normalize(nalgebra::Quaternion::new(q.w, q.x, q.y, q.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_ball(gravity: Vec3) -> (PhysicsWorld, RigidBodyHandle) {
        let mut world = PhysicsWorld::new(gravity);
        let body = world.create_body(
            &BodyDesc::dynamic()
                .translation(Vec3::new(0.0, 5.0, 0.0))
                .can_sleep(false),
        );
        world
            .create_collider(&ColliderDesc::ball(1.0).mass(1.0), body)
            .unwrap();
        (world, body)
    }

    #[test]
    fn test_body_falls_under_gravity() {
        let (mut world, body) = world_with_ball(Vec3::new(0.0, -9.81, 0.0));
        assert_eq!(world.body_translation(body), Some(Vec3::new(0.0, 5.0, 0.0)));
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        assert!(world.body_translation(body).unwrap().y < 5.0);
        assert_eq!(world.timestep(), 1.0 / 60.0);
    }

    #[test]
    fn test_gravity_is_editable() {
        let (mut world, body) = world_with_ball(Vec3::ZERO);
        world.set_gravity(Vec3::new(0.0, 9.81, 0.0));
        assert_eq!(world.gravity(), Vec3::new(0.0, 9.81, 0.0));
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        assert!(world.body_translation(body).unwrap().y > 5.0);
    }

    #[test]
    fn test_impulse_changes_velocity() {
        let (mut world, body) = world_with_ball(Vec3::ZERO);
        world.step(1.0 / 60.0);
        world.apply_impulse(body, Vec3::new(0.0, 10.0, 0.0)).unwrap();
        world.step(1.0 / 60.0);
        assert!(world.linear_velocity(body).unwrap().y > 0.0);
    }

    #[test]
    fn test_joint_requires_existing_bodies() {
        let (mut world, body) = world_with_ball(Vec3::ZERO);
        let other = world.create_body(&BodyDesc::dynamic());
        assert!(world.remove_body(other));
        assert!(!world.contains_body(other));

        let desc = RevoluteDesc::new(Vec3::X, Vec3::ZERO, Vec3::X);
        let result = world.create_revolute_joint(body, other, &desc);
        assert!(matches!(result, Err(PhysicsError::MissingBody(h)) if h == other));
        assert_eq!(world.joint_count(), 0);

        let wheel = world.create_body(&BodyDesc::dynamic());
        world.create_revolute_joint(body, wheel, &desc).unwrap();
        assert_eq!(world.joint_count(), 1);
        assert_eq!(world.joints_attached_to(wheel), 1);

        assert!(world.remove_body(wheel));
        assert!(world.contains_body(body));
        assert_eq!(world.joint_count(), 0);
    }

    #[test]
    fn test_debug_render_tracks_colliders() {
        let (mut world, _) = world_with_ball(Vec3::ZERO);
        let one = world.debug_render();
        assert!(!one.is_empty());
        assert_eq!(one.vertices.len() / 3, one.colors.len() / 4);

        let extra = world.create_body(&BodyDesc::fixed());
        world
            .create_collider(&ColliderDesc::cuboid(1.0, 1.0, 1.0), extra)
            .unwrap();
        let two = world.debug_render();
        assert!(two.vertex_count() > one.vertex_count());
    }
}
