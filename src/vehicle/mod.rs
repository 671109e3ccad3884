pub mod hull;

use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::{Quat, Vec3};
use rapier3d::prelude::{ImpulseJointHandle, RigidBodyHandle};

use crate::{
    binding::Binding,
    error::ConstructionError,
    physics::{BodyDesc, ColliderDesc, PhysicsWorld, RevoluteDesc},
    scene::{ObjectId, Scene},
};

pub const CHASSIS_MASS: f32 = 1.0;
pub const RESTITUTION: f32 = 0.5;
pub const WHEEL_HALF_HEIGHT: f32 = 0.1;
pub const WHEEL_RADIUS: f32 = 0.3;
/// Lateral shift of a wheel collider toward its own side.
pub const WHEEL_COLLIDER_OFFSET: f32 = 0.2;
pub const ANCHOR_LATERAL: f32 = 0.55;
pub const ANCHOR_LONGITUDINAL: f32 = 0.63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WheelRole {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl WheelRole {
    pub const ALL: [WheelRole; 4] = [
        WheelRole::FrontLeft,
        WheelRole::FrontRight,
        WheelRole::BackLeft,
        WheelRole::BackRight,
    ];

    pub fn is_left(self) -> bool {
        matches!(self, WheelRole::FrontLeft | WheelRole::BackLeft)
    }

    pub fn is_front(self) -> bool {
        matches!(self, WheelRole::FrontLeft | WheelRole::FrontRight)
    }

    /// -1 on the left (-X), +1 on the right (+X).
    pub fn side(self) -> f32 {
        if self.is_left() {
            -1.0
        } else {
            1.0
        }
    }

    /// -1 at the front (-Z), +1 at the back (+Z).
    pub fn end(self) -> f32 {
        if self.is_front() {
            -1.0
        } else {
            1.0
        }
    }

    /// Where the wheel body spawns relative to the chassis spawn point.
    pub fn spawn_offset(self) -> Vec3 {
        Vec3::new(self.side(), 1.0, self.end())
    }

    /// Joint anchor in the chassis frame.
    pub fn chassis_anchor(self) -> Vec3 {
        Vec3::new(
            self.side() * ANCHOR_LATERAL,
            0.0,
            self.end() * ANCHOR_LONGITUDINAL,
        )
    }

    /// Hinge axis, pointing out of the chassis on the wheel's side.
    pub fn axis(self) -> Vec3 {
        Vec3::new(self.side(), 0.0, 0.0)
    }

    /// Wheel collider: a Y-aligned cylinder turned about Z so it lies along X.
    pub fn collider(self) -> ColliderDesc {
        ColliderDesc::cylinder(WHEEL_HALF_HEIGHT, WHEEL_RADIUS)
            .restitution(RESTITUTION)
            .rotation(Quat::from_rotation_z(self.side() * FRAC_PI_2))
            .translation(Vec3::new(self.side() * WHEEL_COLLIDER_OFFSET, 0.0, 0.0))
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Logical role a part of the vehicle asset plays in the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartRole {
    Chassis,
    Wheel(WheelRole),
}

impl PartRole {
    pub const ALL: [PartRole; 5] = [
        PartRole::Chassis,
        PartRole::Wheel(WheelRole::FrontLeft),
        PartRole::Wheel(WheelRole::FrontRight),
        PartRole::Wheel(WheelRole::BackLeft),
        PartRole::Wheel(WheelRole::BackRight),
    ];

    /// Object name the asset must use for this part.
    pub fn part_name(&self) -> &'static str {
        match self {
            PartRole::Chassis => "body",
            PartRole::Wheel(WheelRole::FrontLeft) => "wheel_frontLeft",
            PartRole::Wheel(WheelRole::FrontRight) => "wheel_frontRight",
            PartRole::Wheel(WheelRole::BackLeft) => "wheel_backLeft",
            PartRole::Wheel(WheelRole::BackRight) => "wheel_backRight",
        }
    }
}

impl fmt::Display for PartRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.part_name())
    }
}

/// Every rig part located inside an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RigManifest {
    pub chassis: ObjectId,
    wheels: [ObjectId; 4],
}

impl RigManifest {
    /// Finds all five parts under `root`, or reports every role that is missing.
    pub fn locate(asset: &Scene, root: ObjectId) -> Result<Self, ConstructionError> {
        let found = PartRole::ALL.map(|role| asset.find_by_name(root, role.part_name()));

        let missing: Vec<PartRole> = PartRole::ALL
            .iter()
            .zip(found.iter())
            .filter(|(_, id)| id.is_none())
            .map(|(role, _)| *role)
            .collect();
        if !missing.is_empty() {
            return Err(ConstructionError::MissingParts(missing));
        }

        match found {
            [Some(chassis), Some(fl), Some(fr), Some(bl), Some(br)] => Ok(Self {
                chassis,
                wheels: [fl, fr, bl, br],
            }),
            _ => Err(ConstructionError::MissingParts(PartRole::ALL.to_vec())),
        }
    }

    pub fn wheel(&self, role: WheelRole) -> ObjectId {
        self.wheels[role.index()]
    }

    pub fn get(&self, role: PartRole) -> ObjectId {
        match role {
            PartRole::Chassis => self.chassis,
            PartRole::Wheel(wheel) => self.wheel(wheel),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RigId(u64);

impl RigId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RigPart {
    pub role: PartRole,
    pub object: ObjectId,
    pub body: RigidBodyHandle,
}

/// A built vehicle: chassis plus four hinged wheels.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRig {
    pub id: RigId,
    pub spawn: Vec3,
    pub chassis: RigPart,
    pub wheels: [RigPart; 4],
    pub joints: [ImpulseJointHandle; 4],
}

impl VehicleRig {
    pub fn wheel(&self, role: WheelRole) -> &RigPart {
        &self.wheels[role.index()]
    }

    /// Chassis first, then wheels in `WheelRole::ALL` order.
    pub fn parts(&self) -> impl Iterator<Item = &RigPart> + '_ {
        std::iter::once(&self.chassis).chain(self.wheels.iter())
    }

    pub fn bindings(&self) -> Vec<Binding> {
        self.parts()
            .map(|part| Binding::new(part.object, part.body).with_rig(self.id))
            .collect()
    }
}

/// Builds vehicle rigs from assets, handing out a fresh id per rig.
#[derive(Debug, Default)]
pub struct RigBuilder {
    next_id: u64,
}

impl RigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the asset's parts into `scene` and creates the bodies, colliders and
    /// joints of one rig at `spawn`.
    ///
    /// On error nothing created by this call is left in `scene` or `physics`.
    pub fn build(
        &mut self,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
        asset: &Scene,
        spawn: Vec3,
    ) -> Result<VehicleRig, ConstructionError> {
        let manifest = RigManifest::locate(asset, asset.root())?;

        let parts = PartRole::ALL.map(|role| manifest.get(role));
        let mut objects = Vec::with_capacity(PartRole::ALL.len());
        for role in PartRole::ALL {
            // Parts nested inside another part are copied only as themselves.
            let source = manifest.get(role);
            let others: Vec<ObjectId> = parts.into_iter().filter(|&id| id != source).collect();
            let Some(object) = scene.graft_excluding(asset, source, scene.root(), &others) else {
                Self::discard(physics, scene, &objects, &[]);
                return Err(ConstructionError::MissingParts(vec![role]));
            };
            if let Some(part) = scene.get_mut(object) {
                part.transform.translation = Vec3::ZERO;
            }
            objects.push(object);
        }

        let points = hull::extract_points(scene, objects[0]);
        if points.is_empty() {
            Self::discard(physics, scene, &objects, &[]);
            return Err(ConstructionError::EmptyHull(PartRole::Chassis.part_name()));
        }

        let chassis_body = physics.create_body(
            &BodyDesc::dynamic()
                .translation(spawn)
                .can_sleep(false),
        );
        let wheel_bodies = WheelRole::ALL.map(|role| {
            physics.create_body(
                &BodyDesc::dynamic()
                    .translation(spawn + role.spawn_offset())
                    .can_sleep(false),
            )
        });
        let mut bodies = vec![chassis_body];
        bodies.extend(wheel_bodies);

        let joints = match Self::assemble(physics, chassis_body, &wheel_bodies, points) {
            Ok(joints) => joints,
            Err(err) => {
                Self::discard(physics, scene, &objects, &bodies);
                return Err(err);
            }
        };

        for (&object, &body) in objects.iter().zip(bodies.iter()) {
            if let Some((translation, rotation)) = physics.body_pose(body) {
                scene.set_world_pose(object, translation, rotation);
            }
        }

        let id = RigId::new(self.next_id);
        self.next_id += 1;

        let part = |i: usize| RigPart {
            role: PartRole::ALL[i],
            object: objects[i],
            body: bodies[i],
        };
        let rig = VehicleRig {
            id,
            spawn,
            chassis: part(0),
            wheels: [part(1), part(2), part(3), part(4)],
            joints,
        };

        log::info!("built vehicle rig {} at {spawn}", id.get());
        Ok(rig)
    }

    fn assemble(
        physics: &mut PhysicsWorld,
        chassis: RigidBodyHandle,
        wheels: &[RigidBodyHandle; 4],
        points: Vec<Vec3>,
    ) -> Result<[ImpulseJointHandle; 4], ConstructionError> {
        physics.create_collider(
            &ColliderDesc::convex_hull(points)
                .mass(CHASSIS_MASS)
                .restitution(RESTITUTION),
            chassis,
        )?;

        for (role, &wheel) in WheelRole::ALL.iter().zip(wheels.iter()) {
            physics.create_collider(&role.collider(), wheel)?;
        }

        let mut joints = [ImpulseJointHandle::invalid(); 4];
        for (i, role) in WheelRole::ALL.into_iter().enumerate() {
            let desc = RevoluteDesc::new(role.chassis_anchor(), Vec3::ZERO, role.axis());
            joints[i] = physics.create_revolute_joint(chassis, wheels[i], &desc)?;
        }
        Ok(joints)
    }

    fn discard(
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
        objects: &[ObjectId],
        bodies: &[RigidBodyHandle],
    ) {
        for &body in bodies {
            physics.remove_body(body);
        }
        for &object in objects {
            scene.remove(object);
        }
    }
}
