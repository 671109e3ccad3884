use glam::{Vec2, Vec3};

use crate::{
    binding::{Binding, BindingRegistry},
    core::{camera::Camera, geom::Ray, mesh::Mesh, transform::Transform},
    debug_render::DebugRenderer,
    error::ConstructionError,
    physics::{BodyDesc, BodyKind, ColliderDesc, PhysicsError, PhysicsWorld},
    scene::{Object, ObjectId, Scene},
    vehicle::{RigBuilder, RigId, VehicleRig},
};

pub mod loader;

pub use loader::ConstructionTask;

/// Tunables of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    pub gravity: Vec3,
    /// Upper bound on a single physics step, in seconds.
    pub max_timestep: f32,
    /// Upward impulse applied to a picked body.
    pub pick_impulse: f32,
    pub debug_render: bool,
    pub camera_eye: Vec3,
    pub camera_target: Vec3,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            max_timestep: 0.1,
            pick_impulse: 10.0,
            debug_render: true,
            camera_eye: Vec3::new(0.0, 2.0, 5.0),
            camera_target: Vec3::new(0.0, 1.0, 0.0),
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl SimulationConfig {
    pub fn camera(&self) -> Camera {
        Camera::perspective_lookat(
            self.camera_eye,
            self.camera_target,
            Vec3::Y,
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }
}

/// Owns the scene, the physics world and the bindings between them, and drives
/// them one frame at a time.
pub struct App {
    config: SimulationConfig,
    physics: PhysicsWorld,
    scene: Scene,
    registry: BindingRegistry,
    camera: Camera,
    debug: DebugRenderer,
    rig_builder: RigBuilder,
    rigs: Vec<VehicleRig>,
    pending: Vec<ConstructionTask>,
}

impl App {
    pub fn new(config: SimulationConfig) -> Self {
        let mut scene = Scene::new();
        let debug = DebugRenderer::new(&mut scene, config.debug_render);
        Self {
            physics: PhysicsWorld::new(config.gravity),
            camera: config.camera(),
            registry: BindingRegistry::new(),
            rig_builder: RigBuilder::new(),
            rigs: Vec::new(),
            pending: Vec::new(),
            scene,
            debug,
            config,
        }
    }

    /// Runs one frame and returns the timestep handed to the physics world.
    pub fn tick(&mut self, delta_seconds: f32) -> f32 {
        self.admit_pending();

        let dt = delta_seconds.max(0.0).min(self.config.max_timestep);
        self.physics.step(dt);

        self.sync_bindings();
        self.debug.update(&mut self.physics, &mut self.scene);

        dt
    }

    fn sync_bindings(&mut self) {
        let physics = &self.physics;
        let scene = &mut self.scene;
        self.registry.for_each(|binding| {
            if let Some((translation, rotation)) = physics.body_pose(binding.body) {
                scene.set_world_pose(binding.object, translation, rotation);
            }
        });
    }

    /// Casts a ray through `ndc` and kicks the nearest pickable object upward.
    pub fn pick(&mut self, ndc: Vec2) -> Option<ObjectId> {
        let ray = self.camera.ndc_to_ray(ndc);
        self.pick_ray(&ray)
    }

    /// Like [`App::pick`], from a pixel position in a viewport of `viewport_size` pixels.
    pub fn click(&mut self, pixel: Vec2, viewport_size: Vec2) -> Option<ObjectId> {
        let ray = self.camera.screen_to_ray(pixel, viewport_size);
        self.pick_ray(&ray)
    }

    fn pick_ray(&mut self, ray: &Ray) -> Option<ObjectId> {
        let mut nearest: Option<(f32, Binding)> = None;
        for binding in self.registry.pickable_objects() {
            let Some(mesh) = self.scene.get(binding.object).and_then(Object::as_mesh) else {
                continue;
            };
            let Some(matrix) = self.scene.world_matrix(binding.object) else {
                continue;
            };
            if let Some(distance) = mesh.intersect_ray(ray, matrix) {
                if nearest.map_or(true, |(best, _)| distance < best) {
                    nearest = Some((distance, *binding));
                }
            }
        }

        let (distance, binding) = nearest?;
        let impulse = Vec3::new(0.0, self.config.pick_impulse, 0.0);
        if let Err(err) = self.physics.apply_impulse(binding.body, impulse) {
            log::warn!("pick hit {:?} but its body is gone: {err}", binding.object);
            return None;
        }
        log::debug!("picked {:?} at distance {distance}", binding.object);
        Some(binding.object)
    }

    /// Adds a bound object whose pose follows a new body. Dynamic props are pickable,
    /// and pickable bodies never sleep.
    pub fn spawn_prop(
        &mut self,
        name: &str,
        mesh: Mesh,
        body: BodyDesc,
        collider: ColliderDesc,
    ) -> Result<ObjectId, PhysicsError> {
        let pickable = body.kind == BodyKind::Dynamic;
        let body = if pickable { body.can_sleep(false) } else { body };
        let handle = self.physics.create_body(&body);
        if let Err(err) = self.physics.create_collider(&collider, handle) {
            self.physics.remove_body(handle);
            return Err(err);
        }

        let object = self.scene.add_to_root(
            Object::mesh(mesh)
                .with_name(name)
                .with_transform(Transform::from_translation(body.translation)),
        );
        self.registry
            .add(Binding::new(object, handle).pickable(pickable));
        Ok(object)
    }

    /// Adds an object and a fixed body that never move, so they are not bound.
    pub fn spawn_fixed(
        &mut self,
        name: &str,
        mesh: Mesh,
        translation: Vec3,
        collider: ColliderDesc,
    ) -> Result<ObjectId, PhysicsError> {
        let handle = self
            .physics
            .create_body(&BodyDesc::fixed().translation(translation));
        if let Err(err) = self.physics.create_collider(&collider, handle) {
            self.physics.remove_body(handle);
            return Err(err);
        }
        Ok(self.scene.add_to_root(
            Object::mesh(mesh)
                .with_name(name)
                .with_transform(Transform::from_translation(translation)),
        ))
    }

    /// Floor plus one prop of every collider shape.
    pub fn spawn_showcase(&mut self) -> Result<Vec<ObjectId>, PhysicsError> {
        self.spawn_fixed(
            "floor",
            Mesh::cuboid(50.0, 1.0, 50.0),
            Vec3::new(0.0, -1.0, 0.0),
            ColliderDesc::cuboid(25.0, 0.5, 25.0),
        )?;

        let prop = |x: f32| BodyDesc::dynamic().translation(Vec3::new(x, 5.0, 0.0));
        let knot = Mesh::torus_knot(1.0, 0.4, 64, 8, 2, 3);
        let icosahedron = Mesh::icosahedron(1.0);

        let props = [
            (
                "cube",
                Mesh::cuboid(1.0, 1.0, 1.0),
                prop(-5.0).can_sleep(false),
                ColliderDesc::cuboid(0.5, 0.5, 0.5),
            ),
            (
                "ball",
                Mesh::uv_sphere(1.0, 32, 16),
                prop(-2.5).can_sleep(false),
                ColliderDesc::ball(1.0),
            ),
            (
                "cylinder",
                Mesh::cylinder(1.0, 1.0, 2.0, 16),
                prop(0.0).can_sleep(false),
                ColliderDesc::cylinder(1.0, 1.0),
            ),
            (
                "icosahedron",
                icosahedron.clone(),
                prop(2.5).can_sleep(false),
                ColliderDesc::convex_hull(icosahedron.positions),
            ),
            (
                "torus_knot",
                knot.clone(),
                prop(5.0),
                ColliderDesc::trimesh(knot.positions.clone(), knot.triangle_indices()),
            ),
        ];

        let mut objects = Vec::with_capacity(props.len());
        for (name, mesh, body, collider) in props {
            let collider = collider.mass(1.0).restitution(0.5);
            objects.push(self.spawn_prop(name, mesh, body, collider)?);
        }
        log::info!("spawned {} showcase props", objects.len());
        Ok(objects)
    }

    /// Builds a rig from an in-memory asset and admits all of its bindings at once.
    pub fn build_vehicle(&mut self, asset: &Scene, spawn: Vec3) -> Result<RigId, ConstructionError> {
        let rig = self
            .rig_builder
            .build(&mut self.physics, &mut self.scene, asset, spawn)?;

        if !self.registry.add_rig(rig.id, &rig.bindings()) {
            self.discard_rig(&rig);
            return Err(ConstructionError::Unregistered(rig.id.get()));
        }

        log::info!("admitted vehicle rig {}", rig.id.get());
        let id = rig.id;
        self.rigs.push(rig);
        Ok(id)
    }

    /// Queues a construction task; its rig is admitted by a later `tick`.
    pub fn request_vehicle(&mut self, task: ConstructionTask) {
        log::debug!("queued vehicle from {} at {}", task.source(), task.spawn_point());
        self.pending.push(task);
    }

    pub fn pending_vehicles(&self) -> usize {
        self.pending.len()
    }

    /// Builds rigs for every construction task that has finished loading.
    pub fn admit_pending(&mut self) -> Vec<Result<RigId, ConstructionError>> {
        let mut results = Vec::new();
        let mut still_pending = Vec::new();
        for task in std::mem::take(&mut self.pending) {
            match task.try_finish() {
                Some(loaded) => {
                    results.push(self.finish(task.source(), task.spawn_point(), loaded))
                }
                None => still_pending.push(task),
            }
        }
        self.pending = still_pending;
        results
    }

    /// Blocks until every queued construction task is done, then builds their rigs.
    pub fn wait_for_vehicles(&mut self) -> Vec<Result<RigId, ConstructionError>> {
        let tasks = std::mem::take(&mut self.pending);
        tasks
            .into_iter()
            .map(|task| {
                let source = task.source().to_string();
                let spawn = task.spawn_point();
                let loaded = task.wait();
                self.finish(&source, spawn, loaded)
            })
            .collect()
    }

    fn finish(
        &mut self,
        source: &str,
        spawn: Vec3,
        loaded: Result<Scene, ConstructionError>,
    ) -> Result<RigId, ConstructionError> {
        let result = loaded.and_then(|asset| self.build_vehicle(&asset, spawn));
        if let Err(err) = &result {
            log::error!("failed to build vehicle from {source}: {err}");
        }
        result
    }

    /// Tears down a rig: bindings first, then bodies (with their colliders and
    /// joints), then visual objects.
    pub fn remove_vehicle(&mut self, id: RigId) -> bool {
        let Some(index) = self.rigs.iter().position(|rig| rig.id == id) else {
            return false;
        };
        let rig = self.rigs.remove(index);
        self.discard_rig(&rig);
        log::info!("removed vehicle rig {}", id.get());
        true
    }

    fn discard_rig(&mut self, rig: &VehicleRig) {
        self.registry.remove_rig(rig.id);
        for part in rig.parts() {
            self.physics.remove_body(part.body);
            self.scene.remove(part.object);
        }
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
        self.physics.set_gravity(gravity);
    }

    pub fn set_debug_render(&mut self, enabled: bool) {
        self.config.debug_render = enabled;
        self.debug.set_enabled(enabled);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn debug_renderer(&self) -> &DebugRenderer {
        &self.debug
    }

    pub fn rigs(&self) -> &[VehicleRig] {
        &self.rigs
    }

    pub fn rig(&self, id: RigId) -> Option<&VehicleRig> {
        self.rigs.iter().find(|rig| rig.id == id)
    }
}

#[cfg(test)]
mod tests {
    use crate::asset;
    use crate::scene::Geometry;

    use super::*;

    fn app_without_gravity() -> App {
        App::new(SimulationConfig {
            gravity: Vec3::ZERO,
            ..Default::default()
        })
    }

    #[test]
    fn test_timestep_is_clamped() {
        let mut app = App::new(SimulationConfig::default());
        for delta in [0.01, 0.05, 0.1, 0.5, 5.0] {
            let dt = app.tick(delta);
            assert_eq!(dt, f32::min(delta, 0.1));
            assert_eq!(app.physics().timestep(), f32::min(delta, 0.1));
        }
    }

    #[test]
    fn test_tick_copies_body_pose() -> anyhow::Result<()> {
        let mut app = App::new(SimulationConfig::default());
        app.spawn_showcase()?;
        app.build_vehicle(&asset::placeholder_vehicle(), Vec3::new(0.0, 2.0, 0.0))?;
        assert_eq!(app.registry().len(), 10);

        for _ in 0..5 {
            app.tick(1.0 / 60.0);
        }

        for binding in app.registry().iter() {
            let (translation, rotation) = app.physics().body_pose(binding.body).unwrap();
            let object = app.scene().get(binding.object).unwrap();
            assert_eq!(object.transform.translation, translation);
            assert_eq!(object.transform.rotation, rotation);
        }
        Ok(())
    }

    #[test]
    fn test_pick_kicks_only_the_nearest_object() -> anyhow::Result<()> {
        let mut app = app_without_gravity();
        let eye = app.config().camera_eye;
        let target = app.config().camera_target;
        let dir = (target - eye).normalize();

        let cube = |at: Vec3| BodyDesc::dynamic().translation(at).can_sleep(false);
        let near = app.spawn_prop(
            "near",
            Mesh::cuboid(1.0, 1.0, 1.0),
            cube(eye + dir * 3.0),
            ColliderDesc::cuboid(0.5, 0.5, 0.5).mass(1.0),
        )?;
        let far = app.spawn_prop(
            "far",
            Mesh::cuboid(1.0, 1.0, 1.0),
            cube(eye + dir * 8.0),
            ColliderDesc::cuboid(0.5, 0.5, 0.5).mass(1.0),
        )?;

        app.tick(1.0 / 60.0);
        assert_eq!(app.pick(Vec2::ZERO), Some(near));
        app.tick(1.0 / 60.0);

        let near_body = app.registry().body_of(near).unwrap();
        let far_body = app.registry().body_of(far).unwrap();
        assert!(app.physics().linear_velocity(near_body).unwrap().y > 0.0);
        assert_eq!(app.physics().linear_velocity(far_body).unwrap().y, 0.0);

        assert_eq!(app.pick(Vec2::new(0.99, 0.99)), None);
        Ok(())
    }

    #[test]
    fn test_vehicles_are_not_pickable() -> anyhow::Result<()> {
        let mut app = app_without_gravity();
        app.build_vehicle(&asset::placeholder_vehicle(), Vec3::new(0.0, 1.0, 0.0))?;
        app.tick(1.0 / 60.0);
        assert_eq!(app.pick(Vec2::ZERO), None);
        Ok(())
    }

    #[test]
    fn test_click_converts_pixels() -> anyhow::Result<()> {
        let mut app = app_without_gravity();
        let eye = app.config().camera_eye;
        let dir = (app.config().camera_target - eye).normalize();
        let target = app.spawn_prop(
            "target",
            Mesh::uv_sphere(1.0, 16, 8),
            BodyDesc::dynamic().translation(eye + dir * 4.0),
            ColliderDesc::ball(1.0),
        )?;
        app.tick(1.0 / 60.0);
        let viewport = Vec2::new(1600.0, 900.0);
        assert_eq!(app.click(viewport / 2.0, viewport), Some(target));
        assert_eq!(app.click(Vec2::ZERO, viewport), None);
        Ok(())
    }

    #[test]
    fn test_queued_vehicle_is_admitted_whole() {
        let mut app = App::new(SimulationConfig::default());
        app.request_vehicle(ConstructionTask::from_scene(
            asset::placeholder_vehicle(),
            Vec3::new(0.0, 2.0, 0.0),
        ));
        assert_eq!(app.pending_vehicles(), 1);
        assert!(app.registry().is_empty());

        app.tick(1.0 / 60.0);
        assert_eq!(app.pending_vehicles(), 0);
        assert_eq!(app.rigs().len(), 1);
        assert_eq!(app.registry().len(), 5);
        assert_eq!(app.physics().joint_count(), 4);
    }

    #[test]
    fn test_failed_construction_registers_nothing() {
        let mut app = App::new(SimulationConfig::default());
        let mut asset = asset::placeholder_vehicle();
        let wheel = asset
            .find_by_name(asset.root(), "wheel_frontRight")
            .unwrap();
        asset.remove(wheel);

        app.request_vehicle(ConstructionTask::from_scene(asset, Vec3::ZERO));
        let results = app.wait_for_vehicles();
        assert!(matches!(results[..], [Err(ConstructionError::MissingParts(_))]));
        assert!(app.registry().is_empty());
        assert_eq!(app.physics().body_count(), 0);
        assert!(app.rigs().is_empty());
    }

    #[test]
    fn test_degenerate_chassis_leaves_nothing_behind() {
        let mut app = App::new(SimulationConfig::default());
        let objects_before = app.scene().len();

        let mut asset = asset::placeholder_vehicle();
        let body = asset.find_by_name(asset.root(), "body").unwrap();
        let collinear = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0], vec![0, 1, 2]);
        asset.get_mut(body).unwrap().geometry = Geometry::Mesh(collinear);

        let result = app.build_vehicle(&asset, Vec3::new(0.0, 2.0, 0.0));
        assert!(matches!(
            result,
            Err(ConstructionError::Physics(PhysicsError::DegenerateHull { .. }))
        ));
        assert!(app.registry().is_empty());
        assert!(app.rigs().is_empty());
        assert_eq!(app.physics().body_count(), 0);
        assert_eq!(app.physics().joint_count(), 0);
        assert_eq!(app.scene().len(), objects_before);
    }

    #[test]
    fn test_pickable_props_never_sleep() -> anyhow::Result<()> {
        let mut app = App::new(SimulationConfig::default());
        let objects = app.spawn_showcase()?;
        assert_eq!(app.registry().pickable_objects().count(), objects.len());
        for binding in app.registry().pickable_objects() {
            let body = app.physics().body(binding.body).unwrap();
            assert!(body.activation().linear_threshold < 0.0);
        }
        Ok(())
    }

    #[test]
    fn test_remove_vehicle() -> anyhow::Result<()> {
        let mut app = App::new(SimulationConfig::default());
        let asset = asset::placeholder_vehicle();
        let first = app.build_vehicle(&asset, Vec3::new(0.0, 2.0, 0.0))?;
        let second = app.build_vehicle(&asset, Vec3::new(-2.0, 2.0, 0.0))?;
        assert_eq!(app.physics().joint_count(), 8);

        let objects: Vec<_> = app.rig(first).unwrap().parts().map(|p| p.object).collect();
        assert!(app.remove_vehicle(first));
        assert!(!app.remove_vehicle(first));

        assert_eq!(app.registry().len(), 5);
        assert_eq!(app.registry().rig_len(second), 5);
        assert_eq!(app.physics().body_count(), 5);
        assert_eq!(app.physics().joint_count(), 4);
        assert!(objects.iter().all(|&o| !app.scene().contains(o)));

        app.tick(1.0 / 60.0);
        Ok(())
    }

    #[test]
    fn test_gravity_and_debug_toggles() {
        let mut app = App::new(SimulationConfig::default());
        app.set_gravity(Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(app.physics().gravity(), Vec3::new(0.0, -1.0, 0.0));

        app.set_debug_render(false);
        assert!(!app.debug_renderer().is_enabled());
        app.tick(1.0 / 60.0);
        let lines = app.debug_renderer().object();
        assert!(!app.scene().get(lines).unwrap().visible);

        app.set_debug_render(true);
        app.tick(1.0 / 60.0);
        assert!(app.scene().get(lines).unwrap().visible);
    }
}
