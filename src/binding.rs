use rapier3d::prelude::RigidBodyHandle;
use rustc_hash::FxHashMap;

use crate::{scene::ObjectId, vehicle::RigId};

/// Pairs a visual object with the physics body that drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub object: ObjectId,
    pub body: RigidBodyHandle,
    /// Whether pointer picks may target this binding.
    pub pickable: bool,
    /// The vehicle rig this binding belongs to, if any.
    pub rig: Option<RigId>,
}

impl Binding {
    pub fn new(object: ObjectId, body: RigidBodyHandle) -> Self {
        Self {
            object,
            body,
            pickable: false,
            rig: None,
        }
    }

    pub fn pickable(mut self, pickable: bool) -> Self {
        self.pickable = pickable;
        self
    }

    pub fn with_rig(mut self, rig: RigId) -> Self {
        self.rig = Some(rig);
        self
    }
}

/// Ordered set of bindings, keyed by visual object.
///
/// Each object is bound at most once. Rig bindings are added and removed as a
/// unit, so iteration never sees part of a rig.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: Vec<Binding>,
    by_object: FxHashMap<ObjectId, RigidBodyHandle>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and leaves the registry untouched if the object is already bound.
    pub fn add(&mut self, binding: Binding) -> bool {
        if self.by_object.contains_key(&binding.object) {
            log::warn!("object {:?} is already bound", binding.object);
            return false;
        }
        self.by_object.insert(binding.object, binding.body);
        self.bindings.push(binding);
        true
    }

    /// Appends every binding of a rig, or none of them.
    pub fn add_rig(&mut self, rig: RigId, bindings: &[Binding]) -> bool {
        let mut seen = FxHashMap::default();
        for binding in bindings {
            if self.by_object.contains_key(&binding.object)
                || seen.insert(binding.object, ()).is_some()
            {
                log::warn!("rig {rig:?} rejected: object {:?} is already bound", binding.object);
                return false;
            }
        }
        for binding in bindings {
            self.by_object.insert(binding.object, binding.body);
            self.bindings.push(binding.with_rig(rig));
        }
        true
    }

    pub fn remove(&mut self, object: ObjectId) -> Option<Binding> {
        self.by_object.remove(&object)?;
        let index = self.bindings.iter().position(|b| b.object == object)?;
        Some(self.bindings.remove(index))
    }

    /// Removes every binding that belongs to `rig`, preserving the order of the rest.
    pub fn remove_rig(&mut self, rig: RigId) -> Vec<Binding> {
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .bindings
            .drain(..)
            .partition(|b| b.rig == Some(rig));
        self.bindings = kept;
        for binding in &removed {
            self.by_object.remove(&binding.object);
        }
        removed
    }

    pub fn for_each(&self, mut f: impl FnMut(&Binding)) {
        for binding in &self.bindings {
            f(binding);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn body_of(&self, object: ObjectId) -> Option<RigidBodyHandle> {
        self.by_object.get(&object).copied()
    }

    pub fn pickable_objects(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.iter().filter(|b| b.pickable)
    }

    pub fn rig_len(&self, rig: RigId) -> usize {
        self.bindings.iter().filter(|b| b.rig == Some(rig)).count()
    }
}
