pub mod lines;
pub mod object;

use glam::{Mat4, Quat, Vec3};
use petgraph::{prelude::*, visit::EdgeRef};

pub use self::{
    lines::LineSegments,
    object::{Geometry, Object, ObjectId},
};

/// Tree of visual objects rooted at an implicit identity-transform root.
#[derive(Debug, Clone)]
pub struct Scene {
    root: NodeIndex,
    graph: StableDiGraph<Object, ()>,
}

impl Scene {
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(Object::group("root"));
        Self { root, graph }
    }

    pub fn root(&self) -> ObjectId {
        ObjectId(self.root)
    }

    /// Number of objects, including the root.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() <= 1
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.graph.contains_node(id.0)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.graph.node_weight(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.graph.node_weight_mut(id.0)
    }

    /// Adds `object` under `parent`. Falls back to the root when `parent` is gone.
    pub fn add(&mut self, object: Object, parent: ObjectId) -> ObjectId {
        let parent = if self.contains(parent) {
            parent.0
        } else {
            self.root
        };
        let node = self.graph.add_node(object);
        self.graph.add_edge(parent, node, ());
        ObjectId(node)
    }

    pub fn add_to_root(&mut self, object: Object) -> ObjectId {
        self.add(object, self.root())
    }

    /// Removes `id` and its whole subtree. Returns the number of removed objects.
    pub fn remove(&mut self, id: ObjectId) -> usize {
        if id.0 == self.root || !self.contains(id) {
            return 0;
        }
        let doomed = self.descendants(id);
        for node in &doomed {
            self.graph.remove_node(node.0);
        }
        doomed.len()
    }

    pub fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.graph
            .neighbors_directed(id.0, Direction::Incoming)
            .next()
            .map(ObjectId)
    }

    /// Children in insertion order.
    pub fn children_of(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut children: Vec<_> = self
            .graph
            .neighbors_directed(id.0, Direction::Outgoing)
            .map(ObjectId)
            .collect();
        children.reverse();
        children
    }

    /// `id` followed by all of its descendants, depth first.
    pub fn descendants(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children_of(next).into_iter().rev());
        }
        out
    }

    /// Depth-first search for a named object inside the subtree at `from`.
    pub fn find_by_name(&self, from: ObjectId, name: &str) -> Option<ObjectId> {
        self.descendants(from)
            .into_iter()
            .find(|id| self.graph[id.0].name.as_deref() == Some(name))
    }

    /// Re-parents `id` under `parent`, keeping its local transform.
    pub fn set_parent(&mut self, id: ObjectId, parent: ObjectId) -> bool {
        if id.0 == self.root
            || !self.contains(id)
            || !self.contains(parent)
            || self.descendants(id).contains(&parent)
        {
            return false;
        }
        if let Some(edge) = self
            .graph
            .edges_directed(id.0, Direction::Incoming)
            .next()
            .map(|e| e.id())
        {
            self.graph.remove_edge(edge);
        }
        self.graph.add_edge(parent.0, id.0, ());
        true
    }

    /// Product of local transforms from the root down to `id`, inclusive.
    pub fn world_matrix(&self, id: ObjectId) -> Option<Mat4> {
        self.relative_matrix(id, self.root())
    }

    /// Product of local transforms from just below `ancestor` down to `id`, inclusive.
    ///
    /// Returns `None` when `ancestor` is not on the path from `id` to the root.
    pub fn relative_matrix(&self, id: ObjectId, ancestor: ObjectId) -> Option<Mat4> {
        let mut matrix = Mat4::IDENTITY;
        let mut current = id;
        loop {
            if current == ancestor {
                return Some(matrix);
            }
            let object = self.get(current)?;
            matrix = object.transform.matrix() * matrix;
            current = self.parent_of(current)?;
        }
    }

    /// Places `id` at the given world-space pose, keeping its scale.
    pub fn set_world_pose(&mut self, id: ObjectId, translation: Vec3, rotation: Quat) {
        let parent = match self.parent_of(id) {
            Some(parent) => parent,
            None => return,
        };
        let parent_matrix = self.world_matrix(parent).unwrap_or(Mat4::IDENTITY);
        let Some(object) = self.get_mut(id) else {
            return;
        };

        if parent_matrix == Mat4::IDENTITY {
            object.transform.translation = translation;
            object.transform.rotation = rotation;
        } else {
            let (_, parent_rotation, _) = parent_matrix.to_scale_rotation_translation();
            object.transform.translation = parent_matrix.inverse().transform_point3(translation);
            object.transform.rotation = parent_rotation.inverse() * rotation;
        }
    }

    /// Deep-copies the subtree at `source_id` of `source` under `parent`.
    pub fn graft(&mut self, source: &Scene, source_id: ObjectId, parent: ObjectId) -> Option<ObjectId> {
        self.graft_excluding(source, source_id, parent, &[])
    }

    /// Like [`Scene::graft`], but leaves out the `excluded` objects and their subtrees.
    pub fn graft_excluding(
        &mut self,
        source: &Scene,
        source_id: ObjectId,
        parent: ObjectId,
        excluded: &[ObjectId],
    ) -> Option<ObjectId> {
        let object = source.get(source_id)?.clone();
        let id = self.add(object, parent);
        for child in source.children_of(source_id) {
            if !excluded.contains(&child) {
                self.graft_excluding(source, child, id, excluded);
            }
        }
        Some(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> + '_ {
        self.graph
            .node_indices()
            .map(move |node| (ObjectId(node), &self.graph[node]))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
