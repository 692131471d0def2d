use std::sync::Arc;

use crate::animation::clip::AnimationClip;
use crate::resources::{Material, Mesh};
use crate::scene::transform::Transform;

/// Prefab node: pure data, children referenced by index into `Prefab::nodes`.
#[derive(Debug, Clone, Default)]
pub struct PrefabNode {
    pub name: String,
    pub transform: Transform,
    pub children_indices: Vec<usize>,
    /// Index into `Prefab::meshes`.
    pub mesh: Option<usize>,
    /// Index into `Prefab::materials`.
    pub material: Option<usize>,
}

impl PrefabNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Intermediate result of parsing a model file.
///
/// A prefab is thread-safe plain data without any scene handle, so it can be
/// produced on a background thread and handed to the main context, where
/// [`Scene::instantiate`](crate::scene::Scene::instantiate) turns it into nodes.
#[derive(Debug, Clone, Default)]
pub struct Prefab {
    /// Name given to the instantiated model root.
    pub name: String,
    pub nodes: Vec<PrefabNode>,
    /// Indices of the nodes attached directly under the model root.
    pub root_indices: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub animations: Vec<Arc<AnimationClip>>,
}

impl Prefab {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a node and returns its index.
    pub fn add_node(&mut self, node: PrefabNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

pub type SharedPrefab = Arc<Prefab>;
