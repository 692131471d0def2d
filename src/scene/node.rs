use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{MaterialKey, MeshKey, NodeHandle};

/// A part of the scene graph.
///
/// A node is either a group (no mesh) or a drawable leaf carrying a mesh and
/// the material it is drawn with. Materials are shared: several nodes may
/// reference the same [`MaterialKey`].
#[derive(Debug, Clone)]
pub struct Node {
    /// Identifier used for picking, metadata lookup and animation binding.
    pub name: String,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    pub mesh: Option<MeshKey>,
    pub material: Option<MaterialKey>,

    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            mesh: None,
            material: None,
            visible: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World matrix as of the last [`Scene::update_matrix_world`](crate::scene::Scene::update_matrix_world).
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
