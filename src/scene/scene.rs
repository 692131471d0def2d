use glam::{Vec3, Vec4};
use slotmap::SlotMap;

use crate::assets::prefab::Prefab;
use crate::resources::{Material, Mesh};
use crate::scene::light::Light;
use crate::scene::node::Node;
use crate::scene::transform_system;
use crate::scene::{MaterialKey, MeshKey, NodeHandle};

/// Scene graph container.
///
/// Owns every node, mesh and material. Nodes form a forest under
/// `root_nodes`; meshes and materials live in their own pools and are
/// referenced by key so materials can be shared between parts.
#[derive(Debug)]
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub meshes: SlotMap<MeshKey, Mesh>,
    pub materials: SlotMap<MaterialKey, Material>,

    pub lights: Vec<Light>,
    /// Linear RGBA clear color.
    pub background: Vec4,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            lights: Vec::new(),
            background: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Creates an empty named node at the scene root.
    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    /// Adds a node at the scene root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        } else {
            log::warn!("Parent node not found; adding node at the scene root");
            if let Some(c) = self.nodes.get_mut(handle) {
                c.parent = None;
            }
            self.root_nodes.push(handle);
        }
        handle
    }

    /// Moves `child` (with its subtree) under `parent`.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            log::error!("Node not found during attach!");
            return;
        }

        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn first_child(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle)?.children.first().copied()
    }

    /// `root` and all of its descendants in depth-first pre-order.
    #[must_use]
    pub fn subtree(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Descendants of `root` (excluding `root`) in depth-first pre-order.
    #[must_use]
    pub fn descendants(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut all = self.subtree(root);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    /// First node named `name` in the subtree of `root` (pre-order, `root` included).
    #[must_use]
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.subtree(root)
            .into_iter()
            .find(|&h| self.nodes.get(h).is_some_and(|n| n.name == name))
    }

    // ========================================================================
    // Resources
    // ========================================================================

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshKey {
        self.meshes.insert(mesh)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialKey {
        self.materials.insert(material)
    }

    /// Material referenced by `handle`, if the node exists and has one.
    pub fn node_material_mut(&mut self, handle: NodeHandle) -> Option<&mut Material> {
        let key = self.nodes.get(handle)?.material?;
        self.materials.get_mut(key)
    }

    #[must_use]
    pub fn node_material(&self, handle: NodeHandle) -> Option<&Material> {
        let key = self.nodes.get(handle)?.material?;
        self.materials.get(key)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn set_background(&mut self, rgb: Vec3) {
        self.background = rgb.extend(1.0);
    }

    // ========================================================================
    // Prefab instantiation
    // ========================================================================

    /// Instantiates `prefab` under a fresh root node named after it and
    /// returns that root. Mesh and material indices are remapped to keys in
    /// this scene, so parts that shared a material keep sharing it.
    pub fn instantiate(&mut self, prefab: &Prefab) -> NodeHandle {
        let material_keys: Vec<MaterialKey> = prefab
            .materials
            .iter()
            .map(|m| self.materials.insert(m.clone()))
            .collect();
        let mesh_keys: Vec<MeshKey> = prefab
            .meshes
            .iter()
            .map(|m| self.meshes.insert(m.clone()))
            .collect();

        let handles: Vec<NodeHandle> = prefab
            .nodes
            .iter()
            .map(|pn| {
                let mut node = Node::new(pn.name.clone());
                node.transform = pn.transform.clone();
                node.transform.mark_dirty();
                node.mesh = pn.mesh.and_then(|i| mesh_keys.get(i).copied());
                node.material = pn.material.and_then(|i| material_keys.get(i).copied());
                self.nodes.insert(node)
            })
            .collect();

        for (index, pn) in prefab.nodes.iter().enumerate() {
            for &child_index in &pn.children_indices {
                if let Some(&child) = handles.get(child_index) {
                    self.link(child, handles[index]);
                }
            }
        }

        let root = self.create_node_with_name(&prefab.name);
        for &index in &prefab.root_indices {
            if let Some(&handle) = handles.get(index) {
                self.link(handle, root);
            }
        }
        root
    }

    /// Parent link for freshly inserted, still detached nodes.
    fn link(&mut self, child: NodeHandle, parent: NodeHandle) {
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
    }

    // ========================================================================
    // Matrix update
    // ========================================================================

    /// Propagates local transforms into world matrices. Call once per frame
    /// after animation and before picking or rendering.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &self.root_nodes);
    }
}
