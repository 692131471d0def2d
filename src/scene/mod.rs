//! Scene graph.
//!
//! - [`Node`]: a part with a name, transform, children and optional mesh/material
//! - [`Transform`]: TRS with cached matrices and dirty checking
//! - [`Scene`]: node, mesh and material pools plus lights and background
//! - [`Camera`]: perspective camera used for rendering and picking
//! - [`Light`]: hemisphere and directional lights

pub mod camera;
pub mod light;
pub mod node;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod transform;
pub mod transform_system;

pub use camera::Camera;
pub use light::{Light, LightKind};
pub use node::Node;
pub use scene::Scene;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct MaterialKey;
}
