//! CPU-side resources: meshes and materials referenced by scene nodes, and
//! the platform-agnostic input state. Nothing in here depends on the GPU.

pub mod input;
pub mod material;
pub mod mesh;

pub use input::{ButtonState, Input, MouseButton};
pub use material::Material;
pub use mesh::{BoundingBox, Mesh};
