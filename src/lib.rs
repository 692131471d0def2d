//! # Part Viewer
//!
//! Interactive viewer for a single animated glTF model.
//!
//! - Click a part to play its open / close animation forwards or backwards
//! - Hover a part to see its metadata card
//! - Recolor the designated target part from a swatch panel
//! - Orbit, pan and zoom the camera
//!
//! The crate is split into a platform-independent core ([`viewer::Viewer`]
//! with its scene, animation, picking and loading layers) and an optional
//! windowed front end ([`app`], feature `winit`) built on winit, wgpu and
//! egui.
//!
//! ```rust,ignore
//! use part_viewer::{app::winit::App, config::ViewerConfig};
//!
//! App::new(ViewerConfig::load()?).run()?;
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod assets;
pub mod color;
pub mod config;
pub mod errors;
pub mod metadata;
pub mod raycast;
pub mod resources;
pub mod scene;
pub mod utils;
pub mod viewer;

#[cfg(feature = "winit")]
pub mod app;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use assets::{LoadState, ModelLoad, Prefab};
pub use config::ViewerConfig;
pub use errors::{Result, ViewerError};
pub use metadata::{MetadataTable, PartMetadata};
pub use resources::{Material, Mesh};
pub use scene::{Camera, Light, Node, NodeHandle, Scene};
pub use utils::OrbitControls;
pub use viewer::{AnimationToggleController, ToggleState, Tooltip, Viewer, ViewerEvent};
