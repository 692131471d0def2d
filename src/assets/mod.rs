//! Model loading.
//!
//! Bytes come from an [`io::AssetReaderVariant`] (file or HTTP), are parsed
//! into a renderer-independent [`Prefab`] and handed to the frame loop
//! through a [`ModelLoad`].

pub mod io;
pub mod loaders;
pub mod prefab;
pub mod server;

pub use io::{AssetReader, AssetReaderVariant, FileAssetReader};
#[cfg(feature = "http")]
pub use io::HttpAssetReader;
#[cfg(feature = "gltf")]
pub use loaders::GltfLoader;
pub use prefab::{Prefab, PrefabNode, SharedPrefab};
pub use server::{LoadState, ModelLoad, load_blocking};
