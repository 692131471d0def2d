use std::sync::OnceLock;

use tokio::runtime::Runtime;

use crate::assets::prefab::Prefab;
use crate::errors::{Result, ViewerError};

/// Shared runtime for background loads. Built on first use.
fn get_asset_runtime() -> Result<&'static Runtime> {
    static RUNTIME: OnceLock<std::result::Result<Runtime, String>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .thread_name("asset-loader")
                .enable_all()
                .build()
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| ViewerError::RuntimeError(format!("Failed to create asset loader runtime: {e}")))
}

/// Snapshot of an in-flight load, as seen from the frame loop.
#[derive(Debug)]
pub enum LoadState {
    Pending,
    Loaded(Box<Prefab>),
    Failed(ViewerError),
}

/// A model load running on the asset runtime.
///
/// The result arrives exactly once over a channel; the frame loop drains it
/// with [`poll`](Self::poll) and drops the handle afterwards.
#[derive(Debug)]
pub struct ModelLoad {
    source: String,
    receiver: flume::Receiver<Result<Prefab>>,
}

impl ModelLoad {
    /// Starts loading `source` (file path or URL) in the background.
    #[must_use]
    pub fn spawn(source: impl Into<String>) -> Self {
        let source = source.into();
        let (tx, rx) = flume::bounded(1);

        log::info!("Loading model: {source}");

        match get_asset_runtime() {
            Ok(runtime) => {
                let task_source = source.clone();
                runtime.spawn(async move {
                    let result = load_prefab(&task_source).await;
                    // Receiver gone means the viewer shut down; nothing to report.
                    let _ = tx.send(result);
                });
            }
            Err(e) => {
                let _ = tx.send(Err(e));
            }
        }

        Self {
            source,
            receiver: rx,
        }
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Non-blocking check for the result.
    pub fn poll(&self) -> LoadState {
        match self.receiver.try_recv() {
            Ok(Ok(prefab)) => LoadState::Loaded(Box::new(prefab)),
            Ok(Err(e)) => LoadState::Failed(e),
            Err(flume::TryRecvError::Empty) => LoadState::Pending,
            Err(flume::TryRecvError::Disconnected) => LoadState::Failed(ViewerError::LoadChannelClosed),
        }
    }
}

/// Loads `source` on the asset runtime and waits for it.
pub fn load_blocking(source: &str) -> Result<Prefab> {
    get_asset_runtime()?.block_on(load_prefab(source))
}

#[cfg(feature = "gltf")]
async fn load_prefab(source: &str) -> Result<Prefab> {
    crate::assets::loaders::GltfLoader::load_async(source).await
}

#[cfg(not(feature = "gltf"))]
async fn load_prefab(source: &str) -> Result<Prefab> {
    Err(ViewerError::FeatureNotEnabled(format!(
        "Loading '{source}' needs the `gltf` feature"
    )))
}
