pub mod gltf_loader;

use std::path::Path;

use crate::error::Result;
use crate::types::AbstractMesh;

pub use gltf_loader::GltfLoader;

/// Turns a tile asset on disk into an [`AbstractMesh`].
///
/// Implementations are shared across worker threads.
pub trait MeshLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<AbstractMesh>;
}
