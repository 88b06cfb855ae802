use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{InspectError, Result};

/// Extensions accepted as mesh tile content.
pub const ASSET_EXTENSIONS: [&str; 2] = ["glb", "gltf"];

/// The subset of a tileset.json needed for traversal.
#[derive(Debug, Default, Deserialize)]
pub struct TilesetDocument {
    #[serde(default)]
    pub root: Option<TileNodeDoc>,
}

/// One node of the tile tree.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileNodeDoc {
    #[serde(default)]
    pub geometric_error: Option<f64>,
    #[serde(default)]
    pub content: Option<ContentDoc>,
    #[serde(default)]
    pub children: Vec<TileNodeDoc>,
}

/// Tile content reference. 3D Tiles 1.0 documents may use `url`.
#[derive(Debug, Default, Deserialize)]
pub struct ContentDoc {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ContentDoc {
    /// The content reference, preferring `uri` over `url`.
    pub fn reference(&self) -> Option<&str> {
        self.uri.as_deref().or(self.url.as_deref())
    }
}

/// What a node's content reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRef<'a> {
    /// `{level}/{x}/{y}/{z}` template: scan the implicit grid on disk.
    Implicit,
    /// Nested tileset document.
    Tileset(&'a str),
    /// Mesh asset.
    Asset(&'a str),
    /// Anything else (b3dm, pnts, subtrees...): ignored.
    Unsupported(&'a str),
}

impl<'a> ContentRef<'a> {
    pub fn classify(uri: &'a str) -> Self {
        if uri.contains("{level}") {
            return ContentRef::Implicit;
        }

        let ext = Path::new(uri)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if ext == "json" {
            ContentRef::Tileset(uri)
        } else if ASSET_EXTENSIONS.contains(&ext.as_str()) {
            ContentRef::Asset(uri)
        } else {
            ContentRef::Unsupported(uri)
        }
    }
}

/// Read and parse a tileset document.
pub fn load_document(path: &Path) -> Result<TilesetDocument> {
    let text = fs::read_to_string(path).map_err(|e| {
        InspectError::Tileset(format!("Failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        InspectError::Tileset(format!("Failed to parse {}: {e}", path.display()))
    })
}
