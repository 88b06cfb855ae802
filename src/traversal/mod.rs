//! Tileset traversal: flattens a 3D Tiles tree (nested documents and implicit
//! grids included) into leaf tile descriptors ordered by LOD.
//!
//! Nested documents are followed without cycle detection; the input is
//! assumed to be a finite tree.

pub mod document;
pub mod implicit;

use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::types::TileDescriptor;

use document::{ContentRef, TileNodeDoc};

/// Hands out unique tile ids in discovery order, starting at 1.
#[derive(Debug, Clone)]
pub struct TileIdCounter {
    next: u64,
}

impl Default for TileIdCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl TileIdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Traverse a tileset document, returning every leaf tile sorted by LOD.
pub fn traverse(tileset_path: &Path) -> Result<Vec<TileDescriptor>> {
    let mut counter = TileIdCounter::new();
    traverse_with_counter(tileset_path, &mut counter)
}

/// Like [`traverse`], drawing ids from a caller-owned counter.
pub fn traverse_with_counter(
    tileset_path: &Path,
    counter: &mut TileIdCounter,
) -> Result<Vec<TileDescriptor>> {
    info!(path = %tileset_path.display(), "Loading tileset");
    let doc = document::load_document(tileset_path)?;

    let mut walker = Walker {
        counter,
        tiles: Vec::new(),
    };
    if let Some(root) = &doc.root {
        walker.visit(root, None, 0, None, parent_dir(tileset_path))?;
    }

    let mut tiles = walker.tiles;
    tiles.sort_by_key(|t| t.lod_level);

    info!(tiles = tiles.len(), "Total tiles to process");
    Ok(tiles)
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

struct Walker<'c> {
    counter: &'c mut TileIdCounter,
    tiles: Vec<TileDescriptor>,
}

impl Walker<'_> {
    fn visit(
        &mut self,
        node: &TileNodeDoc,
        parent_id: Option<u64>,
        lod_level: u32,
        inherited_error: Option<f64>,
        base_dir: &Path,
    ) -> Result<()> {
        let screen_space_error = node.geometric_error.or(inherited_error);
        let mut own_id = None;

        let content = node.content.as_ref().and_then(|c| c.reference());
        match content.map(ContentRef::classify) {
            Some(ContentRef::Implicit) => {
                for tile in implicit::scan_grid(base_dir)? {
                    let tile_id = self.counter.next_id();
                    self.tiles.push(TileDescriptor {
                        tile_id,
                        parent_id,
                        lod_level: tile.coords.level,
                        asset_path: base_dir.join(&tile.uri),
                        tile_uri: tile.uri,
                        screen_space_error,
                        grid_coords: Some(tile.coords),
                    });
                }
            }
            Some(ContentRef::Tileset(uri)) => {
                let nested_path = base_dir.join(uri);
                debug!(path = %nested_path.display(), "Following nested tileset");
                let nested = document::load_document(&nested_path)?;
                if let Some(root) = &nested.root {
                    self.visit(
                        root,
                        parent_id,
                        lod_level,
                        screen_space_error,
                        parent_dir(&nested_path),
                    )?;
                }
            }
            Some(ContentRef::Asset(uri)) => {
                let tile_id = self.counter.next_id();
                own_id = Some(tile_id);
                self.tiles.push(TileDescriptor {
                    tile_id,
                    parent_id,
                    lod_level,
                    tile_uri: uri.to_string(),
                    asset_path: base_dir.join(uri),
                    screen_space_error,
                    grid_coords: None,
                });
            }
            Some(ContentRef::Unsupported(uri)) => {
                debug!(uri, "Skipping unsupported tile content");
            }
            None => {}
        }

        // Grid tiles do not parent the node's children.
        let child_parent = own_id.or(parent_id);
        for child in &node.children {
            self.visit(
                child,
                child_parent,
                lod_level + 1,
                screen_space_error,
                base_dir,
            )?;
        }
        Ok(())
    }
}
