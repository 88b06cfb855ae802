use std::path::PathBuf;

/// Implicit-tiling grid address of a tile: `tiles/{level}/{x}/{y}/{z}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoords {
    pub level: u32,
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// A leaf tile discovered by traversal, awaiting processing.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDescriptor {
    /// Unique within one traversal, assigned in discovery order.
    pub tile_id: u64,
    pub parent_id: Option<u64>,
    /// Depth in the tileset hierarchy (0 = root).
    pub lod_level: u32,
    /// Content URI as written in the tileset, relative to its document.
    pub tile_uri: String,
    /// `tile_uri` resolved against the owning document's directory.
    pub asset_path: PathBuf,
    pub screen_space_error: Option<f64>,
    pub grid_coords: Option<GridCoords>,
}
