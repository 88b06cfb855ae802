use super::tile::TileDescriptor;

/// Geometry and texture quality metrics for one tile mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileStats {
    pub avg_polygon_edge_length: f64,
    pub median_polygon_edge_length: f64,
    pub std_dev_polygon_edge_length: f64,
    pub total_polygons: u64,
    pub avg_texel_size: f64,
    pub median_texel_size: f64,
    pub std_dev_texel_size: f64,
    /// Fraction of the UV grid covered by at least one face, in [0, 1].
    pub texture_utilization: f64,
    pub texture_width: u32,
}

/// One report row: tile identity merged with its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TileResult {
    pub tile_id: u64,
    pub parent_id: Option<u64>,
    pub lod_level: u32,
    pub tile_uri: String,
    pub screen_space_error: Option<f64>,
    pub stats: TileStats,
}

impl TileResult {
    pub fn new(descriptor: &TileDescriptor, stats: TileStats) -> Self {
        Self {
            tile_id: descriptor.tile_id,
            parent_id: descriptor.parent_id,
            lod_level: descriptor.lod_level,
            tile_uri: descriptor.tile_uri.clone(),
            screen_space_error: descriptor.screen_space_error,
            stats,
        }
    }
}

/// What processing one tile produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TileOutcome {
    Stats(TileResult),
    /// The mesh loaded but had no texture, UVs, or covered texels.
    NoStats { tile_id: u64, lod_level: u32 },
    /// The asset was missing, unreadable, or its worker panicked.
    LoadFailed {
        tile_id: u64,
        lod_level: u32,
        reason: String,
    },
}

impl TileOutcome {
    pub fn tile_id(&self) -> u64 {
        match self {
            TileOutcome::Stats(r) => r.tile_id,
            TileOutcome::NoStats { tile_id, .. } | TileOutcome::LoadFailed { tile_id, .. } => {
                *tile_id
            }
        }
    }

    pub fn lod_level(&self) -> u32 {
        match self {
            TileOutcome::Stats(r) => r.lod_level,
            TileOutcome::NoStats { lod_level, .. }
            | TileOutcome::LoadFailed { lod_level, .. } => *lod_level,
        }
    }

    /// The report row, if the tile produced statistics.
    pub fn into_result(self) -> Option<TileResult> {
        match self {
            TileOutcome::Stats(r) => Some(r),
            _ => None,
        }
    }
}

/// Per-LOD aggregate: counts are summed, continuous metrics averaged.
#[derive(Debug, Clone, PartialEq)]
pub struct LodSummary {
    pub lod_level: u32,
    pub tile_count: usize,
    pub total_polygons: u64,
    /// Mean over the tiles that declare an error; `None` if none do.
    pub screen_space_error: Option<f64>,
    pub avg_polygon_edge_length: f64,
    pub median_polygon_edge_length: f64,
    pub std_dev_polygon_edge_length: f64,
    pub avg_texel_size: f64,
    pub median_texel_size: f64,
    pub std_dev_texel_size: f64,
    pub texture_utilization: f64,
    pub texture_width: f64,
}
