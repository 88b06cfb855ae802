use tracing::debug;

use crate::config::RasterConfig;
use crate::ingestion::MeshLoader;
use crate::stats;
use crate::types::{TileDescriptor, TileOutcome, TileResult};

/// Loads one tile asset and turns it into a report row.
pub struct TileProcessor<L> {
    loader: L,
    raster: RasterConfig,
}

impl<L: MeshLoader> TileProcessor<L> {
    pub fn new(loader: L, raster: RasterConfig) -> Self {
        Self { loader, raster }
    }

    /// Process one tile. Never fails: problems become non-`Stats` outcomes.
    pub fn process(&self, descriptor: &TileDescriptor) -> TileOutcome {
        let path = &descriptor.asset_path;
        if !path.is_file() {
            debug!(tile = descriptor.tile_id, path = %path.display(), "Asset not found");
            return TileOutcome::LoadFailed {
                tile_id: descriptor.tile_id,
                lod_level: descriptor.lod_level,
                reason: format!("Asset not found: {}", path.display()),
            };
        }

        let mesh = match self.loader.load(path) {
            Ok(mesh) => mesh,
            Err(e) => {
                debug!(tile = descriptor.tile_id, "Failed to load asset: {e}");
                return TileOutcome::LoadFailed {
                    tile_id: descriptor.tile_id,
                    lod_level: descriptor.lod_level,
                    reason: e.to_string(),
                };
            }
        };

        match stats::compute(&mesh, &self.raster) {
            Some(stats) => TileOutcome::Stats(TileResult::new(descriptor, stats)),
            None => TileOutcome::NoStats {
                tile_id: descriptor.tile_id,
                lod_level: descriptor.lod_level,
            },
        }
    }
}
