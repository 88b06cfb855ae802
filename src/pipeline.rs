use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::InspectConfig;
use crate::error::Result;
use crate::ingestion::{GltfLoader, MeshLoader};
use crate::processing::{Scheduler, TileProcessor};
use crate::report;
use crate::traversal;
use crate::types::TileOutcome;

/// Summary of a completed inspection run.
#[derive(Debug)]
pub struct InspectionResult {
    pub tiles_discovered: usize,
    pub tiles_reported: usize,
    pub tiles_without_stats: usize,
    pub tiles_failed: usize,
    pub lod_levels: usize,
    pub duration: Duration,
}

/// Pipeline orchestrator -- drives the three inspection stages.
pub struct Pipeline;

impl Pipeline {
    /// Run the full pipeline with the glTF loader.
    pub fn run(config: &InspectConfig) -> Result<InspectionResult> {
        Self::run_with_loader(config, GltfLoader)
    }

    /// Run the full pipeline with a caller-supplied mesh loader.
    pub fn run_with_loader<L: MeshLoader>(
        config: &InspectConfig,
        loader: L,
    ) -> Result<InspectionResult> {
        let start = Instant::now();
        info!(tileset = %config.tileset.display(), "Starting inspection");

        info!("Stage 1/3: Traversal");
        let descriptors = traversal::traverse(&config.tileset)?;
        let tiles_discovered = descriptors.len();

        info!("Stage 2/3: Tile statistics");
        let scheduler = Scheduler::new(config.threads)?;
        info!(workers = scheduler.workers(), tiles = tiles_discovered, "Processing tiles");
        let processor = TileProcessor::new(loader, config.raster);
        let outcomes = scheduler.run(descriptors, |d| processor.process(d));

        let mut results = Vec::with_capacity(outcomes.len());
        let mut tiles_without_stats = 0;
        let mut tiles_failed = 0;
        for outcome in outcomes {
            match outcome {
                TileOutcome::Stats(r) => results.push(r),
                TileOutcome::NoStats { .. } => tiles_without_stats += 1,
                TileOutcome::LoadFailed { .. } => tiles_failed += 1,
            }
        }
        info!(
            reported = results.len(),
            no_stats = tiles_without_stats,
            failed = tiles_failed,
            "Tile statistics complete"
        );

        info!("Stage 3/3: Report");
        let report = report::aggregate(results);
        if report.raw.is_empty() {
            warn!("No tile produced statistics; writing an empty report");
        }
        report::write_report_file(&report, &config.output)?;

        let duration = start.elapsed();
        info!(elapsed = ?duration, "Inspection complete");

        Ok(InspectionResult {
            tiles_discovered,
            tiles_reported: report.raw.len(),
            tiles_without_stats,
            tiles_failed,
            lod_levels: report.summary.len(),
            duration,
        })
    }
}
