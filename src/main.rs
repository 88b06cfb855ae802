use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tile_inspector::config::{CliArgs, InspectConfig};
use tile_inspector::pipeline::Pipeline;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing
    let filter = if args.verbose {
        EnvFilter::new("tile_inspector=debug")
    } else {
        EnvFilter::new("tile_inspector=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config: InspectConfig = args.into();

    match Pipeline::run(&config) {
        Ok(result) => {
            println!(
                "Done: {} of {} tiles reported across {} LOD levels in {:.2}s ({} without stats, {} failed)",
                result.tiles_reported,
                result.tiles_discovered,
                result.lod_levels,
                result.duration.as_secs_f64(),
                result.tiles_without_stats,
                result.tiles_failed
            );
            println!("Report written to {}", config.output.display());
            Ok(())
        }
        Err(e) => {
            error!(%e, "Inspection failed");
            Err(anyhow::anyhow!(e)).context("tile-inspector run failed")
        }
    }
}
