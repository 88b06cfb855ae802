use std::path::PathBuf;

use clap::Parser;

/// Default share of the larger texture dimension used as the UV grid side.
pub const DEFAULT_GRID_FRACTION: f64 = 0.5;

/// Upper bound on the UV grid side, whatever the texture header claims.
pub const MAX_GRID_RESOLUTION: usize = 8192;

/// UV rasterization parameters.
///
/// The occupancy grid is square with side `max(width, height) * grid_fraction`
/// cells. Smaller fractions run faster and sample more coarsely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterConfig {
    pub grid_fraction: f64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            grid_fraction: DEFAULT_GRID_FRACTION,
        }
    }
}

impl RasterConfig {
    /// Side length of the occupancy grid for a texture of the given size,
    /// capped at [`MAX_GRID_RESOLUTION`].
    pub fn grid_resolution(&self, width: u32, height: u32) -> usize {
        ((width.max(height) as f64 * self.grid_fraction) as usize).min(MAX_GRID_RESOLUTION)
    }
}

/// Fully resolved inspection configuration (constructed from CLI args).
#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub tileset: PathBuf,
    pub output: PathBuf,
    pub raster: RasterConfig,
    pub verbose: bool,
    pub threads: Option<usize>,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            tileset: PathBuf::new(),
            output: PathBuf::new(),
            raster: RasterConfig::default(),
            verbose: false,
            threads: None,
        }
    }
}

fn parse_grid_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!("grid fraction must be in (0, 1], got {value}"))
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "tile-inspector",
    about = "Per-tile mesh and texture statistics for OGC 3D Tiles tilesets",
    version
)]
pub struct CliArgs {
    /// Path to the root tileset.json
    pub tileset: PathBuf,

    /// Output report path (CSV)
    pub output: PathBuf,

    /// Fraction of the larger texture dimension used as UV grid resolution
    #[arg(long, default_value_t = DEFAULT_GRID_FRACTION, value_parser = parse_grid_fraction)]
    pub grid_fraction: f64,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for InspectConfig {
    fn from(args: CliArgs) -> Self {
        InspectConfig {
            tileset: args.tileset,
            output: args.output,
            raster: RasterConfig {
                grid_fraction: args.grid_fraction,
            },
            verbose: args.verbose,
            threads: args.threads,
        }
    }
}
