use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{InspectError, Result};
use crate::types::GridCoords;

/// Directory, relative to the referencing document, holding implicit tiles.
pub const TILES_DIR: &str = "tiles";

/// A tile file found in the implicit grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTile {
    pub coords: GridCoords,
    /// Path relative to the document directory, `/`-separated.
    pub uri: String,
}

/// `tiles/{level}/{x}/{y}/{z}.{glb,gltf}` relative to the document directory.
fn grid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^tiles/([0-9]+)/([0-9]+)/([0-9]+)/([0-9]+)\.(?i:glb|gltf)$")
            .expect("grid pattern is valid")
    })
}

/// Scan `<base_dir>/tiles` for files laid out as `tiles/{level}/{x}/{y}/{z}.<ext>`.
///
/// Files that do not match the layout are skipped. Symbolic links to
/// directories are not followed. Results are in lexicographic path order so tile ids are stable
/// between runs.
pub fn scan_grid(base_dir: &Path) -> Result<Vec<GridTile>> {
    let tiles_dir = base_dir.join(TILES_DIR);
    if !tiles_dir.is_dir() {
        warn!(dir = %tiles_dir.display(), "Implicit tiling directory not found");
        return Ok(Vec::new());
    }

    let mut tiles = Vec::new();
    for entry in WalkDir::new(&tiles_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            InspectError::Tileset(format!("Failed to scan {}: {e}", tiles_dir.display()))
        })?;
        // Linked files count; linked directories are not descended.
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(base_dir) else {
            continue;
        };
        let uri = relative_uri(relative);
        match parse_grid_path(&uri) {
            Some(coords) => tiles.push(GridTile { coords, uri }),
            None => debug!(path = %uri, "Skipping non-grid file"),
        }
    }

    debug!(dir = %tiles_dir.display(), tiles = tiles.len(), "Scanned implicit grid");
    Ok(tiles)
}

/// Parse a `/`-separated `tiles/{level}/{x}/{y}/{z}.<asset-ext>` path into
/// grid coordinates. Indices that overflow `u32` are rejected.
pub fn parse_grid_path(relative: &str) -> Option<GridCoords> {
    let caps = grid_pattern().captures(relative)?;
    let index = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();

    Some(GridCoords {
        level: index(1)?,
        x: index(2)?,
        y: index(3)?,
        z: index(4)?,
    })
}

fn relative_uri(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
