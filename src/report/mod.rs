//! LOD-grouped aggregation of tile results and the report artifact.

pub mod writer;

use std::collections::BTreeMap;

use crate::types::{LodSummary, TileResult};

pub use writer::{write_report, write_report_file};

/// Aggregated report: one summary row per LOD plus the raw tile rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub summary: Vec<LodSummary>,
    /// Tile rows ordered by `(lod_level, tile_id)`.
    pub raw: Vec<TileResult>,
}

/// Group results by LOD and summarize each group.
///
/// Counts (`tile_count`, `total_polygons`) are summed; every other metric is
/// the arithmetic mean over the group. Groups come out in ascending LOD
/// order. An empty input yields an empty report.
pub fn aggregate(mut results: Vec<TileResult>) -> Report {
    results.sort_by_key(|r| (r.lod_level, r.tile_id));

    let mut groups: BTreeMap<u32, Vec<&TileResult>> = BTreeMap::new();
    for r in &results {
        groups.entry(r.lod_level).or_default().push(r);
    }

    let summary = groups
        .into_iter()
        .map(|(lod_level, group)| summarize(lod_level, &group))
        .collect();

    Report {
        summary,
        raw: results,
    }
}

fn summarize(lod_level: u32, group: &[&TileResult]) -> LodSummary {
    let mean = |f: fn(&TileResult) -> f64| -> f64 {
        group.iter().map(|r| f(r)).sum::<f64>() / group.len() as f64
    };

    let errors: Vec<f64> = group.iter().filter_map(|r| r.screen_space_error).collect();
    let screen_space_error = if errors.is_empty() {
        None
    } else {
        Some(errors.iter().sum::<f64>() / errors.len() as f64)
    };

    LodSummary {
        lod_level,
        tile_count: group.len(),
        total_polygons: group.iter().map(|r| r.stats.total_polygons).sum(),
        screen_space_error,
        avg_polygon_edge_length: mean(|r| r.stats.avg_polygon_edge_length),
        median_polygon_edge_length: mean(|r| r.stats.median_polygon_edge_length),
        std_dev_polygon_edge_length: mean(|r| r.stats.std_dev_polygon_edge_length),
        avg_texel_size: mean(|r| r.stats.avg_texel_size),
        median_texel_size: mean(|r| r.stats.median_texel_size),
        std_dev_texel_size: mean(|r| r.stats.std_dev_texel_size),
        texture_utilization: mean(|r| r.stats.texture_utilization),
        texture_width: mean(|r| r.stats.texture_width as f64),
    }
}
