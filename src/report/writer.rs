use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{InspectError, Result};
use crate::types::{LodSummary, TileResult};

use super::Report;

/// Blank rows between the summary block and the raw block.
pub const BLANK_ROWS: usize = 3;

pub const SUMMARY_HEADER: [&str; 12] = [
    "lod_level",
    "tile_count",
    "screen_space_error",
    "avg_texel_size",
    "median_texel_size",
    "std_dev_texel_size",
    "texture_utilization",
    "texture_width",
    "avg_polygon_edge_length",
    "median_polygon_edge_length",
    "std_dev_polygon_edge_length",
    "total_polygons",
];

pub const RAW_HEADER: [&str; 14] = [
    "lod_level",
    "tile_id",
    "parent_id",
    "tile_uri",
    "screen_space_error",
    "avg_texel_size",
    "median_texel_size",
    "std_dev_texel_size",
    "texture_utilization",
    "texture_width",
    "avg_polygon_edge_length",
    "median_polygon_edge_length",
    "std_dev_polygon_edge_length",
    "total_polygons",
];

/// Write the report as CSV: summary block, blank rows, raw block.
///
/// Floats are rendered with 4 decimals, integers and strings verbatim,
/// missing values as empty cells.
pub fn write_report<W: Write>(report: &Report, mut out: W) -> Result<()> {
    write_row(&mut out, SUMMARY_HEADER.iter().map(|s| s.to_string()))?;
    for row in &report.summary {
        write_row(&mut out, summary_cells(row))?;
    }

    for _ in 0..BLANK_ROWS {
        writeln!(out)?;
    }

    write_row(&mut out, RAW_HEADER.iter().map(|s| s.to_string()))?;
    for row in &report.raw {
        write_row(&mut out, raw_cells(row))?;
    }

    out.flush()?;
    Ok(())
}

/// Write the report to `path`, replacing any existing file.
pub fn write_report_file(report: &Report, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        InspectError::Output(format!("Failed to create {}: {e}", path.display()))
    })?;
    write_report(report, BufWriter::new(file))?;

    info!(
        path = %path.display(),
        lod_levels = report.summary.len(),
        tiles = report.raw.len(),
        "Wrote report"
    );
    Ok(())
}

fn summary_cells(s: &LodSummary) -> Vec<String> {
    vec![
        s.lod_level.to_string(),
        s.tile_count.to_string(),
        opt_float(s.screen_space_error),
        float(s.avg_texel_size),
        float(s.median_texel_size),
        float(s.std_dev_texel_size),
        float(s.texture_utilization),
        float(s.texture_width),
        float(s.avg_polygon_edge_length),
        float(s.median_polygon_edge_length),
        float(s.std_dev_polygon_edge_length),
        s.total_polygons.to_string(),
    ]
}

fn raw_cells(r: &TileResult) -> Vec<String> {
    vec![
        r.lod_level.to_string(),
        r.tile_id.to_string(),
        r.parent_id.map(|p| p.to_string()).unwrap_or_default(),
        r.tile_uri.clone(),
        opt_float(r.screen_space_error),
        float(r.stats.avg_texel_size),
        float(r.stats.median_texel_size),
        float(r.stats.std_dev_texel_size),
        float(r.stats.texture_utilization),
        r.stats.texture_width.to_string(),
        float(r.stats.avg_polygon_edge_length),
        float(r.stats.median_polygon_edge_length),
        float(r.stats.std_dev_polygon_edge_length),
        r.stats.total_polygons.to_string(),
    ]
}

fn float(v: f64) -> String {
    format!("{v:.4}")
}

fn opt_float(v: Option<f64>) -> String {
    v.map(float).unwrap_or_default()
}

fn write_row<W: Write>(out: &mut W, cells: impl IntoIterator<Item = String>) -> Result<()> {
    let line = cells
        .into_iter()
        .map(|c| escape(&c))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{line}")?;
    Ok(())
}

/// Quote a cell if it contains a separator, quote, or line break.
fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::aggregate;
    use crate::types::TileStats;

    fn result(tile_id: u64, lod_level: u32, uri: &str) -> TileResult {
        TileResult {
            tile_id,
            parent_id: if tile_id == 1 { None } else { Some(1) },
            lod_level,
            tile_uri: uri.into(),
            screen_space_error: Some(16.0),
            stats: TileStats {
                avg_polygon_edge_length: 0.123456,
                median_polygon_edge_length: 0.1,
                std_dev_polygon_edge_length: 0.0,
                total_polygons: 42,
                avg_texel_size: 0.00049,
                median_texel_size: 0.0005,
                std_dev_texel_size: 0.00001,
                texture_utilization: 2.0 / 3.0,
                texture_width: 2048,
            },
        }
    }

    fn render(report: &Report) -> String {
        let mut buf = Vec::new();
        write_report(report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn layout_has_two_blocks() {
        let report = aggregate(vec![result(1, 0, "root.glb"), result(2, 1, "a.glb")]);
        let text = render(&report);
        let lines: Vec<&str> = text.lines().collect();

        // header + 2 summary rows + 3 blank + header + 2 raw rows
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], SUMMARY_HEADER.join(","));
        assert!(lines[3..6].iter().all(|l| l.is_empty()));
        assert_eq!(lines[6], RAW_HEADER.join(","));
        assert!(lines[7].starts_with("0,1,,root.glb,16.0000,"));
        assert!(lines[8].starts_with("1,2,1,a.glb,"));
    }

    #[test]
    fn floats_rendered_with_four_decimals() {
        let report = aggregate(vec![result(1, 0, "root.glb")]);
        let text = render(&report);
        let summary: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(
            summary,
            vec![
                "0", "1", "16.0000", "0.0005", "0.0005", "0.0000", "0.6667", "2048.0000",
                "0.1235", "0.1000", "0.0000", "42"
            ]
        );

        let raw: Vec<&str> = text.lines().last().unwrap().split(',').collect();
        assert_eq!(raw[9], "2048");
        assert_eq!(raw[13], "42");
    }

    #[test]
    fn empty_report_keeps_headers() {
        let text = render(&Report::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], SUMMARY_HEADER.join(","));
        assert_eq!(lines[4], RAW_HEADER.join(","));
    }

    #[test]
    fn cells_with_separators_are_quoted() {
        assert_eq!(escape("plain.glb"), "plain.glb");
        assert_eq!(escape("a,b.glb"), "\"a,b.glb\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn write_to_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.csv");
        let report = aggregate(vec![result(1, 0, "root.glb")]);
        write_report_file(&report, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("root.glb"));
    }

    #[test]
    fn write_to_missing_dir_fails() {
        let report = Report::default();
        let err = write_report_file(&report, Path::new("/nonexistent/dir/report.csv")).unwrap_err();
        assert!(matches!(err, InspectError::Output(_)));
    }
}
