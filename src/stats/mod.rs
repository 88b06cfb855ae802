pub mod rasterizer;

use tracing::debug;

use crate::config::RasterConfig;
use crate::types::{AbstractMesh, TileStats};

/// Mean, median and population standard deviation of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// Summarize a sample. Returns `None` for an empty sample.
pub fn describe(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    };

    Some(Summary {
        mean,
        median,
        std_dev: variance.sqrt(),
    })
}

/// Lengths of every unique edge of every well-formed face.
///
/// Edges are identified by their unordered vertex-index pair, so an edge
/// shared by two faces is counted once.
pub fn edge_lengths(mesh: &AbstractMesh) -> Vec<f64> {
    let mut edges: Vec<(u32, u32)> = Vec::new();
    for face in mesh.faces.iter().filter(|f| f.is_valid()) {
        let n = face.loops.len();
        for i in 0..n {
            let a = face.loops[i].vertex;
            let b = face.loops[(i + 1) % n].vertex;
            if a != b {
                edges.push((a.min(b), a.max(b)));
            }
        }
    }
    edges.sort_unstable();
    edges.dedup();

    edges
        .iter()
        .map(|&(a, b)| {
            let pa = mesh.positions.get(a as usize).copied().unwrap_or_default();
            let pb = mesh.positions.get(b as usize).copied().unwrap_or_default();
            pa.distance(pb)
        })
        .collect()
}

/// Compute tile statistics for a mesh.
///
/// Texture utilization is mandatory: a mesh without UVs, without a bound
/// texture, or whose faces claim no texel yields `None` even though its
/// edge and polygon statistics are well defined.
pub fn compute(mesh: &AbstractMesh, config: &RasterConfig) -> Option<TileStats> {
    if !mesh.has_uvs {
        debug!("Mesh has no UV set");
        return None;
    }
    let Some(texture) = mesh.texture else {
        debug!("Mesh has no bound texture");
        return None;
    };

    let raster = rasterizer::estimate(mesh, texture, config);
    let Some(texel) = describe(&raster.texel_sizes) else {
        debug!("No face covered the UV grid");
        return None;
    };

    let edges = describe(&edge_lengths(mesh))?;

    Some(TileStats {
        avg_polygon_edge_length: edges.mean,
        median_polygon_edge_length: edges.median,
        std_dev_polygon_edge_length: edges.std_dev,
        total_polygons: mesh.face_count() as u64,
        avg_texel_size: texel.mean,
        median_texel_size: texel.median,
        std_dev_texel_size: texel.std_dev,
        texture_utilization: raster.utilization,
        texture_width: texture.width,
    })
}
