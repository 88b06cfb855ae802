use glam::DVec2;

use crate::config::RasterConfig;
use crate::types::{AbstractMesh, Face, TextureSize};

/// UV triangles with less than this much (doubled) area cover nothing.
const MIN_UV_AREA: f64 = 1e-12;

/// Texel-size samples and texture utilization for one mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterEstimate {
    /// One entry per face that covered at least one new grid cell.
    pub texel_sizes: Vec<f64>,
    /// Occupied cells / total cells, in [0, 1].
    pub utilization: f64,
}

/// Square occupancy grid over UV space `[0, 1] x [0, 1]`, one bit per cell.
struct OccupancyGrid {
    resolution: usize,
    bits: Vec<u64>,
    occupied: usize,
}

impl OccupancyGrid {
    fn new(resolution: usize) -> Self {
        Self {
            resolution,
            bits: vec![0; (resolution * resolution).div_ceil(64)],
            occupied: 0,
        }
    }

    fn total(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Mark a cell; returns true only the first time it is marked.
    fn mark(&mut self, u: usize, v: usize) -> bool {
        let cell = v * self.resolution + u;
        let (word, mask) = (cell / 64, 1u64 << (cell % 64));
        if self.bits[word] & mask != 0 {
            return false;
        }
        self.bits[word] |= mask;
        self.occupied += 1;
        true
    }

    fn utilization(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.occupied as f64 / total as f64
        }
    }

    /// Normalized UV of a cell center.
    fn center(&self, u: usize, v: usize) -> DVec2 {
        let res = self.resolution as f64;
        DVec2::new((u as f64 + 0.5) / res, (v as f64 + 0.5) / res)
    }

    /// Inclusive range of cells whose centers lie within `[min, max]` on one axis.
    fn cell_range(&self, min: f64, max: f64) -> Option<(usize, usize)> {
        let res = self.resolution as f64;
        let lo = (min * res - 0.5).ceil().max(0.0);
        let hi = (max * res - 0.5).floor().min(res - 1.0);
        if lo <= hi {
            Some((lo as usize, hi as usize))
        } else {
            None
        }
    }
}

/// Estimate per-face texel size and overall texture utilization.
///
/// Each face's UV footprint is tested as the triangle formed by its first
/// three corners. Cells are shared across faces: a cell already claimed by an
/// earlier face does not count toward a later face's coverage.
pub fn estimate(mesh: &AbstractMesh, texture: TextureSize, config: &RasterConfig) -> RasterEstimate {
    let resolution = config.grid_resolution(texture.width, texture.height);
    if resolution == 0 {
        return RasterEstimate::default();
    }

    let mut grid = OccupancyGrid::new(resolution);
    let cell_w = texture.width as f64 / resolution as f64;
    let cell_h = texture.height as f64 / resolution as f64;
    let mut texel_sizes = Vec::new();

    for face in &mesh.faces {
        let Some(uv) = uv_triangle(face) else {
            continue;
        };

        let covered = rasterize_face(&mut grid, &uv);
        if covered > 0 {
            let area = mesh.face_area(face);
            texel_sizes.push((area / (covered as f64 * cell_w * cell_h)).sqrt());
        }
    }

    RasterEstimate {
        texel_sizes,
        utilization: grid.utilization(),
    }
}

/// First three UVs of a face, or `None` for malformed or zero-area footprints.
fn uv_triangle(face: &Face) -> Option<[DVec2; 3]> {
    if !face.is_valid() {
        return None;
    }
    let tri = [face.loops[0].uv, face.loops[1].uv, face.loops[2].uv];
    let doubled_area = (tri[1] - tri[0]).perp_dot(tri[2] - tri[0]);
    if doubled_area.abs() < MIN_UV_AREA || !doubled_area.is_finite() {
        return None;
    }
    Some(tri)
}

/// Claim every free cell whose center lies inside the triangle.
/// Returns the number of newly claimed cells.
fn rasterize_face(grid: &mut OccupancyGrid, tri: &[DVec2; 3]) -> usize {
    let min = tri[0].min(tri[1]).min(tri[2]);
    let max = tri[0].max(tri[1]).max(tri[2]);

    let (Some((u0, u1)), Some((v0, v1))) =
        (grid.cell_range(min.x, max.x), grid.cell_range(min.y, max.y))
    else {
        return 0;
    };

    let mut covered = 0;
    for v in v0..=v1 {
        for u in u0..=u1 {
            if point_in_triangle(grid.center(u, v), tri) && grid.mark(u, v) {
                covered += 1;
            }
        }
    }
    covered
}

/// Sign-of-cross-product test; points on an edge count as inside.
pub fn point_in_triangle(p: DVec2, tri: &[DVec2; 3]) -> bool {
    fn sign(p1: DVec2, p2: DVec2, p3: DVec2) -> f64 {
        (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
    }

    let d1 = sign(p, tri[0], tri[1]);
    let d2 = sign(p, tri[1], tri[2]);
    let d3 = sign(p, tri[2], tri[0]);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::DVec3;

    use super::*;
    use crate::types::FaceLoop;

    fn tex(width: u32, height: u32) -> TextureSize {
        TextureSize { width, height }
    }

    fn triangle_mesh(positions: [DVec3; 3], uvs: [DVec2; 3]) -> AbstractMesh {
        AbstractMesh::from_triangles(positions.to_vec(), &uvs, &[0, 1, 2], Some(tex(64, 64)))
    }

    #[test]
    fn point_in_triangle_basic() {
        let tri = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
        ];
        assert!(point_in_triangle(DVec2::new(0.2, 0.2), &tri));
        assert!(point_in_triangle(DVec2::new(0.5, 0.5), &tri)); // on hypotenuse
        assert!(!point_in_triangle(DVec2::new(0.8, 0.8), &tri));

        let reversed = [tri[2], tri[1], tri[0]];
        assert!(point_in_triangle(DVec2::new(0.2, 0.2), &reversed));
    }

    #[test]
    fn oversized_triangle_covers_whole_texture() {
        let mesh = triangle_mesh(
            [
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(2.0, 0.0, 0.0),
                DVec3::new(0.0, 2.0, 0.0),
            ],
            [
                DVec2::new(0.0, 0.0),
                DVec2::new(2.0, 0.0),
                DVec2::new(0.0, 2.0),
            ],
        );

        let est = estimate(&mesh, tex(64, 64), &RasterConfig::default());
        assert_relative_eq!(est.utilization, 1.0);
        assert_eq!(est.texel_sizes.len(), 1);
    }

    #[test]
    fn half_square_triangle_covers_about_half() {
        let mesh = triangle_mesh(
            [
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            [
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(0.0, 1.0),
            ],
        );

        let est = estimate(&mesh, tex(256, 256), &RasterConfig::default());
        // 128x128 grid: centers with u + v <= 1, hypotenuse included.
        let res = 128.0;
        let expected = (res * (res + 1.0) / 2.0) / (res * res);
        assert_relative_eq!(est.utilization, expected, epsilon = 1e-12);
    }

    #[test]
    fn texel_size_matches_surface_density() {
        // 2 x 2 m quad mapped onto a full 64 px texture: 2/64 m per texel.
        let mesh = AbstractMesh::from_triangles(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(2.0, 0.0, 0.0),
                DVec3::new(2.0, 2.0, 0.0),
                DVec3::new(0.0, 2.0, 0.0),
            ],
            &[
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
            ],
            &[0, 1, 2, 0, 2, 3],
            Some(tex(64, 64)),
        );

        let est = estimate(&mesh, tex(64, 64), &RasterConfig { grid_fraction: 1.0 });
        assert_relative_eq!(est.utilization, 1.0);
        let total_area: f64 = 4.0;
        let covered_texels = 64.0 * 64.0;
        let expected = (total_area / covered_texels).sqrt();
        let mean = est.texel_sizes.iter().sum::<f64>() / est.texel_sizes.len() as f64;
        assert_relative_eq!(mean, expected, max_relative = 0.05);
    }

    #[test]
    fn degenerate_uv_face_contributes_nothing() {
        let positions = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ];

        let collapsed = triangle_mesh(positions, [DVec2::splat(0.5078125); 3]);
        let est = estimate(&collapsed, tex(64, 64), &RasterConfig::default());
        assert!(est.texel_sizes.is_empty());
        assert_eq!(est.utilization, 0.0);

        let collinear = triangle_mesh(
            positions,
            [
                DVec2::new(0.0, 0.0),
                DVec2::new(0.5, 0.5),
                DVec2::new(1.0, 1.0),
            ],
        );
        let est = estimate(&collinear, tex(64, 64), &RasterConfig::default());
        assert!(est.texel_sizes.is_empty());
        assert_eq!(est.utilization, 0.0);
    }

    #[test]
    fn face_outside_unit_square_contributes_nothing() {
        let mesh = triangle_mesh(
            [
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            [
                DVec2::new(1.5, 1.5),
                DVec2::new(2.5, 1.5),
                DVec2::new(1.5, 2.5),
            ],
        );
        let est = estimate(&mesh, tex(64, 64), &RasterConfig::default());
        assert!(est.texel_sizes.is_empty());
        assert_eq!(est.utilization, 0.0);
    }

    #[test]
    fn overlapping_faces_count_cells_once() {
        let uvs = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
        ];
        let mesh = AbstractMesh::from_triangles(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            &uvs,
            &[0, 1, 2, 0, 1, 2],
            Some(tex(64, 64)),
        );

        let single = triangle_mesh(
            [
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            uvs,
        );

        let doubled = estimate(&mesh, tex(64, 64), &RasterConfig::default());
        let once = estimate(&single, tex(64, 64), &RasterConfig::default());
        assert_eq!(doubled.utilization, once.utilization);
        // The second face finds every cell already claimed.
        assert_eq!(doubled.texel_sizes.len(), 1);
    }

    #[test]
    fn tiny_texture_yields_empty_grid() {
        let mesh = triangle_mesh(
            [DVec3::ZERO, DVec3::X, DVec3::Y],
            [DVec2::ZERO, DVec2::X, DVec2::Y],
        );
        let est = estimate(&mesh, tex(1, 1), &RasterConfig::default());
        assert!(est.texel_sizes.is_empty());
        assert_eq!(est.utilization, 0.0);
    }

    #[test]
    fn grid_fraction_changes_resolution_not_meaning() {
        let mesh = triangle_mesh(
            [DVec3::ZERO, DVec3::X * 2.0, DVec3::Y * 2.0],
            [DVec2::ZERO, DVec2::X * 2.0, DVec2::Y * 2.0],
        );
        let coarse = estimate(&mesh, tex(128, 128), &RasterConfig { grid_fraction: 0.25 });
        let fine = estimate(&mesh, tex(128, 128), &RasterConfig { grid_fraction: 1.0 });
        assert_relative_eq!(coarse.utilization, 1.0);
        assert_relative_eq!(fine.utilization, 1.0);
        assert_relative_eq!(coarse.texel_sizes[0], fine.texel_sizes[0], max_relative = 1e-9);
    }

    #[test]
    fn quad_face_rasterizes_first_three_corners() {
        // UVs span the unit square, but only (0,0) (1,0) (1,1) is tested.
        let uvs = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ];
        let mesh = AbstractMesh {
            positions: vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            faces: vec![Face {
                loops: uvs
                    .iter()
                    .enumerate()
                    .map(|(i, &uv)| FaceLoop {
                        vertex: i as u32,
                        uv,
                    })
                    .collect(),
            }],
            has_uvs: true,
            texture: Some(tex(64, 64)),
        };

        let est = estimate(&mesh, tex(64, 64), &RasterConfig::default());
        // 32x32 grid, lower-right half with the diagonal included.
        let res = 32.0;
        let expected = (res * (res + 1.0) / 2.0) / (res * res);
        assert_relative_eq!(est.utilization, expected, epsilon = 1e-12);
        assert_eq!(est.texel_sizes.len(), 1);

        // The full quad area is spread over the triangle's cells.
        let covered = expected * res * res;
        let expected_texel = (1.0 / (covered * 2.0 * 2.0)).sqrt();
        assert_relative_eq!(est.texel_sizes[0], expected_texel, max_relative = 1e-12);
    }

    #[test]
    fn grid_marks_each_cell_once() {
        let mut grid = OccupancyGrid::new(10);
        assert_eq!(grid.bits.len(), 2);
        assert!(grid.mark(9, 9));
        assert!(!grid.mark(9, 9));
        assert!(grid.mark(3, 6));
        assert_relative_eq!(grid.utilization(), 0.02);
    }

    #[test]
    fn huge_texture_uses_capped_grid() {
        let mesh = triangle_mesh(
            [DVec3::ZERO, DVec3::X, DVec3::Y],
            [DVec2::ZERO, DVec2::X * 0.001, DVec2::Y * 0.001],
        );
        let est = estimate(&mesh, tex(u32::MAX, u32::MAX), &RasterConfig::default());
        assert_eq!(est.texel_sizes.len(), 1);
        assert!(est.utilization > 0.0);
        assert!(est.utilization < 1e-5);
    }
}
