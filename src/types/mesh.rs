use glam::{DVec2, DVec3};

/// Pixel dimensions of the texture bound to a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSize {
    pub width: u32,
    pub height: u32,
}

/// One corner of a face: a vertex reference plus the UV used at that corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceLoop {
    /// Index into `AbstractMesh::positions`.
    pub vertex: u32,
    pub uv: DVec2,
}

/// An ordered loop of corners. Fewer than 3 corners is malformed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face {
    pub loops: Vec<FaceLoop>,
}

impl Face {
    /// Whether the face has enough corners to describe a surface.
    pub fn is_valid(&self) -> bool {
        self.loops.len() >= 3
    }
}

/// Loader-agnostic mesh: shared positions, per-corner UVs, and the size of
/// the bound texture (if any).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbstractMesh {
    pub positions: Vec<DVec3>,
    pub faces: Vec<Face>,
    /// False when the source had no UV set; corner UVs are then all zero.
    pub has_uvs: bool,
    pub texture: Option<TextureSize>,
}

impl AbstractMesh {
    /// Build a triangle mesh from flat buffers.
    ///
    /// `uvs` holds one UV per vertex; corners missing a UV get `(0, 0)`.
    /// Trailing indices that do not form a full triangle are ignored.
    pub fn from_triangles(
        positions: Vec<DVec3>,
        uvs: &[DVec2],
        indices: &[u32],
        texture: Option<TextureSize>,
    ) -> Self {
        let faces = indices
            .chunks_exact(3)
            .map(|tri| Face {
                loops: tri
                    .iter()
                    .map(|&vertex| FaceLoop {
                        vertex,
                        uv: uvs.get(vertex as usize).copied().unwrap_or(DVec2::ZERO),
                    })
                    .collect(),
            })
            .collect();

        Self {
            positions,
            faces,
            has_uvs: !uvs.is_empty(),
            texture,
        }
    }

    /// Number of faces (polygons), malformed ones included.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Position of a face corner. Out-of-range vertex indices map to the origin.
    pub fn position(&self, corner: &FaceLoop) -> DVec3 {
        self.positions
            .get(corner.vertex as usize)
            .copied()
            .unwrap_or(DVec3::ZERO)
    }

    /// Surface area of a face in mesh units, via a fan around its first corner.
    ///
    /// Malformed faces have zero area.
    pub fn face_area(&self, face: &Face) -> f64 {
        if !face.is_valid() {
            return 0.0;
        }
        let origin = self.position(&face.loops[0]);
        let mut normal = DVec3::ZERO;
        for pair in face.loops[1..].windows(2) {
            let a = self.position(&pair[0]) - origin;
            let b = self.position(&pair[1]) - origin;
            normal += a.cross(b);
        }
        normal.length() * 0.5
    }

    /// Whether the mesh contains no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}
