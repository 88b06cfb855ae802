use std::io::Cursor;
use std::path::Path;

use glam::{DVec2, DVec3};
use tracing::{debug, warn};

use crate::error::{InspectError, Result};
use crate::types::{AbstractMesh, Face, FaceLoop, TextureSize};

use super::MeshLoader;

/// Loads the first mesh of a glTF or GLB tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfLoader;

impl MeshLoader for GltfLoader {
    fn load(&self, path: &Path) -> Result<AbstractMesh> {
        load_gltf(path)
    }
}

/// Load the first mesh of a glTF/GLB file.
///
/// All triangle primitives of that mesh are merged; other meshes in the
/// file are ignored. The bound texture is the base-color texture of the
/// first primitive that has one, and only its pixel size is read.
pub fn load_gltf(path: &Path) -> Result<AbstractMesh> {
    let gltf::Gltf { document, blob } = gltf::Gltf::open(path)
        .map_err(|e| InspectError::Load(format!("Failed to load {}: {e}", path.display())))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let buffers = gltf::import_buffers(&document, Some(base_dir), blob).map_err(|e| {
        InspectError::Load(format!("Failed to load buffers of {}: {e}", path.display()))
    })?;

    let mesh = document
        .meshes()
        .next()
        .ok_or_else(|| InspectError::Load(format!("No mesh in {}", path.display())))?;

    debug!(
        meshes = document.meshes().len(),
        primitives = mesh.primitives().len(),
        "Loaded glTF document"
    );

    let mut out = AbstractMesh::default();
    let mut texture_image = None;

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            warn!(mode = ?primitive.mode(), "Skipping non-triangle primitive");
            continue;
        }
        append_primitive(&mut out, &primitive, &buffers)?;

        if texture_image.is_none() {
            texture_image = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_texture()
                .map(|info| info.texture().source());
        }
    }

    out.texture = match texture_image {
        Some(image) => match texture_size(&image, &buffers, base_dir, path) {
            Ok(size) => Some(size),
            Err(e) => {
                warn!(path = %path.display(), "Unreadable texture: {e}");
                None
            }
        },
        None => None,
    };

    Ok(out)
}

/// Append one primitive's triangles, offsetting its vertex indices.
fn append_primitive(
    out: &mut AbstractMesh,
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> Result<()> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<DVec3> = reader
        .read_positions()
        .ok_or_else(|| InspectError::Load("Primitive missing positions".into()))?
        .map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64))
        .collect();

    let uvs: Vec<DVec2> = reader
        .read_tex_coords(0)
        .map(|iter| {
            iter.into_f32()
                .map(|uv| DVec2::new(uv[0] as f64, uv[1] as f64))
                .collect()
        })
        .unwrap_or_default();

    // Non-indexed primitives draw vertices in order.
    let indices: Vec<u32> = match reader.read_indices() {
        Some(iter) => iter.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let offset = out.positions.len() as u32;
    out.has_uvs |= !uvs.is_empty();

    out.faces.extend(indices.chunks_exact(3).map(|tri| Face {
        loops: tri
            .iter()
            .map(|&i| FaceLoop {
                vertex: i + offset,
                uv: uvs.get(i as usize).copied().unwrap_or(DVec2::ZERO),
            })
            .collect(),
    }));
    out.positions.extend(positions);

    Ok(())
}

/// Pixel size of a glTF image without decoding its pixels where possible.
fn texture_size(
    image: &gltf::Image<'_>,
    buffers: &[gltf::buffer::Data],
    base_dir: &Path,
    asset_path: &Path,
) -> Result<TextureSize> {
    let (width, height) = match image.source() {
        gltf::image::Source::View { view, .. } => {
            let buffer = &buffers[view.buffer().index()];
            let start = view.offset();
            let bytes = buffer
                .get(start..start + view.length())
                .ok_or_else(|| InspectError::Load("Image view out of bounds".into()))?;
            header_dimensions(bytes)?
        }
        gltf::image::Source::Uri { uri, .. } if uri.starts_with("data:") => {
            // Embedded base64 image: let gltf decode it.
            let (_, _, images) = gltf::import(asset_path)
                .map_err(|e| InspectError::Load(format!("Failed to decode image: {e}")))?;
            let data = images
                .get(image.index())
                .ok_or_else(|| InspectError::Load("Missing decoded image".into()))?;
            (data.width, data.height)
        }
        gltf::image::Source::Uri { uri, .. } => image::image_dimensions(base_dir.join(uri))
            .map_err(|e| InspectError::Load(format!("Failed to read image {uri}: {e}")))?,
    };

    Ok(TextureSize { width, height })
}

/// Read image dimensions from an encoded header.
fn header_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| InspectError::Load(format!("Failed to read image header: {e}")))
}
