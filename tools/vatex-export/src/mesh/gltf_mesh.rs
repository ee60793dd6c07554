//! glTF/GLB static mesh loading

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use std::path::Path;
use vatex_core::mesh::UV_CHANNEL_COUNT;
use vatex_core::{MeshData, UvChannel};

/// Load the first mesh of a glTF/GLB file
pub fn load_gltf_mesh(input: &Path) -> Result<MeshData> {
    let (document, buffers, _images) =
        gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;
    let fallback = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Mesh".to_string());
    read_first_mesh(&document, &buffers, &fallback)
}

/// Concatenate every primitive of the document's first mesh
///
/// Attributes missing from some primitives are zero-filled so every populated
/// channel stays aligned with the positions. Indices are rebased per
/// primitive; primitives without indices get sequential ones.
pub fn read_first_mesh(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    fallback_name: &str,
) -> Result<MeshData> {
    let mesh = document
        .meshes()
        .next()
        .context("No meshes found in glTF")?;
    let name = mesh.name().unwrap_or(fallback_name);

    let mut positions: Vec<Vec3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut has_normals = false;
    let mut uvs: [Vec<Vec2>; UV_CHANNEL_COUNT] = Default::default();
    let mut has_uv = [false; UV_CHANNEL_COUNT];

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let primitive_positions: Vec<Vec3> = reader
            .read_positions()
            .context("No positions in mesh")?
            .map(Vec3::from_array)
            .collect();
        let base = positions.len() as u32;
        let count = primitive_positions.len();

        match reader.read_indices() {
            Some(iter) => indices.extend(iter.into_u32().map(|i| i + base)),
            None => indices.extend(base..base + count as u32),
        }

        match reader.read_normals() {
            Some(iter) => {
                has_normals = true;
                normals.extend(iter.map(Vec3::from_array));
            }
            None => normals.extend(std::iter::repeat_n(Vec3::ZERO, count)),
        }

        for (set, channel) in uvs.iter_mut().enumerate() {
            match reader.read_tex_coords(set as u32) {
                Some(iter) => {
                    has_uv[set] = true;
                    channel.extend(iter.into_f32().map(Vec2::from_array));
                }
                None => channel.extend(std::iter::repeat_n(Vec2::ZERO, count)),
            }
        }

        positions.extend(primitive_positions);
    }

    let mut data = MeshData::new(name, positions, indices);
    if has_normals {
        data.normals = normals;
    }
    for channel in UvChannel::ALL {
        if has_uv[channel.index()] {
            data.uvs[channel.index()] = std::mem::take(&mut uvs[channel.index()]);
        }
    }

    tracing::info!(
        "Loaded mesh '{}': {} vertices, {} indices, {} UV set(s)",
        data.name,
        data.positions.len(),
        data.indices.len(),
        data.populated_channels().count()
    );
    Ok(data)
}
