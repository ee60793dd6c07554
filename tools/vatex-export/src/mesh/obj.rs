//! OBJ static mesh loading

use anyhow::{Context, Result, bail};
use glam::{Vec2, Vec3};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use vatex_core::{MeshData, UvChannel};

/// Load an OBJ file, named after its stem
pub fn load_obj_mesh(input: &Path) -> Result<MeshData> {
    let file = File::open(input).with_context(|| format!("Failed to open OBJ: {:?}", input))?;
    let name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Mesh".to_string());
    let mesh = parse_obj(BufReader::new(file), &name)
        .with_context(|| format!("Failed to parse OBJ: {:?}", input))?;
    tracing::info!(
        "Loaded OBJ mesh '{}': {} vertices, {} indices",
        mesh.name,
        mesh.positions.len(),
        mesh.indices.len()
    );
    Ok(mesh)
}

/// Parse OBJ text with one output vertex per face corner
///
/// Polygons are fan-triangulated. Texture coordinates land in UV0 and normals
/// are kept only when every corner references one.
pub fn parse_obj<R: BufRead>(reader: R, name: &str) -> Result<MeshData> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut tex_coords: Vec<Vec2> = Vec::new();
    let mut normals_raw: Vec<Vec3> = Vec::new();

    let mut final_positions: Vec<Vec3> = Vec::new();
    let mut final_uvs: Vec<Vec2> = Vec::new();
    let mut final_normals: Vec<Vec3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "v" if parts.len() >= 4 => positions.push(parse_vec3(&parts[1..4])),
            "vt" if parts.len() >= 3 => {
                let u: f32 = parts[1].parse().unwrap_or(0.0);
                let v: f32 = parts[2].parse().unwrap_or(0.0);
                tex_coords.push(Vec2::new(u, v));
            }
            "vn" if parts.len() >= 4 => normals_raw.push(parse_vec3(&parts[1..4])),
            "f" if parts.len() >= 4 => {
                let corners: Vec<Corner> = parts[1..]
                    .iter()
                    .filter_map(|v| {
                        Corner::parse(v, positions.len(), tex_coords.len(), normals_raw.len())
                    })
                    .collect();
                if corners.len() < 3 {
                    continue;
                }

                for i in 1..corners.len() - 1 {
                    for corner in [corners[0], corners[i], corners[i + 1]] {
                        indices.push(final_positions.len() as u32);
                        final_positions.push(positions.get(corner.position).copied().unwrap_or(Vec3::ZERO));
                        if let Some(ti) = corner.tex_coord {
                            final_uvs.push(tex_coords.get(ti).copied().unwrap_or(Vec2::ZERO));
                        }
                        if let Some(ni) = corner.normal {
                            final_normals.push(normals_raw.get(ni).copied().unwrap_or(Vec3::Y));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if final_positions.is_empty() {
        bail!("No faces found in OBJ data");
    }

    let count = final_positions.len();
    let mut mesh = MeshData::new(name, final_positions, indices);
    if final_uvs.len() == count {
        mesh = mesh.with_uv(UvChannel::Uv0, final_uvs);
    }
    if final_normals.len() == count {
        mesh = mesh.with_normals(final_normals);
    }
    Ok(mesh)
}

fn parse_vec3(parts: &[&str]) -> Vec3 {
    let component = |s: &str| s.parse::<f32>().unwrap_or(0.0);
    Vec3::new(component(parts[0]), component(parts[1]), component(parts[2]))
}

/// Face corner reference: `v`, `v/vt`, `v/vt/vn` or `v//vn`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Corner {
    position: usize,
    tex_coord: Option<usize>,
    normal: Option<usize>,
}

impl Corner {
    /// Parse one reference against the element counts read so far
    fn parse(
        s: &str,
        position_count: usize,
        tex_coord_count: usize,
        normal_count: usize,
    ) -> Option<Self> {
        let mut parts = s.split('/');
        let position = resolve_index(parts.next()?, position_count)?;
        let tex_coord = parts
            .next()
            .filter(|s| !s.is_empty())
            .and_then(|s| resolve_index(s, tex_coord_count));
        let normal = parts
            .next()
            .filter(|s| !s.is_empty())
            .and_then(|s| resolve_index(s, normal_count));
        Some(Self {
            position,
            tex_coord,
            normal,
        })
    }
}

/// OBJ indices are 1-based; negative ones count back from the latest vertex
fn resolve_index(s: &str, count: usize) -> Option<usize> {
    let index: i64 = s.parse().ok()?;
    if index > 0 {
        Some(index as usize - 1)
    } else if index < 0 {
        count.checked_sub(index.unsigned_abs() as usize)
    } else {
        None
    }
}
