//! Static mesh loaders (glTF/GLB/OBJ -> MeshData)

mod gltf_mesh;
mod obj;

pub use gltf_mesh::{load_gltf_mesh, read_first_mesh};
pub use obj::{load_obj_mesh, parse_obj};

use anyhow::{Result, bail};
use std::path::Path;
use vatex_core::MeshData;

/// Load a mesh, choosing the loader by file extension
pub fn load_mesh(input: &Path) -> Result<MeshData> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "obj" => load_obj_mesh(input),
        "gltf" | "glb" => load_gltf_mesh(input),
        _ => bail!(
            "Unsupported mesh format: {:?} (use .obj, .gltf, or .glb)",
            input
        ),
    }
}
