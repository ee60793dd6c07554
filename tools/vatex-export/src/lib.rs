//! vatex-export library
//!
//! glTF/OBJ implementations of the vatex-core rig and mesh capabilities, a GLB
//! mesh writer, and the file-level jobs behind the `vatex-export` command.

pub mod export;
pub mod glb;
pub mod manifest;
pub mod mesh;
pub mod rig;

pub use export::{
    OutputPrompt, RigSummary, export_animation, export_mesh, export_uv, inspect_rig,
    list_clips, log_diagnostics,
};
pub use glb::{GlbMeshWriter, encode_mesh_glb};
pub use manifest::{BuildSummary, Manifest, build_all, load_manifest};
pub use mesh::load_mesh;
pub use rig::{GltfInstance, GltfRig};
