//! vatex core
//!
//! Bakes skinned-animation and static-mesh vertex positions into textures for
//! vertex-shader playback, and stamps per-vertex indices onto UV channels.
//!
//! The crate knows nothing about asset formats. Rigs, meshes, save prompts and
//! writers are capability traits implemented by the host (see the
//! `vatex-export` tool for the glTF implementation).

pub mod bake;
pub mod config;
pub mod diagnostics;
pub mod encode;
pub mod error;
pub mod fixture;
pub mod formats;
pub mod layout;
pub mod mesh;
pub mod output;
pub mod prompt;
pub mod rig;
pub mod sampler;
pub mod texture;
pub mod uv;

pub use bake::{
    AnimationBake, AnimationPlan, BakeReport, BakeStatus, BakeTask, MeshBakeReport, PlanSize,
    Progress, bake_animation, bake_mesh, refresh_animation_diagnostics, refresh_mesh_diagnostics,
    refresh_uv_diagnostics, run_to_completion, start_animation_bake,
};
pub use config::{AnimationBakeConfig, BakeMode, ClipSelector, MeshBakeConfig, UvStampConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Domain, Ledger, Severity};
pub use encode::{ColorEncoding, PixelEncoder};
pub use error::{BakeError, BakeResult};
pub use layout::{TexelOrder, TextureLayout, plan_layout};
pub use mesh::{MeshData, MeshSource, UvChannel};
pub use output::{FileTextureWriter, MeshWriter, TextureWriter};
pub use prompt::{FixedPrompt, SavePrompt, SaveRequest};
pub use rig::{AnimationEvaluator, ClipInfo, Rig, RigComponents};
pub use texture::{Pixel, TextureArray, TextureBuffer};
pub use uv::{apply_uv_to_channel, stamp_uv_indices};
