//! File-level bake jobs
//!
//! Each job loads its asset, refreshes the matching diagnostic ledger, runs
//! the core baker with file writers and logs whatever the ledger still holds.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use vatex_core::{
    AnimationBakeConfig, AnimationPlan, BakeReport, BakeStatus, BakeTask, ClipInfo, Diagnostic,
    Domain, FileTextureWriter, Ledger, MeshBakeConfig, MeshBakeReport, Rig, RigComponents,
    SavePrompt, SaveRequest, Severity, UvStampConfig, apply_uv_to_channel, bake_mesh,
    refresh_animation_diagnostics, refresh_mesh_diagnostics, refresh_uv_diagnostics,
    start_animation_bake,
};

use crate::glb::GlbMeshWriter;
use crate::mesh::load_mesh;
use crate::rig::GltfRig;

/// Answers save requests with a fixed path, or the default file name in a directory
#[derive(Debug, Clone)]
pub struct OutputPrompt {
    path: Option<PathBuf>,
    dir: PathBuf,
}

impl OutputPrompt {
    pub fn new(path: Option<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            path,
            dir: dir.into(),
        }
    }
}

impl SavePrompt for OutputPrompt {
    fn request_path(&mut self, request: &SaveRequest) -> Option<PathBuf> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| self.dir.join(request.default_file_name()));
        debug!("{}: {}", request.title, path.display());
        Some(path)
    }
}

/// Log every active diagnostic at its severity
pub fn log_diagnostics(ledger: &Ledger) {
    for diagnostic in ledger.iter() {
        match diagnostic.severity() {
            Severity::Error => tracing::error!("{}", diagnostic),
            Severity::Warning => warn!("{}", diagnostic),
        }
    }
}

/// Bake every clip `config` selects from the rig at `input`
pub fn export_animation<P: SavePrompt + ?Sized>(
    input: &Path,
    config: &AnimationBakeConfig,
    prompt: &mut P,
) -> Result<Option<BakeReport>> {
    let rig = GltfRig::load(input)?;
    let mut ledger = Ledger::new(Domain::Animation);
    if !refresh_animation_diagnostics(Some(&rig), &mut ledger) {
        log_diagnostics(&ledger);
    }

    let Some(mut bake) = start_animation_bake(&rig, config, prompt, FileTextureWriter::new(), &mut ledger)
        .with_context(|| format!("Failed to start bake of {:?}", input))?
    else {
        return Ok(None);
    };
    for line in bake.plan().to_string().lines() {
        debug!("{}", line);
    }

    let mut current_clip = None;
    let report = loop {
        match bake.step(&mut ledger)? {
            BakeStatus::Pending(progress) => {
                if current_clip != Some(progress.clip) {
                    current_clip = Some(progress.clip);
                    debug!(
                        "Clip {}/{} ({:.0}% of bake)",
                        progress.clip + 1,
                        progress.clip_count,
                        progress.fraction() * 100.0
                    );
                }
            }
            BakeStatus::Finished(report) => break report,
        }
    };

    log_diagnostics(&ledger);
    info!(
        "Baked {} clip(s), {} frames into {} file(s)",
        report.clips,
        report.frames,
        report.files.len()
    );
    Ok(Some(report))
}

/// Bake the rest pose of the mesh at `input`
pub fn export_mesh<P: SavePrompt + ?Sized>(
    input: &Path,
    config: &MeshBakeConfig,
    prompt: &mut P,
) -> Result<Option<MeshBakeReport>> {
    let mesh = load_mesh(input)?;
    let mut ledger = Ledger::new(Domain::Mesh);
    refresh_mesh_diagnostics(Some(&mesh), &mut ledger);
    let report = bake_mesh(&mesh, config, prompt, FileTextureWriter::new(), &mut ledger)
        .with_context(|| format!("Failed to bake mesh {:?}", input))?;
    log_diagnostics(&ledger);
    Ok(report)
}

/// Stamp vertex indices into a UV channel of the mesh at `input`, writing a GLB
pub fn export_uv<P: SavePrompt + ?Sized>(
    input: &Path,
    config: &UvStampConfig,
    prompt: &mut P,
) -> Result<Option<PathBuf>> {
    let mesh = load_mesh(input)?;
    let mut ledger = Ledger::new(Domain::Uv);
    refresh_uv_diagnostics(Some(&mesh), config.channel, &mut ledger);
    log_diagnostics(&ledger);
    apply_uv_to_channel(&mesh, config, prompt, GlbMeshWriter::new())
        .with_context(|| format!("Failed to stamp UVs of {:?}", input))
}

/// What a rig offers and what baking it with a configuration would produce
#[derive(Debug, Clone)]
pub struct RigSummary {
    pub name: String,
    pub components: RigComponents,
    pub vertex_count: usize,
    pub clips: Vec<ClipInfo>,
    /// Active animation diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// `None` when a blocking diagnostic is active
    pub plan: Option<AnimationPlan>,
}

/// Clips of the rig at `input`, without planning a bake
pub fn list_clips(input: &Path) -> Result<Vec<ClipInfo>> {
    Ok(GltfRig::load(input)?.clips())
}

/// Load the rig at `input` and plan a bake without writing anything
pub fn inspect_rig(input: &Path, config: &AnimationBakeConfig) -> Result<RigSummary> {
    let rig = GltfRig::load(input)?;
    let mut ledger = Ledger::new(Domain::Animation);
    let plan = if refresh_animation_diagnostics(Some(&rig), &mut ledger) {
        Some(AnimationPlan::new(&rig, config)?)
    } else {
        None
    };
    Ok(RigSummary {
        name: rig.name().to_string(),
        components: rig.components(),
        vertex_count: rig.vertex_count(),
        clips: rig.clips(),
        diagnostics: ledger.iter().collect(),
        plan,
    })
}
