//! Bake manifest (vatex.toml)
//!
//! ```toml
//! output_dir = "baked"
//!
//! [[animation]]
//! input = "knight.glb"
//! mode = "all-individual"
//! fps = 30
//!
//! [[mesh]]
//! input = "crate.obj"
//!
//! [[uv]]
//! input = "crate.glb"
//! channel = "uv1"
//! ```
//!
//! Relative paths resolve against the manifest's directory. A job without an
//! `output` writes its default file name into the output directory.

use anyhow::{Context, Result, bail};
use hashbrown::HashSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use vatex_core::{AnimationBakeConfig, MeshBakeConfig, UvStampConfig};

use crate::export::{OutputPrompt, export_animation, export_mesh, export_uv};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// Default directory for job outputs
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default, rename = "animation")]
    pub animations: Vec<AnimationJob>,

    #[serde(default, rename = "mesh")]
    pub meshes: Vec<MeshJob>,

    #[serde(default, rename = "uv")]
    pub uvs: Vec<UvJob>,

    /// Directory the manifest was loaded from
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Animation bake of one rig
#[derive(Debug, Deserialize)]
pub struct AnimationJob {
    pub input: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub config: AnimationBakeConfig,
}

/// Rest-pose bake of one mesh
#[derive(Debug, Deserialize)]
pub struct MeshJob {
    pub input: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub config: MeshBakeConfig,
}

/// UV index stamp of one mesh
#[derive(Debug, Deserialize)]
pub struct UvJob {
    pub input: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub config: UvStampConfig,
}

/// Jobs run by [`build_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub animations: usize,
    pub meshes: usize,
    pub uvs: usize,
    pub files: usize,
}

impl Manifest {
    /// Parse manifest text; relative paths resolve against `base_dir`
    pub fn parse(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut manifest: Manifest = toml::from_str(content).context("Failed to parse manifest")?;
        manifest.base_dir = base_dir.into();
        Ok(manifest)
    }

    pub fn job_count(&self) -> usize {
        self.animations.len() + self.meshes.len() + self.uvs.len()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn prompt(&self, output: Option<&Path>, output_override: Option<&Path>) -> OutputPrompt {
        let dir = match (output_override, &self.output_dir) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(dir)) => self.resolve(dir),
            (None, None) => self.base_dir.clone(),
        };
        OutputPrompt::new(output.map(|path| self.resolve(path)), dir)
    }
}

/// Load a manifest from disk
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Manifest::parse(&content, base_dir)
        .with_context(|| format!("Invalid manifest: {:?}", path))
}

/// Check every job configuration, input and explicit output
pub fn validate(manifest: &Manifest) -> Result<()> {
    if manifest.job_count() == 0 {
        bail!("Manifest contains no jobs");
    }

    let mut outputs = HashSet::new();
    let inputs = manifest
        .animations
        .iter()
        .map(|job| (&job.input, job.output.as_ref(), job.config.validate()))
        .chain(
            manifest
                .meshes
                .iter()
                .map(|job| (&job.input, job.output.as_ref(), job.config.validate())),
        )
        .chain(
            manifest
                .uvs
                .iter()
                .map(|job| (&job.input, job.output.as_ref(), job.config.validate())),
        );

    for (input, output, config) in inputs {
        config.with_context(|| format!("Invalid settings for {:?}", input))?;
        let resolved = manifest.resolve(input);
        if !resolved.exists() {
            bail!("Input file not found: {:?}", resolved);
        }
        if let Some(output) = output {
            if !outputs.insert(manifest.resolve(output)) {
                bail!("Output {:?} is written by more than one job", output);
            }
        }
    }

    tracing::debug!("Validated {} job(s)", manifest.job_count());
    Ok(())
}

/// Run every job in the manifest
///
/// `output_override` replaces the manifest's output directory; explicit job
/// outputs are kept.
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<BuildSummary> {
    validate(manifest)?;
    let mut summary = BuildSummary::default();

    for job in &manifest.animations {
        let input = manifest.resolve(&job.input);
        tracing::info!("Baking animation {:?}", input);
        let mut prompt = manifest.prompt(job.output.as_deref(), output_override);
        if let Some(report) = export_animation(&input, &job.config, &mut prompt)? {
            summary.files += report.files.len();
        }
        summary.animations += 1;
    }

    for job in &manifest.meshes {
        let input = manifest.resolve(&job.input);
        tracing::info!("Baking mesh {:?}", input);
        let mut prompt = manifest.prompt(job.output.as_deref(), output_override);
        if export_mesh(&input, &job.config, &mut prompt)?.is_some() {
            summary.files += 1;
        }
        summary.meshes += 1;
    }

    for job in &manifest.uvs {
        let input = manifest.resolve(&job.input);
        tracing::info!("Stamping UVs {:?}", input);
        let mut prompt = manifest.prompt(job.output.as_deref(), output_override);
        if export_uv(&input, &job.config, &mut prompt)?.is_some() {
            summary.files += 1;
        }
        summary.uvs += 1;
    }

    Ok(summary)
}
