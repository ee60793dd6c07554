//! Bake orchestration
//!
//! Animation bakes are step-driven: the host calls [`BakeTask::step`] once per
//! refresh and each call simulates exactly one animation frame (plus one
//! settle step when a clip starts). [`run_to_completion`] drives a task in a
//! plain loop when no interactive host exists.
//!
//! Mesh bakes and UV stamping are single-shot and live in their own modules.

mod animation;
mod mesh;
mod plan;
mod preconditions;

pub use animation::{AnimationBake, TEXTURE_ARRAY_EXTENSION, bake_animation, start_animation_bake};
pub use mesh::{MeshBakeReport, bake_mesh};
pub use plan::{AnimationPlan, HOST_REFRESH_HZ, PlanSize, PlannedClip};
pub use preconditions::{
    animation_blocker, refresh_animation_diagnostics, refresh_mesh_diagnostics,
    refresh_uv_diagnostics,
};

use std::path::{Path, PathBuf};

use crate::diagnostics::Ledger;
use crate::error::BakeResult;
use crate::layout::TextureLayout;

/// Position of a running bake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Index of the clip being baked among the clips that produce frames
    pub clip: usize,
    pub clip_count: usize,
    /// Frames simulated so far in the current clip
    pub frame: u32,
    pub frame_count: u32,
    /// Steps completed across the whole bake
    pub step: u64,
    pub total_steps: u64,
}

impl Progress {
    /// Completed share of the bake in `[0, 1]`
    pub fn fraction(&self) -> f32 {
        if self.total_steps == 0 {
            return 1.0;
        }
        self.step as f32 / self.total_steps as f32
    }
}

/// Outcome of a finished animation bake
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BakeReport {
    /// Files written, in order
    pub files: Vec<PathBuf>,
    /// Clips that contributed frames
    pub clips: usize,
    /// Frames captured across all clips
    pub frames: u64,
    /// Clips without a single frame at the chosen rate
    pub skipped: Vec<String>,
}

/// Result of one step
#[derive(Debug, Clone, PartialEq)]
pub enum BakeStatus<T> {
    Pending(Progress),
    Finished(T),
}

/// A bake advanced one unit of work at a time
pub trait BakeTask {
    type Output;

    fn step(&mut self, ledger: &mut Ledger) -> BakeResult<BakeStatus<Self::Output>>;
}

/// Step `task` until it finishes
pub fn run_to_completion<T: BakeTask + ?Sized>(
    task: &mut T,
    ledger: &mut Ledger,
) -> BakeResult<T::Output> {
    loop {
        if let BakeStatus::Finished(output) = task.step(ledger)? {
            return Ok(output);
        }
    }
}

/// Make `name` safe to embed in a file name
///
/// Path separators, reserved and control characters become `_`. An empty
/// result falls back to `fallback`.
pub fn sanitize_file_component(name: &str, fallback: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = sanitized.trim_matches('.');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `{stem}@{clip} f{frames} s{w}x{h}.{ext}`
pub fn clip_file_name(
    stem: &str,
    clip: &str,
    frames: u32,
    layout: TextureLayout,
    extension: &str,
) -> String {
    format!(
        "{}@{} f{} s{}.{}",
        stem,
        sanitize_file_component(clip, "clip"),
        frames,
        layout,
        extension
    )
}

/// `{stem} v{vertices} s{w}x{h}.{ext}`
pub fn mesh_file_name(stem: &str, vertices: usize, layout: TextureLayout, extension: &str) -> String {
    format!("{} v{} s{}.{}", stem, vertices, layout, extension)
}

/// Directory and stem of a chosen save path
#[derive(Debug, Clone)]
pub(crate) struct OutputPaths {
    chosen: PathBuf,
    dir: PathBuf,
    stem: String,
}

impl OutputPaths {
    pub(crate) fn new(chosen: PathBuf) -> Self {
        let dir = chosen.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = chosen
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { chosen, dir, stem }
    }

    pub(crate) fn chosen(&self) -> &Path {
        &self.chosen
    }

    pub(crate) fn clip_texture(
        &self,
        clip: &str,
        frames: u32,
        layout: TextureLayout,
        extension: &str,
    ) -> PathBuf {
        self.dir
            .join(clip_file_name(&self.stem, clip, frames, layout, extension))
    }

    pub(crate) fn mesh_texture(&self, vertices: usize, layout: TextureLayout, extension: &str) -> PathBuf {
        self.dir
            .join(mesh_file_name(&self.stem, vertices, layout, extension))
    }
}
