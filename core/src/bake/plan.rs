//! Animation bake planning
//!
//! Resolves the clips, frame ranges and texture layouts of a bake before any
//! sampling happens. The same plan backs the summary the host shows and the
//! orchestrator that runs the bake.

use std::fmt;
use std::ops::Range;

use crate::config::{AnimationBakeConfig, BakeMode, ClipSelector};
use crate::error::{BakeError, BakeResult};
use crate::layout::{TextureLayout, plan_clips, plan_layout};
use crate::rig::{ClipInfo, Rig};

/// Host refresh rate the estimated bake time assumes (one frame per refresh)
pub const HOST_REFRESH_HZ: f32 = 60.0;

/// One clip as it will be baked
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedClip {
    pub name: String,
    /// Clip length in seconds
    pub length: f32,
    /// `floor(length * fps)`
    pub total_frames: u32,
    /// Frames captured into the texture
    pub range: Range<u32>,
    /// Texture layout; `None` when the clip produces no frames
    pub layout: Option<TextureLayout>,
}

impl PlannedClip {
    pub fn frame_count(&self) -> u32 {
        self.range.end - self.range.start
    }
}

/// Result texture size of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSize {
    Single(TextureLayout),
    Individual {
        min: TextureLayout,
        max: TextureLayout,
    },
    Array {
        side: u32,
        layers: usize,
    },
}

impl fmt::Display for PlanSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(layout) => write!(f, "{}", layout),
            Self::Individual { min, max } => write!(f, "{} (min), {} (max)", min, max),
            Self::Array { side, layers } => write!(f, "{}x{}x{}", side, side, layers),
        }
    }
}

/// Everything the orchestrator needs to know up front
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPlan {
    pub mode: BakeMode,
    pub fps: u32,
    pub vertex_count: usize,
    pub clips: Vec<PlannedClip>,
    pub size: PlanSize,
}

fn resolve_clip<'a>(clips: &'a [ClipInfo], selector: &ClipSelector) -> BakeResult<&'a ClipInfo> {
    let found = match selector {
        ClipSelector::Index(index) => clips.get(*index),
        ClipSelector::Name(name) => clips.iter().find(|clip| &clip.name == name),
    };
    found.ok_or_else(|| BakeError::ClipNotFound(selector.to_string()))
}

impl AnimationPlan {
    /// Plan a bake of `rig` under `config`
    pub fn new<R: Rig + ?Sized>(rig: &R, config: &AnimationBakeConfig) -> BakeResult<Self> {
        config.validate()?;
        let fps = config.fps;
        let vertex_count = rig.vertex_count();
        let clips = rig.clips();

        match config.mode {
            BakeMode::Single => {
                let clip = resolve_clip(&clips, &config.clip)?;
                let total_frames = clip.frame_count(fps);
                let range = config.frame_range(total_frames);
                if range.is_empty() {
                    return Err(BakeError::EmptyFrameRange {
                        clip: clip.name.clone(),
                        min: range.start,
                        max: range.end,
                    });
                }
                let layout = plan_layout(vertex_count, range.end - range.start)?;
                Ok(Self {
                    mode: config.mode,
                    fps,
                    vertex_count,
                    clips: vec![PlannedClip {
                        name: clip.name.clone(),
                        length: clip.length,
                        total_frames,
                        range,
                        layout: Some(layout),
                    }],
                    size: PlanSize::Single(layout),
                })
            }
            BakeMode::AllIndividual | BakeMode::AllTextureArray => {
                let frame_counts: Vec<u32> = clips.iter().map(|clip| clip.frame_count(fps)).collect();
                if frame_counts.iter().all(|&frames| frames == 0) {
                    return Err(BakeError::NothingToBake { fps });
                }
                let layouts = plan_clips(vertex_count, &frame_counts)?;
                let size = if config.mode == BakeMode::AllTextureArray {
                    PlanSize::Array {
                        side: layouts.highest_side,
                        layers: clips.len(),
                    }
                } else {
                    PlanSize::Individual {
                        min: layouts.min,
                        max: layouts.max,
                    }
                };
                let clips = clips
                    .into_iter()
                    .zip(frame_counts)
                    .zip(layouts.per_clip)
                    .map(|((clip, total_frames), layout)| PlannedClip {
                        name: clip.name,
                        length: clip.length,
                        total_frames,
                        range: 0..total_frames,
                        layout,
                    })
                    .collect();
                Ok(Self {
                    mode: config.mode,
                    fps,
                    vertex_count,
                    clips,
                    size,
                })
            }
        }
    }

    /// Clips covered by the bake
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Frames written across all clips
    pub fn frames(&self) -> u64 {
        self.clips.iter().map(|clip| clip.frame_count() as u64).sum()
    }

    /// Texels filled across all clips
    pub fn pixels(&self) -> u64 {
        self.frames() * self.vertex_count as u64
    }

    /// Frames simulated across all clips, including skipped leading frames
    pub fn simulated_frames(&self) -> u64 {
        self.clips.iter().map(|clip| clip.range.end as u64).sum()
    }

    /// Seconds of clip time covered
    pub fn total_seconds(&self) -> f32 {
        self.clips.iter().map(|clip| clip.length).sum()
    }

    /// Wall time when one simulated frame is baked per host refresh
    pub fn estimated_seconds(&self) -> f32 {
        self.total_seconds() * self.fps as f32 / HOST_REFRESH_HZ
    }
}

impl fmt::Display for AnimationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Animations: {}", self.clip_count())?;
        writeln!(f, "Frames to bake: {}", self.frames())?;
        writeln!(f, "Pixels to fill: {}", self.pixels())?;
        writeln!(f, "Result texture size: {}", self.size)?;
        write!(f, "Estimated bake time: {:.2} seconds", self.estimated_seconds())
    }
}
