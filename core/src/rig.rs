//! Animation source capabilities
//!
//! The bake orchestrators never see a concrete scene. They talk to a [`Rig`],
//! which describes what the asset carries, and to a per-bake
//! [`AnimationEvaluator`] instance that plays clips and produces skinned
//! vertex snapshots.

use glam::{Quat, Vec3};

use crate::error::BakeResult;

/// Which animation components the rig hierarchy provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RigComponents {
    /// A skinned mesh renderer exists somewhere in the hierarchy
    pub skinned_mesh: bool,
    /// An animator drives the skinned mesh
    pub animator: bool,
    /// The animator has a controller holding clips
    pub controller: bool,
}

impl RigComponents {
    /// Every component present
    pub const COMPLETE: Self = Self {
        skinned_mesh: true,
        animator: true,
        controller: true,
    };
}

/// A named clip and its duration in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    pub name: String,
    pub length: f32,
}

impl ClipInfo {
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }

    /// Frames produced when resampling at `fps`: `floor(length * fps)`
    pub fn frame_count(&self, fps: u32) -> u32 {
        if self.length <= 0.0 {
            return 0;
        }
        (self.length * fps as f32).floor() as u32
    }
}

/// Source asset for animation bakes
pub trait Rig {
    /// Working copy used for one bake session, released on drop
    type Instance<'a>: AnimationEvaluator
    where
        Self: 'a;

    /// Display name, used for default file names
    fn name(&self) -> &str;

    fn components(&self) -> RigComponents;

    /// Clips exposed by the animator, in controller order
    fn clips(&self) -> Vec<ClipInfo>;

    /// Vertex count of the skinned mesh
    fn vertex_count(&self) -> usize;

    /// Local rotation of the rig's first child, undone when baking rotation
    fn root_rotation(&self) -> Quat;

    /// Clone the rig for sampling; the source is never mutated
    fn instantiate(&self) -> BakeResult<Self::Instance<'_>>;
}

/// Per-session animation playback
///
/// Calls arrive strictly in order: `play`, then alternating `advance` and
/// `snapshot`, for each clip in turn.
pub trait AnimationEvaluator {
    /// Start `clip` at local time zero
    fn play(&mut self, clip: &str) -> anyhow::Result<()>;

    /// Advance simulated time by `dt` seconds and re-evaluate the pose
    fn advance(&mut self, dt: f32) -> anyhow::Result<()>;

    /// Write the current skinned vertex positions into `out`
    ///
    /// `out` is cleared first. Vertex order must be stable within a clip.
    fn snapshot(&mut self, out: &mut Vec<Vec3>) -> anyhow::Result<()>;
}

impl<E: AnimationEvaluator + ?Sized> AnimationEvaluator for Box<E> {
    fn play(&mut self, clip: &str) -> anyhow::Result<()> {
        (**self).play(clip)
    }

    fn advance(&mut self, dt: f32) -> anyhow::Result<()> {
        (**self).advance(dt)
    }

    fn snapshot(&mut self, out: &mut Vec<Vec3>) -> anyhow::Result<()> {
        (**self).snapshot(out)
    }
}
