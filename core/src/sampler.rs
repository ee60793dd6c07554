//! Frame sampling
//!
//! A [`FrameSampler`] walks one clip at a fixed rate, one simulated frame per
//! call to [`FrameSampler::step`], and hands back the remapped vertex
//! positions of every frame inside its sampling range.

use glam::{Quat, Vec3};
use std::ops::Range;

use crate::error::{BakeError, BakeResult};
use crate::rig::AnimationEvaluator;

/// Rotation, uniform scale and the `+0.5` offset into the nominal unit box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexTransform {
    pub rotation: Quat,
    pub scale: f32,
}

impl VertexTransform {
    pub fn new(rotation: Quat, scale: f32) -> Self {
        Self { rotation, scale }
    }

    /// Scale only
    pub fn scale(scale: f32) -> Self {
        Self::new(Quat::IDENTITY, scale)
    }

    /// Undo the rig's root rotation when `bake_rotation` is set
    pub fn for_rig(root_rotation: Quat, bake_rotation: bool, scale: f32) -> Self {
        let rotation = if bake_rotation {
            root_rotation.inverse()
        } else {
            Quat::IDENTITY
        };
        Self::new(rotation, scale)
    }

    #[inline]
    pub fn apply(&self, position: Vec3) -> Vec3 {
        (self.rotation * position) * self.scale + Vec3::splat(0.5)
    }
}

/// Result of one sampler step
#[derive(Debug, PartialEq)]
pub enum FrameStep<'a> {
    /// The clip was started; the pose settles before the first frame
    Settled,
    /// A leading frame before the sampling range was simulated
    Skipped { frame: u32 },
    /// A frame inside the range was simulated and captured
    Sampled { frame: u32, positions: &'a [Vec3] },
    /// Every frame has been simulated
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SamplerState {
    Unstarted,
    Settled,
    Running,
    Finished,
}

/// Lazy, non-restartable per-clip frame sequence
#[derive(Debug)]
pub struct FrameSampler {
    clip: String,
    dt: f32,
    range: Range<u32>,
    vertex_count: usize,
    transform: VertexTransform,
    state: SamplerState,
    next_frame: u32,
    raw: Vec<Vec3>,
    positions: Vec<Vec3>,
}

impl FrameSampler {
    /// Sample `range` of `clip`
    ///
    /// Frames `0..range.start` are still simulated to keep animation time in
    /// step, but nothing is captured for them.
    pub fn new(
        clip: impl Into<String>,
        fps: u32,
        range: Range<u32>,
        vertex_count: usize,
        transform: VertexTransform,
    ) -> Self {
        Self {
            clip: clip.into(),
            dt: 1.0 / fps.max(1) as f32,
            range,
            vertex_count,
            transform,
            state: SamplerState::Unstarted,
            next_frame: 0,
            raw: Vec::with_capacity(vertex_count),
            positions: Vec::with_capacity(vertex_count),
        }
    }

    pub fn clip(&self) -> &str {
        &self.clip
    }

    /// Number of frames that will be captured
    pub fn sampled_frames(&self) -> u32 {
        self.range.end.saturating_sub(self.range.start)
    }

    /// Zero-based index of the `frame` within the captured range
    pub fn capture_index(&self, frame: u32) -> u32 {
        frame - self.range.start
    }

    /// Frames simulated so far, skipped ones included
    pub fn frames_simulated(&self) -> u32 {
        self.next_frame
    }

    /// True once the last frame has been simulated
    pub fn is_exhausted(&self) -> bool {
        match self.state {
            SamplerState::Finished => true,
            SamplerState::Running => self.next_frame >= self.range.end,
            _ => false,
        }
    }

    /// Simulate one frame (or start the clip on the first call)
    pub fn step<E>(&mut self, evaluator: &mut E) -> BakeResult<FrameStep<'_>>
    where
        E: AnimationEvaluator + ?Sized,
    {
        match self.state {
            SamplerState::Unstarted => {
                evaluator.play(&self.clip)?;
                self.state = SamplerState::Settled;
                return Ok(FrameStep::Settled);
            }
            SamplerState::Settled => {
                // Time zero is evaluated once the pose has settled
                evaluator.advance(0.0)?;
                self.state = SamplerState::Running;
            }
            SamplerState::Running => {}
            SamplerState::Finished => return Ok(FrameStep::Finished),
        }

        if self.next_frame >= self.range.end {
            self.state = SamplerState::Finished;
            return Ok(FrameStep::Finished);
        }

        let frame = self.next_frame;
        let captured = frame >= self.range.start;
        if captured {
            evaluator.snapshot(&mut self.raw)?;
            if self.raw.len() != self.vertex_count {
                return Err(BakeError::VertexCountChanged {
                    clip: self.clip.clone(),
                    frame,
                    expected: self.vertex_count,
                    actual: self.raw.len(),
                });
            }
            let transform = self.transform;
            self.positions.clear();
            self.positions
                .extend(self.raw.iter().map(|&p| transform.apply(p)));
        }

        evaluator.advance(self.dt)?;
        self.next_frame += 1;

        if captured {
            Ok(FrameStep::Sampled {
                frame,
                positions: &self.positions,
            })
        } else {
            Ok(FrameStep::Skipped { frame })
        }
    }
}
