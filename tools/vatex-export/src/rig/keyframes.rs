//! Keyframe tracks read from glTF animation channels

use anyhow::{Context, Result, bail};
use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;

use super::NodeTransform;

/// How values between two keys are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interpolation {
    Step,
    Linear,
}

/// Values that can be blended between keys
pub(crate) trait Blend: Copy {
    fn blend(self, other: Self, factor: f32) -> Self;
}

impl Blend for Vec3 {
    fn blend(self, other: Self, factor: f32) -> Self {
        self.lerp(other, factor)
    }
}

impl Blend for Quat {
    fn blend(self, other: Self, factor: f32) -> Self {
        self.slerp(other, factor).normalize()
    }
}

/// Sorted key times with one value per key
#[derive(Debug, Clone)]
pub(crate) struct Track<T> {
    times: Vec<f32>,
    values: Vec<T>,
    interpolation: Interpolation,
}

impl<T: Blend> Track<T> {
    pub(crate) fn new(times: Vec<f32>, values: Vec<T>, interpolation: Interpolation) -> Result<Self> {
        if times.is_empty() {
            bail!("Animation sampler has no keyframes");
        }
        if times.len() != values.len() {
            bail!(
                "Animation sampler has {} keys but {} values",
                times.len(),
                values.len()
            );
        }
        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    /// Time of the last key
    pub(crate) fn end(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Value at `time`, holding the first and last keys outside the track
    pub(crate) fn sample(&self, time: f32) -> T {
        let next = self.times.partition_point(|&key| key <= time);
        if next == 0 {
            return self.values[0];
        }
        if next >= self.times.len() {
            return self.values[self.values.len() - 1];
        }

        let i = next - 1;
        match self.interpolation {
            Interpolation::Step => self.values[i],
            Interpolation::Linear => {
                let (t0, t1) = (self.times[i], self.times[next]);
                let factor = if t1 > t0 { (time - t0) / (t1 - t0) } else { 0.0 };
                self.values[i].blend(self.values[next], factor.clamp(0.0, 1.0))
            }
        }
    }
}

/// Animated property of one node
#[derive(Debug, Clone)]
pub(crate) enum ChannelTrack {
    Translation(Track<Vec3>),
    Rotation(Track<Quat>),
    Scale(Track<Vec3>),
}

/// Track bound to a node index
#[derive(Debug, Clone)]
pub(crate) struct Channel {
    pub node: usize,
    pub track: ChannelTrack,
}

impl Channel {
    pub(crate) fn end(&self) -> f32 {
        match &self.track {
            ChannelTrack::Translation(track) | ChannelTrack::Scale(track) => track.end(),
            ChannelTrack::Rotation(track) => track.end(),
        }
    }

    /// Overwrite the animated property of `local` with its value at `time`
    pub(crate) fn apply(&self, time: f32, local: &mut NodeTransform) {
        match &self.track {
            ChannelTrack::Translation(track) => local.translation = track.sample(time),
            ChannelTrack::Rotation(track) => local.rotation = track.sample(time),
            ChannelTrack::Scale(track) => local.scale = track.sample(time),
        }
    }
}

/// A named set of channels
#[derive(Debug, Clone)]
pub(crate) struct Clip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl Clip {
    /// Read every TRS channel of `animation`; morph target weights are ignored
    pub(crate) fn read(
        animation: &gltf::Animation,
        buffers: &[gltf::buffer::Data],
    ) -> Result<Self> {
        let name = animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Animation {}", animation.index()));

        let mut channels = Vec::new();
        for channel in animation.channels() {
            let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
            let times: Vec<f32> = reader
                .read_inputs()
                .with_context(|| format!("Animation '{}' channel has no input times", name))?
                .collect();
            let outputs = reader
                .read_outputs()
                .with_context(|| format!("Animation '{}' channel has no output values", name))?;

            let sampler = channel.sampler().interpolation();
            let (interpolation, cubic) = match sampler {
                gltf::animation::Interpolation::Step => (Interpolation::Step, false),
                gltf::animation::Interpolation::Linear => (Interpolation::Linear, false),
                gltf::animation::Interpolation::CubicSpline => (Interpolation::Linear, true),
            };

            let track = match outputs {
                ReadOutputs::Translations(iter) => ChannelTrack::Translation(Track::new(
                    times,
                    key_values(iter.map(Vec3::from_array), cubic),
                    interpolation,
                )?),
                ReadOutputs::Rotations(iter) => ChannelTrack::Rotation(Track::new(
                    times,
                    key_values(iter.into_f32().map(Quat::from_array), cubic),
                    interpolation,
                )?),
                ReadOutputs::Scales(iter) => ChannelTrack::Scale(Track::new(
                    times,
                    key_values(iter.map(Vec3::from_array), cubic),
                    interpolation,
                )?),
                ReadOutputs::MorphTargetWeights(_) => continue,
            };
            channels.push(Channel {
                node: channel.target().node().index(),
                track,
            });
        }

        let duration = channels.iter().map(Channel::end).fold(0.0, f32::max);
        Ok(Self {
            name,
            duration,
            channels,
        })
    }
}

/// Keep only the value element of cubic-spline `(in, value, out)` triplets
fn key_values<T>(values: impl Iterator<Item = T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.skip(1).step_by(3).collect()
    } else {
        values.collect()
    }
}
