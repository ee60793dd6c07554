//! Static mesh capabilities

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of UV channels a mesh can carry
pub const UV_CHANNEL_COUNT: usize = 8;

/// One of the eight UV channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UvChannel {
    Uv0,
    #[default]
    Uv1,
    Uv2,
    Uv3,
    Uv4,
    Uv5,
    Uv6,
    Uv7,
}

impl UvChannel {
    pub const ALL: [Self; UV_CHANNEL_COUNT] = [
        Self::Uv0,
        Self::Uv1,
        Self::Uv2,
        Self::Uv3,
        Self::Uv4,
        Self::Uv5,
        Self::Uv6,
        Self::Uv7,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for UvChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UV{}", self.index())
    }
}

impl FromStr for UvChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let digits = lower.strip_prefix("uv").unwrap_or(&lower);
        digits
            .parse::<usize>()
            .ok()
            .and_then(Self::from_index)
            .ok_or_else(|| format!("unknown UV channel '{}' (use uv0..uv7)", s))
    }
}

/// Read access to a static mesh
pub trait MeshSource {
    fn name(&self) -> &str;

    fn positions(&self) -> &[Vec3];

    fn indices(&self) -> &[u32];

    /// Per-vertex normals, if the mesh has them
    fn normals(&self) -> Option<&[Vec3]>;

    /// UV set on `channel`, if populated
    fn uv_channel(&self, channel: UvChannel) -> Option<&[Vec2]>;

    fn vertex_count(&self) -> usize {
        self.positions().len()
    }

    /// True when `channel` already holds UV data
    fn has_uv(&self, channel: UvChannel) -> bool {
        self.uv_channel(channel).is_some_and(|uv| !uv.is_empty())
    }
}

/// Owned mesh buffers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// Empty when the mesh carries no normals
    pub normals: Vec<Vec3>,
    /// Empty entries are unpopulated channels
    pub uvs: [Vec<Vec2>; UV_CHANNEL_COUNT],
}

impl MeshData {
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            indices,
            ..Default::default()
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_uv(mut self, channel: UvChannel, uv: Vec<Vec2>) -> Self {
        self.uvs[channel.index()] = uv;
        self
    }

    /// Channels that currently hold data
    pub fn populated_channels(&self) -> impl Iterator<Item = UvChannel> + '_ {
        UvChannel::ALL
            .into_iter()
            .filter(|channel| !self.uvs[channel.index()].is_empty())
    }
}

impl MeshSource for MeshData {
    fn name(&self) -> &str {
        &self.name
    }

    fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    fn indices(&self) -> &[u32] {
        &self.indices
    }

    fn normals(&self) -> Option<&[Vec3]> {
        (!self.normals.is_empty()).then_some(self.normals.as_slice())
    }

    fn uv_channel(&self, channel: UvChannel) -> Option<&[Vec2]> {
        let uv = &self.uvs[channel.index()];
        (!uv.is_empty()).then_some(uv.as_slice())
    }
}

impl<M: MeshSource + ?Sized> MeshSource for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn positions(&self) -> &[Vec3] {
        (**self).positions()
    }

    fn indices(&self) -> &[u32] {
        (**self).indices()
    }

    fn normals(&self) -> Option<&[Vec3]> {
        (**self).normals()
    }

    fn uv_channel(&self, channel: UvChannel) -> Option<&[Vec2]> {
        (**self).uv_channel(channel)
    }
}
