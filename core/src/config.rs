//! Bake configuration
//!
//! Every bake parameter is collected into an immutable struct up front and
//! passed into the orchestrator. Nothing is read from shared state while a
//! bake runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::info;

use crate::encode::ColorEncoding;
use crate::error::{BakeError, BakeResult};
use crate::layout::TexelOrder;
use crate::mesh::UvChannel;

/// Highest accepted capture rate
pub const MAX_FPS: u32 = 120;

/// Which clips an animation bake covers and how they are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BakeMode {
    /// One clip, one texture, optional frame range
    Single,
    /// Every clip, one texture per clip
    #[default]
    #[serde(alias = "individual")]
    AllIndividual,
    /// Every clip, one slice per clip in a texture array
    #[serde(alias = "array")]
    AllTextureArray,
}

impl fmt::Display for BakeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "Single"),
            Self::AllIndividual => write!(f, "All (Individual)"),
            Self::AllTextureArray => write!(f, "All (Texture Array)"),
        }
    }
}

impl FromStr for BakeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "all-individual" | "individual" => Ok(Self::AllIndividual),
            "all-texture-array" | "array" => Ok(Self::AllTextureArray),
            _ => Err(format!(
                "unknown bake mode '{}' (use single, individual or array)",
                s
            )),
        }
    }
}

/// Clip chosen for a single-clip bake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClipSelector {
    Index(usize),
    Name(String),
}

impl Default for ClipSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl fmt::Display for ClipSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{}", index),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for ClipSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Name(s.to_string()),
        })
    }
}

fn default_fps() -> u32 {
    30
}

fn default_scale() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_max_frame() -> u32 {
    200
}

fn validate_scale(scale: f32) -> BakeResult<()> {
    if !scale.is_finite() || scale == 0.0 {
        return Err(BakeError::InvalidConfig(format!(
            "scale must be finite and non-zero, got {}",
            scale
        )));
    }
    Ok(())
}

/// Animation baker parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationBakeConfig {
    /// Capture rate (1-120)
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Uniform scale applied before the `+0.5` offset
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Undo the rig's root rotation before baking
    #[serde(default = "default_true")]
    pub bake_rotation: bool,
    #[serde(default)]
    pub color: ColorEncoding,
    #[serde(default)]
    pub mode: BakeMode,
    /// Clip for `BakeMode::Single`
    #[serde(default)]
    pub clip: ClipSelector,
    /// First sampled frame for `BakeMode::Single`
    #[serde(default)]
    pub min_frame: u32,
    /// End of the sampled range (exclusive), clamped to the clip's frames
    #[serde(default = "default_max_frame")]
    pub max_frame: u32,
    #[serde(default)]
    pub texel_order: TexelOrder,
}

impl Default for AnimationBakeConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            scale: default_scale(),
            bake_rotation: true,
            color: ColorEncoding::default(),
            mode: BakeMode::default(),
            clip: ClipSelector::default(),
            min_frame: 0,
            max_frame: default_max_frame(),
            texel_order: TexelOrder::default(),
        }
    }
}

impl AnimationBakeConfig {
    pub fn validate(&self) -> BakeResult<()> {
        if !(1..=MAX_FPS).contains(&self.fps) {
            return Err(BakeError::InvalidConfig(format!(
                "fps must be within 1..={}, got {}",
                MAX_FPS, self.fps
            )));
        }
        validate_scale(self.scale)?;
        if self.min_frame > self.max_frame {
            return Err(BakeError::InvalidConfig(format!(
                "min frame {} is past max frame {}",
                self.min_frame, self.max_frame
            )));
        }
        Ok(())
    }

    /// Sampled frame range for a clip with `total` frames
    ///
    /// The end is clamped to `total` and the start to the end.
    pub fn frame_range(&self, total: u32) -> Range<u32> {
        let max = self.max_frame.min(total);
        let min = self.min_frame.min(max);
        if max != self.max_frame || min != self.min_frame {
            info!(
                "Clamped frame range {}..{} to {}..{} ({} frames available)",
                self.min_frame, self.max_frame, min, max, total
            );
        }
        min..max
    }
}

/// Mesh baker parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshBakeConfig {
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub color: ColorEncoding,
    #[serde(default)]
    pub texel_order: TexelOrder,
}

impl Default for MeshBakeConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            color: ColorEncoding::default(),
            texel_order: TexelOrder::default(),
        }
    }
}

impl MeshBakeConfig {
    pub fn validate(&self) -> BakeResult<()> {
        validate_scale(self.scale)
    }
}

/// UV mapper parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvStampConfig {
    /// Channel that receives the vertex indices
    #[serde(default)]
    pub channel: UvChannel,
    /// Scale applied to the copied positions
    #[serde(default = "default_scale")]
    pub scale: f32,
}

impl Default for UvStampConfig {
    fn default() -> Self {
        Self {
            channel: UvChannel::default(),
            scale: default_scale(),
        }
    }
}

impl UvStampConfig {
    pub fn validate(&self) -> BakeResult<()> {
        validate_scale(self.scale)
    }
}
