//! Texture layout planning
//!
//! Chooses power-of-two texel grids that hold one texel per vertex per frame.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BakeError, BakeResult};

/// Power-of-two texel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureLayout {
    pub width: u32,
    pub height: u32,
}

impl TextureLayout {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square layout with the given side
    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// Total number of texels
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Elementwise minimum
    pub fn min(self, other: Self) -> Self {
        Self::new(self.width.min(other.width), self.height.min(other.height))
    }

    /// Elementwise maximum
    pub fn max(self, other: Self) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Texel coordinate of the `index`-th written texel
    pub fn texel(&self, index: usize, order: TexelOrder) -> (u32, u32) {
        let index = index as u64;
        match order {
            TexelOrder::ColumnMajor => (
                (index / self.height as u64) as u32,
                (index % self.height as u64) as u32,
            ),
            TexelOrder::RowMajor => (
                (index % self.width as u64) as u32,
                (index / self.width as u64) as u32,
            ),
        }
    }
}

impl fmt::Display for TextureLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Order in which consecutive (frame, vertex) samples fill the grid
///
/// Sample `k = frame * vertex_count + vertex` lands at:
/// - column-major: `x = k / height`, `y = k % height`
/// - row-major: `x = k % width`, `y = k / width`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TexelOrder {
    #[default]
    ColumnMajor,
    RowMajor,
}

impl FromStr for TexelOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "column-major" | "column" => Ok(Self::ColumnMajor),
            "row-major" | "row" => Ok(Self::RowMajor),
            _ => Err(format!(
                "unknown texel order '{}' (use column-major or row-major)",
                s
            )),
        }
    }
}

/// Smallest power-of-two side `p` derived from `floor(sqrt(n))` with `p * p >= n`
fn square_side(n: u64) -> u32 {
    let s = n.isqrt();
    let mut p = s.max(1).next_power_of_two();
    // floor(sqrt(n)) can itself be a power of two below sqrt(n), e.g. n = 5
    if p * p < n {
        p *= 2;
    }
    p as u32
}

/// Plan the layout for `vertex_count` vertices over `frame_count` frames
///
/// Starts from the square power-of-two grid and halves the width when half
/// of the grid still holds every sample.
pub fn plan_layout(vertex_count: usize, frame_count: u32) -> BakeResult<TextureLayout> {
    let demand = vertex_count as u64 * frame_count as u64;
    if demand == 0 {
        return Err(BakeError::EmptyPixelDemand {
            vertices: vertex_count,
            frames: frame_count,
        });
    }

    let p = square_side(demand);
    let mut layout = TextureLayout::square(p);
    if layout.pixel_count() / 2 >= demand {
        layout.width /= 2;
    }
    Ok(layout)
}

/// Square power-of-two layout holding `pixel_count` texels (no halving)
pub fn square_layout(pixel_count: usize) -> BakeResult<TextureLayout> {
    if pixel_count == 0 {
        return Err(BakeError::EmptyPixelDemand {
            vertices: 0,
            frames: 1,
        });
    }
    Ok(TextureLayout::square(square_side(pixel_count as u64)))
}

/// Per-clip layouts for the multi-clip modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiClipLayouts {
    /// Layout per clip; `None` for clips that produce no frames
    pub per_clip: Vec<Option<TextureLayout>>,
    /// Elementwise minimum over planned clips
    pub min: TextureLayout,
    /// Elementwise maximum over planned clips
    pub max: TextureLayout,
    /// Largest un-halved power-of-two side; the common texture-array slice size
    pub highest_side: u32,
}

/// Plan each clip independently, tracking min/max and the common array side
pub fn plan_clips(vertex_count: usize, frame_counts: &[u32]) -> BakeResult<MultiClipLayouts> {
    let mut per_clip = Vec::with_capacity(frame_counts.len());
    let mut min: Option<TextureLayout> = None;
    let mut max: Option<TextureLayout> = None;
    let mut highest_side = 0;

    for &frames in frame_counts {
        if frames == 0 {
            per_clip.push(None);
            continue;
        }
        let layout = plan_layout(vertex_count, frames)?;
        highest_side = highest_side.max(layout.height);
        min = Some(min.map_or(layout, |m| m.min(layout)));
        max = Some(max.map_or(layout, |m| m.max(layout)));
        per_clip.push(Some(layout));
    }

    match (min, max) {
        (Some(min), Some(max)) => Ok(MultiClipLayouts {
            per_clip,
            min,
            max,
            highest_side,
        }),
        _ => Err(BakeError::EmptyPixelDemand {
            vertices: vertex_count,
            frames: 0,
        }),
    }
}
