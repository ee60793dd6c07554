//! Pixel encoding
//!
//! Maps remapped vertex positions to RGBA texels and reports values that an
//! 8-bit container would clamp.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::{Diagnostic, Ledger};
use crate::layout::TexelOrder;
use crate::texture::{Pixel, TextureBuffer};

/// Channel encoding of the output container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorEncoding {
    /// 8 bits per channel, clamped to `[0, 1]` (PNG)
    Ldr,
    /// Unclamped floating point (OpenEXR)
    #[default]
    Hdr,
}

impl ColorEncoding {
    /// File extension of the container written for this encoding
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ldr => "png",
            Self::Hdr => "exr",
        }
    }
}

impl fmt::Display for ColorEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ldr => write!(f, "LDR"),
            Self::Hdr => write!(f, "HDR"),
        }
    }
}

impl FromStr for ColorEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ldr" => Ok(Self::Ldr),
            "hdr" => Ok(Self::Hdr),
            _ => Err(format!("unknown color mode '{}' (use ldr or hdr)", s)),
        }
    }
}

/// Encodes positions for one bake session
#[derive(Debug, Clone, Copy)]
pub struct PixelEncoder {
    encoding: ColorEncoding,
}

impl PixelEncoder {
    pub fn new(encoding: ColorEncoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> ColorEncoding {
        self.encoding
    }

    /// R=x, G=y, B=z, A=1
    ///
    /// No clamping happens here. Under LDR an out-of-range component raises
    /// [`Diagnostic::PixelOutOfRange`] in `ledger`.
    pub fn encode(&self, position: Vec3, ledger: &mut Ledger) -> Pixel {
        let pixel = Pixel::new(position.x, position.y, position.z, 1.0);
        if self.encoding == ColorEncoding::Ldr && pixel.is_out_of_range() {
            ledger.set_condition(Diagnostic::PixelOutOfRange, true);
        }
        pixel
    }

    /// Encode one frame of positions as samples `first_sample..`
    pub fn encode_frame(
        &self,
        positions: &[Vec3],
        first_sample: usize,
        order: TexelOrder,
        buffer: &mut TextureBuffer,
        ledger: &mut Ledger,
    ) {
        for (vertex, &position) in positions.iter().enumerate() {
            let pixel = self.encode(position, ledger);
            buffer.put_sample(first_sample + vertex, order, pixel);
        }
    }
}
