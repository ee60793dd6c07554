//! Baked texture array container (.vatarr)
//!
//! One half-float RGBA slice per clip, all slices the same size.
//!
//! # Layout
//! ```text
//! 0x00: magic "VATA"
//! 0x04: version u16 (1)
//! 0x06: format u16 (1 = RGBA16F)
//! 0x08: width u32
//! 0x0C: height u32
//! 0x10: layer count u32
//! 0x14: texel data (layers × height × width × 4 f16, slice-major then row-major)
//! ```
//!
//! All fields are little-endian.

use half::f16;

use crate::error::{BakeError, BakeResult};
use crate::texture::{Pixel, TextureArray};

pub const TEXTURE_ARRAY_MAGIC: [u8; 4] = *b"VATA";
pub const TEXTURE_ARRAY_VERSION: u16 = 1;

/// Texel format of a texture array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TextureArrayFormat {
    Rgba16F = 1,
}

impl TextureArrayFormat {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::Rgba16F),
            _ => None,
        }
    }

    pub fn bytes_per_texel(&self) -> usize {
        match self {
            Self::Rgba16F => 8,
        }
    }
}

/// Texture array header (20 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureArrayHeader {
    pub version: u16,
    pub format: TextureArrayFormat,
    pub width: u32,
    pub height: u32,
    pub layers: u32,
}

impl TextureArrayHeader {
    pub const SIZE: usize = 20;

    pub fn new(width: u32, height: u32, layers: u32) -> Self {
        Self {
            version: TEXTURE_ARRAY_VERSION,
            format: TextureArrayFormat::Rgba16F,
            width,
            height,
            layers,
        }
    }

    /// Size of the texel data following the header; `None` if it overflows `usize`
    pub fn data_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.layers as usize)?
            .checked_mul(self.format.bytes_per_texel())
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&TEXTURE_ARRAY_MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&(self.format as u16).to_le_bytes());
        bytes[8..12].copy_from_slice(&self.width.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.height.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.layers.to_le_bytes());
        bytes
    }

    /// Parse a header; `None` on short input, bad magic or unknown format
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE || bytes[0..4] != TEXTURE_ARRAY_MAGIC {
            return None;
        }
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Some(Self {
            version: u16::from_le_bytes([bytes[4], bytes[5]]),
            format: TextureArrayFormat::from_u16(u16::from_le_bytes([bytes[6], bytes[7]]))?,
            width: u32_at(8),
            height: u32_at(12),
            layers: u32_at(16),
        })
    }
}

/// Serialize `array` as a `.vatarr` byte stream
pub fn encode_texture_array(array: &TextureArray) -> Vec<u8> {
    let header = TextureArrayHeader::new(array.side(), array.side(), array.layer_count() as u32);
    let data_size = header.data_size().unwrap_or_default();
    let mut bytes = Vec::with_capacity(TextureArrayHeader::SIZE + data_size);
    bytes.extend_from_slice(&header.to_bytes());
    for slice in array.slices() {
        for &value in slice.as_f32() {
            bytes.extend_from_slice(&f16::from_f32(value).to_le_bytes());
        }
    }
    bytes
}

/// Decode a `.vatarr` byte stream
pub fn read_texture_array(bytes: &[u8]) -> BakeResult<TextureArray> {
    let header = TextureArrayHeader::from_bytes(bytes).ok_or_else(|| {
        BakeError::InvalidTextureArray("missing or malformed header".to_string())
    })?;
    if header.version != TEXTURE_ARRAY_VERSION {
        return Err(BakeError::InvalidTextureArray(format!(
            "unsupported version {}",
            header.version
        )));
    }
    if header.width != header.height {
        return Err(BakeError::InvalidTextureArray(format!(
            "slices must be square, got {}x{}",
            header.width, header.height
        )));
    }
    if header.width == 0 || !header.width.is_power_of_two() {
        return Err(BakeError::InvalidTextureArray(format!(
            "slice side {} is not a power of two",
            header.width
        )));
    }
    if header.layers == 0 {
        return Err(BakeError::InvalidTextureArray("no layers".to_string()));
    }
    let data_size = header.data_size().ok_or_else(|| {
        BakeError::InvalidTextureArray(format!(
            "{}x{}x{} texels exceed addressable memory",
            header.width, header.height, header.layers
        ))
    })?;
    let data = &bytes[TextureArrayHeader::SIZE..];
    if data.len() != data_size {
        return Err(BakeError::InvalidTextureArray(format!(
            "expected {} bytes of texel data, found {}",
            data_size,
            data.len()
        )));
    }

    let side = header.width;
    let mut array = TextureArray::new(side, header.layers as usize);
    let half_at = |at: usize| f16::from_le_bytes([data[at], data[at + 1]]).to_f32();
    let slice_bytes = side as usize * side as usize * 8;
    for layer in 0..header.layers as usize {
        let slice = array.slice_mut(layer);
        for y in 0..side {
            for x in 0..side {
                let at = layer * slice_bytes + (y as usize * side as usize + x as usize) * 8;
                slice.set(
                    x,
                    y,
                    Pixel::new(half_at(at), half_at(at + 2), half_at(at + 4), half_at(at + 6)),
                );
            }
        }
    }
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(TextureArrayHeader::SIZE, 20);
        assert_eq!(TextureArrayHeader::new(64, 64, 3).to_bytes().len(), 20);
    }

    #[test]
    fn test_header_parsing() {
        let data = [
            b'V', b'A', b'T', b'A', //
            0x01, 0x00, // version 1
            0x01, 0x00, // RGBA16F
            0x40, 0x00, 0x00, 0x00, // width 64
            0x40, 0x00, 0x00, 0x00, // height 64
            0x03, 0x00, 0x00, 0x00, // 3 layers
        ];
        let header = TextureArrayHeader::from_bytes(&data).unwrap();
        assert_eq!(header, TextureArrayHeader::new(64, 64, 3));
        assert_eq!(header.data_size(), Some(64 * 64 * 3 * 8));
        assert_eq!(TextureArrayHeader::new(u32::MAX, u32::MAX, u32::MAX).data_size(), None);
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let mut bytes = TextureArrayHeader::new(4, 4, 1).to_bytes();
        bytes[0] = b'X';
        assert!(TextureArrayHeader::from_bytes(&bytes).is_none());
        assert!(TextureArrayHeader::from_bytes(&bytes[..10]).is_none());
    }

    #[test]
    fn test_encode_and_read_preserve_slices() {
        let mut array = TextureArray::new(2, 2);
        array.slice_mut(0).set(1, 0, Pixel::new(0.5, 0.25, 1.5, 1.0));
        array.slice_mut(1).set(0, 1, Pixel::new(-0.5, 0.0, 0.75, 1.0));

        let bytes = encode_texture_array(&array);
        assert_eq!(bytes.len(), TextureArrayHeader::SIZE + 2 * 2 * 2 * 8);

        let decoded = read_texture_array(&bytes).unwrap();
        assert_eq!(decoded.layer_count(), 2);
        assert_eq!(decoded.slice(0).get(1, 0), Pixel::new(0.5, 0.25, 1.5, 1.0));
        assert_eq!(decoded.slice(1).get(0, 1), Pixel::new(-0.5, 0.0, 0.75, 1.0));
        assert_eq!(decoded.slice(1).get(1, 1), Pixel::CLEAR);
    }

    #[test]
    fn test_read_rejects_truncated_data() {
        let array = TextureArray::new(4, 1);
        let bytes = encode_texture_array(&array);
        assert!(matches!(
            read_texture_array(&bytes[..bytes.len() - 1]),
            Err(BakeError::InvalidTextureArray(_))
        ));
    }

    #[test]
    fn test_read_rejects_oversized_header() {
        let bytes = TextureArrayHeader::new(u32::MAX, u32::MAX, u32::MAX).to_bytes();
        assert!(matches!(
            read_texture_array(&bytes),
            Err(BakeError::InvalidTextureArray(_))
        ));

        let bytes = TextureArrayHeader::new(1 << 31, 1 << 31, u32::MAX).to_bytes();
        assert!(matches!(
            read_texture_array(&bytes),
            Err(BakeError::InvalidTextureArray(_))
        ));
    }

    #[test]
    fn test_read_rejects_empty_slices() {
        // Zero-sized slices would pass the length check with no texel data at all
        let bytes = TextureArrayHeader::new(0, 0, u32::MAX).to_bytes();
        assert!(matches!(
            read_texture_array(&bytes),
            Err(BakeError::InvalidTextureArray(_))
        ));

        let bytes = TextureArrayHeader::new(4, 4, 0).to_bytes();
        assert!(matches!(
            read_texture_array(&bytes),
            Err(BakeError::InvalidTextureArray(_))
        ));
    }

    #[test]
    fn test_read_rejects_non_power_of_two_side() {
        let header = TextureArrayHeader::new(3, 3, 1);
        let mut bytes = header.to_bytes().to_vec();
        bytes.resize(TextureArrayHeader::SIZE + 3 * 3 * 8, 0);
        assert!(matches!(
            read_texture_array(&bytes),
            Err(BakeError::InvalidTextureArray(_))
        ));
    }
}
