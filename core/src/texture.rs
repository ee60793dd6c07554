//! In-memory texel buffers produced by the bake orchestrators

use bytemuck::{Pod, Zeroable};

use crate::layout::{TexelOrder, TextureLayout};

/// One RGBA texel
///
/// RGB carry the remapped x/y/z position, A marks a written texel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Pixel {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Pixel {
    /// Transparent black, the value of every never-written texel
    pub const CLEAR: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// True when any color channel lies outside `[0, 1]`
    pub fn is_out_of_range(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .any(|c| !(0.0..=1.0).contains(c))
    }

    /// 8-bit channels, clamped to `[0, 1]` first
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// Row-major texel storage for one texture (or one array slice)
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBuffer {
    layout: TextureLayout,
    pixels: Vec<Pixel>,
}

impl TextureBuffer {
    /// Allocate a buffer cleared to [`Pixel::CLEAR`]
    pub fn new(layout: TextureLayout) -> Self {
        Self {
            layout,
            pixels: vec![Pixel::CLEAR; layout.pixel_count() as usize],
        }
    }

    pub fn layout(&self) -> TextureLayout {
        self.layout
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Reset every texel to [`Pixel::CLEAR`], keeping the allocation
    pub fn clear(&mut self) {
        self.pixels.fill(Pixel::CLEAR);
    }

    /// Reallocate for a new layout, clearing all texels
    pub fn reset(&mut self, layout: TextureLayout) {
        self.layout = layout;
        self.pixels.clear();
        self.pixels
            .resize(layout.pixel_count() as usize, Pixel::CLEAR);
    }

    pub fn get(&self, x: u32, y: u32) -> Pixel {
        self.pixels[self.offset(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, pixel: Pixel) {
        let offset = self.offset(x, y);
        self.pixels[offset] = pixel;
    }

    /// Store the `index`-th sample following `order`
    pub fn put_sample(&mut self, index: usize, order: TexelOrder, pixel: Pixel) {
        let (x, y) = self.layout.texel(index, order);
        self.set(x, y, pixel);
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Channel values as a flat `f32` slice (RGBA, row-major)
    pub fn as_f32(&self) -> &[f32] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Number of texels with a non-zero alpha marker
    pub fn written_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.a > 0.0).count()
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.layout.width && y < self.layout.height);
        y as usize * self.layout.width as usize + x as usize
    }
}

/// Same-sized slices, one per clip, for the texture-array bake
#[derive(Debug, Clone, PartialEq)]
pub struct TextureArray {
    side: u32,
    slices: Vec<TextureBuffer>,
}

impl TextureArray {
    /// Allocate `layers` cleared square slices
    pub fn new(side: u32, layers: usize) -> Self {
        let layout = TextureLayout::square(side);
        Self {
            side,
            slices: (0..layers).map(|_| TextureBuffer::new(layout)).collect(),
        }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn layer_count(&self) -> usize {
        self.slices.len()
    }

    pub fn slice(&self, layer: usize) -> &TextureBuffer {
        &self.slices[layer]
    }

    pub fn slice_mut(&mut self, layer: usize) -> &mut TextureBuffer {
        &mut self.slices[layer]
    }

    pub fn slices(&self) -> &[TextureBuffer] {
        &self.slices
    }
}
