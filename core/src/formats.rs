//! Binary container formats written by the baker

mod texture_array;

pub use texture_array::{
    TextureArrayFormat, TextureArrayHeader, encode_texture_array, read_texture_array,
};
