//! Output writers
//!
//! Orchestrators hand finished buffers to a [`TextureWriter`] (and UV-stamped
//! meshes to a [`MeshWriter`]). [`FileTextureWriter`] materializes textures
//! with the `image` crate: PNG for LDR, OpenEXR for HDR.

use image::{ExtendedColorType, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::encode::ColorEncoding;
use crate::error::{BakeError, BakeResult};
use crate::formats::encode_texture_array;
use crate::mesh::MeshData;
use crate::texture::{TextureArray, TextureBuffer};

/// Sink for baked textures
pub trait TextureWriter {
    /// Write one texture in the container selected by `encoding`
    fn write_texture(
        &mut self,
        path: &Path,
        texture: &TextureBuffer,
        encoding: ColorEncoding,
    ) -> BakeResult<()>;

    /// Write a float texture array
    fn write_array(&mut self, path: &Path, array: &TextureArray) -> BakeResult<()>;
}

impl<W: TextureWriter + ?Sized> TextureWriter for &mut W {
    fn write_texture(
        &mut self,
        path: &Path,
        texture: &TextureBuffer,
        encoding: ColorEncoding,
    ) -> BakeResult<()> {
        (**self).write_texture(path, texture, encoding)
    }

    fn write_array(&mut self, path: &Path, array: &TextureArray) -> BakeResult<()> {
        (**self).write_array(path, array)
    }
}

/// Sink for UV-stamped meshes
pub trait MeshWriter {
    /// Extension of the files this writer produces, without the dot
    fn extension(&self) -> &str;

    fn write_mesh(&mut self, path: &Path, mesh: &MeshData) -> BakeResult<()>;
}

impl<W: MeshWriter + ?Sized> MeshWriter for &mut W {
    fn extension(&self) -> &str {
        (**self).extension()
    }

    fn write_mesh(&mut self, path: &Path, mesh: &MeshData) -> BakeResult<()> {
        (**self).write_mesh(path, mesh)
    }
}

/// Create the parent directory of `path` if needed
pub fn ensure_parent_dir(path: &Path) -> BakeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| BakeError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Writes textures to disk
///
/// Texel `(x, y)` becomes image pixel `(x, y)` counted from the top-left.
#[derive(Debug, Default)]
pub struct FileTextureWriter {
    written: Vec<PathBuf>,
}

impl FileTextureWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl TextureWriter for FileTextureWriter {
    fn write_texture(
        &mut self,
        path: &Path,
        texture: &TextureBuffer,
        encoding: ColorEncoding,
    ) -> BakeResult<()> {
        ensure_parent_dir(path)?;
        let result = match encoding {
            ColorEncoding::Ldr => {
                let bytes: Vec<u8> = texture.pixels().iter().flat_map(|p| p.to_rgba8()).collect();
                image::save_buffer_with_format(
                    path,
                    &bytes,
                    texture.width(),
                    texture.height(),
                    ExtendedColorType::Rgba8,
                    ImageFormat::Png,
                )
            }
            ColorEncoding::Hdr => image::save_buffer_with_format(
                path,
                bytemuck::cast_slice(texture.as_f32()),
                texture.width(),
                texture.height(),
                ExtendedColorType::Rgba32F,
                ImageFormat::OpenExr,
            ),
        };
        result.map_err(|source| BakeError::Image {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Wrote {} texture {}", encoding, path.display());
        self.written.push(path.to_path_buf());
        Ok(())
    }

    fn write_array(&mut self, path: &Path, array: &TextureArray) -> BakeResult<()> {
        ensure_parent_dir(path)?;
        fs::write(path, encode_texture_array(array)).map_err(|source| BakeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(
            "Wrote texture array {} ({} slices of {}x{})",
            path.display(),
            array.layer_count(),
            array.side(),
            array.side()
        );
        self.written.push(path.to_path_buf());
        Ok(())
    }
}
