//! Static mesh bake
//!
//! Writes the rest positions of a mesh into a square texture, one texel per
//! vertex. Runs in a single call.

use std::path::PathBuf;
use tracing::{debug, info};

use super::OutputPaths;
use crate::config::MeshBakeConfig;
use crate::diagnostics::{Diagnostic, Ledger};
use crate::encode::PixelEncoder;
use crate::error::BakeResult;
use crate::layout::{TextureLayout, square_layout};
use crate::mesh::MeshSource;
use crate::output::TextureWriter;
use crate::prompt::{SavePrompt, SaveRequest};
use crate::sampler::VertexTransform;
use crate::texture::TextureBuffer;

/// Outcome of a mesh bake
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBakeReport {
    pub path: PathBuf,
    pub layout: TextureLayout,
    pub vertex_count: usize,
}

/// Bake `mesh` to a texture
///
/// The save prompt defaults to `"{mesh} Baked"`. Declining returns
/// `Ok(None)` without touching `ledger`.
pub fn bake_mesh<M, P, W>(
    mesh: &M,
    config: &MeshBakeConfig,
    prompt: &mut P,
    mut writer: W,
    ledger: &mut Ledger,
) -> BakeResult<Option<MeshBakeReport>>
where
    M: MeshSource + ?Sized,
    P: SavePrompt + ?Sized,
    W: TextureWriter,
{
    config.validate()?;
    let vertex_count = mesh.vertex_count();
    let layout = square_layout(vertex_count)?;

    let extension = config.color.extension();
    let request = SaveRequest::new(
        "Save Mesh Texture",
        format!("{} Baked", mesh.name()),
        extension,
        "Please save your baked mesh texture",
    );
    let Some(chosen) = prompt.request_path(&request) else {
        debug!("Save of mesh '{}' cancelled", mesh.name());
        return Ok(None);
    };
    ledger.set_condition(Diagnostic::PixelOutOfRange, false);

    let transform = VertexTransform::scale(config.scale);
    let encoder = PixelEncoder::new(config.color);
    let mut texture = TextureBuffer::new(layout);
    for (index, &position) in mesh.positions().iter().enumerate() {
        let pixel = encoder.encode(transform.apply(position), ledger);
        texture.put_sample(index, config.texel_order, pixel);
    }

    let path = OutputPaths::new(chosen).mesh_texture(vertex_count, layout, extension);
    writer.write_texture(&path, &texture, config.color)?;
    info!(
        "Baked mesh '{}' ({} vertices, {}) to {}",
        mesh.name(),
        vertex_count,
        layout,
        path.display()
    );

    Ok(Some(MeshBakeReport {
        path,
        layout,
        vertex_count,
    }))
}
