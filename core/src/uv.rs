//! UV index stamping
//!
//! Produces a copy of a mesh whose chosen UV channel holds each vertex's
//! index in U, so a vertex shader can look its row up in a baked texture.

use glam::Vec2;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::UvStampConfig;
use crate::error::BakeResult;
use crate::mesh::{MeshData, MeshSource, UvChannel};
use crate::output::MeshWriter;
use crate::prompt::{SavePrompt, SaveRequest};

/// Deep-copy `mesh` with vertex indices stamped into `config.channel`
///
/// Positions are scaled, indices, normals and UV0 are copied unchanged, and
/// vertex `i` receives `(i, 0)` on the target channel.
pub fn stamp_uv_indices<M: MeshSource + ?Sized>(mesh: &M, config: &UvStampConfig) -> MeshData {
    let positions = mesh
        .positions()
        .iter()
        .map(|&p| p * config.scale)
        .collect();
    let mut stamped = MeshData::new(mesh.name(), positions, mesh.indices().to_vec());
    if let Some(normals) = mesh.normals() {
        stamped.normals = normals.to_vec();
    }
    if let Some(uv) = mesh.uv_channel(UvChannel::Uv0) {
        stamped.uvs[UvChannel::Uv0.index()] = uv.to_vec();
    }
    stamped.uvs[config.channel.index()] = (0..mesh.vertex_count())
        .map(|i| Vec2::new(i as f32, 0.0))
        .collect();
    stamped
}

/// Stamp UV indices and save the new mesh
///
/// The save prompt defaults to `"{mesh} UV"`. An already populated target
/// channel is overwritten. Returns the written path, or `None` when declined.
pub fn apply_uv_to_channel<M, P, W>(
    mesh: &M,
    config: &UvStampConfig,
    prompt: &mut P,
    mut writer: W,
) -> BakeResult<Option<PathBuf>>
where
    M: MeshSource + ?Sized,
    P: SavePrompt + ?Sized,
    W: MeshWriter,
{
    config.validate()?;
    let request = SaveRequest::new(
        "Save UV Mesh",
        format!("{} UV", mesh.name()),
        writer.extension(),
        "Please save your UV mesh",
    );
    let Some(path) = prompt.request_path(&request) else {
        debug!("Save of UV mesh '{}' cancelled", mesh.name());
        return Ok(None);
    };

    if mesh.has_uv(config.channel) {
        warn!("Overwriting existing {} of '{}'", config.channel, mesh.name());
    }
    let stamped = stamp_uv_indices(mesh, config);
    writer.write_mesh(&path, &stamped)?;
    info!(
        "Stamped {} vertex indices into {} of '{}', saved to {}",
        stamped.vertex_count(),
        config.channel,
        mesh.name(),
        path.display()
    );
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::RecordingWriter;
    use crate::prompt::FixedPrompt;
    use glam::Vec3;

    fn quad() -> MeshData {
        MeshData::new(
            "Quad",
            vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(-1.0, 0.0, 1.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
        .with_normals(vec![Vec3::Y; 4])
        .with_uv(
            UvChannel::Uv0,
            vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y],
        )
        .with_uv(UvChannel::Uv3, vec![Vec2::splat(0.5); 4])
    }

    #[test]
    fn test_stamp_indices_in_vertex_order() {
        let source = quad();
        let config = UvStampConfig {
            channel: UvChannel::Uv1,
            scale: 2.0,
        };
        let stamped = stamp_uv_indices(&source, &config);

        let uv = stamped.uv_channel(UvChannel::Uv1).unwrap();
        assert_eq!(uv.len(), 4);
        for (i, value) in uv.iter().enumerate() {
            assert_eq!(*value, Vec2::new(i as f32, 0.0));
        }
        assert_eq!(stamped.positions[1], Vec3::new(2.0, 0.0, -2.0));
        assert_eq!(stamped.indices, source.indices);
        assert_eq!(stamped.normals, source.normals);
        assert_eq!(stamped.uvs[0], source.uvs[0]);
        // Only UV0 and the target channel are carried over
        assert!(!stamped.has_uv(UvChannel::Uv3));
    }

    #[test]
    fn test_stamp_overwrites_populated_channel() {
        let config = UvStampConfig {
            channel: UvChannel::Uv0,
            scale: 1.0,
        };
        let stamped = stamp_uv_indices(&quad(), &config);
        assert_eq!(stamped.uvs[0][3], Vec2::new(3.0, 0.0));
        assert_eq!(stamped.positions, quad().positions);
    }

    #[test]
    fn test_stamp_scalar_index_is_unbounded() {
        let positions = vec![Vec3::ZERO; 300];
        let mesh = MeshData::new("Strip", positions, vec![]);
        let stamped = stamp_uv_indices(&mesh, &UvStampConfig::default());
        assert_eq!(stamped.uvs[1][299], Vec2::new(299.0, 0.0));
        assert!(stamped.normals().is_none());
    }

    #[test]
    fn test_apply_writes_new_mesh() {
        let source = quad();
        let mut prompt = FixedPrompt::accept("Quad UV.mesh");
        let mut writer = RecordingWriter::new();
        let path = apply_uv_to_channel(&source, &UvStampConfig::default(), &mut prompt, &mut writer)
            .unwrap()
            .unwrap();

        assert_eq!(path, PathBuf::from("Quad UV.mesh"));
        assert_eq!(prompt.requests()[0].default_name, "Quad UV");
        assert_eq!(prompt.requests()[0].extension, "mesh");
        assert_eq!(writer.meshes.len(), 1);
        // Source is untouched
        assert!(!source.has_uv(UvChannel::Uv1));
    }

    #[test]
    fn test_apply_cancel_writes_nothing() {
        let mut writer = RecordingWriter::new();
        let result = apply_uv_to_channel(
            &quad(),
            &UvStampConfig::default(),
            &mut FixedPrompt::cancel(),
            &mut writer,
        )
        .unwrap();
        assert!(result.is_none());
        assert!(writer.is_empty());
    }
}
