//! GLB writing
//!
//! [`GlbBuffer`] packs attribute data into a single binary chunk and records
//! the matching buffer views and accessors. [`GlbMeshWriter`] uses it to save
//! UV-stamped meshes.

use anyhow::{Result, bail};
use glam::{Vec2, Vec3};
use gltf_json as json;
use json::validation::Checked::Valid;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use vatex_core::output::ensure_parent_dir;
use vatex_core::{BakeError, BakeResult, MeshData, MeshWriter};

/// Generator string written into every asset
pub const GENERATOR: &str = concat!("vatex-export ", env!("CARGO_PKG_VERSION"));

/// Binary chunk under construction
#[derive(Debug, Default)]
pub struct GlbBuffer {
    data: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl GlbBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes as one view with one accessor over it
    pub fn push(
        &mut self,
        bytes: &[u8],
        count: usize,
        component: json::accessor::ComponentType,
        type_: json::accessor::Type,
        target: Option<json::buffer::Target>,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> json::Index<json::Accessor> {
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: bytes.len().into(),
            byte_offset: Some(offset.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: target.map(Valid),
        });
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }

        let (min, max) = match bounds {
            Some((min, max)) => (
                Some(json::Value::Array(min.into_iter().map(json::Value::from).collect())),
                Some(json::Value::Array(max.into_iter().map(json::Value::from).collect())),
            ),
            None => (None, None),
        };
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(component)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });
        json::Index::new(self.accessors.len() as u32 - 1)
    }

    /// Vertex positions, with the bounds glTF requires
    pub fn push_positions(&mut self, positions: &[Vec3]) -> json::Index<json::Accessor> {
        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), &p| (min.min(p), max.max(p)),
        );
        self.push(
            bytemuck::cast_slice(positions),
            positions.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            Some(json::buffer::Target::ArrayBuffer),
            Some((min.to_array().to_vec(), max.to_array().to_vec())),
        )
    }

    pub fn push_vec3(&mut self, values: &[Vec3], vertex: bool) -> json::Index<json::Accessor> {
        self.push(
            bytemuck::cast_slice(values),
            values.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            vertex.then_some(json::buffer::Target::ArrayBuffer),
            None,
        )
    }

    pub fn push_vec2(&mut self, values: &[Vec2]) -> json::Index<json::Accessor> {
        self.push(
            bytemuck::cast_slice(values),
            values.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec2,
            Some(json::buffer::Target::ArrayBuffer),
            None,
        )
    }

    pub fn push_indices(&mut self, indices: &[u32]) -> json::Index<json::Accessor> {
        self.push(
            bytemuck::cast_slice(indices),
            indices.len(),
            json::accessor::ComponentType::U32,
            json::accessor::Type::Scalar,
            Some(json::buffer::Target::ElementArrayBuffer),
            None,
        )
    }

    /// Move the packed views and accessors into `root` and assemble the GLB
    pub fn finish(self, mut root: json::Root) -> Result<Vec<u8>> {
        root.accessors = self.accessors;
        root.buffer_views = self.views;
        root.buffers = vec![json::Buffer {
            byte_length: self.data.len().into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }];
        assemble_glb(&root, &self.data)
    }
}

/// Empty document with a single scene over `nodes`
pub fn scene_root(nodes: Vec<json::Node>, scene_nodes: Vec<u32>) -> json::Root {
    json::Root {
        accessors: Vec::new(),
        animations: Vec::new(),
        asset: json::Asset {
            copyright: None,
            extensions: Default::default(),
            extras: Default::default(),
            generator: Some(GENERATOR.to_string()),
            min_version: None,
            version: "2.0".to_string(),
        },
        buffers: Vec::new(),
        buffer_views: Vec::new(),
        cameras: Vec::new(),
        extensions: Default::default(),
        extras: Default::default(),
        extensions_required: Vec::new(),
        extensions_used: Vec::new(),
        images: Vec::new(),
        materials: Vec::new(),
        meshes: Vec::new(),
        nodes,
        samplers: Vec::new(),
        scene: Some(json::Index::new(0)),
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            nodes: scene_nodes.into_iter().map(json::Index::new).collect(),
        }],
        skins: Vec::new(),
        textures: Vec::new(),
    }
}

/// Plain node, optionally carrying a mesh
pub fn node(name: &str, mesh: Option<u32>) -> json::Node {
    json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: mesh.map(json::Index::new),
        name: Some(name.to_string()),
        rotation: None,
        scale: None,
        translation: None,
        skin: None,
        weights: None,
    }
}

/// Single-primitive triangle mesh over `attributes`
pub fn triangle_mesh(
    name: &str,
    attributes: BTreeMap<json::validation::Checked<json::mesh::Semantic>, json::Index<json::Accessor>>,
    indices: Option<json::Index<json::Accessor>>,
) -> json::Mesh {
    json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some(name.to_string()),
        primitives: vec![json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices,
            material: None,
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        }],
        weights: None,
    }
}

/// Serialize `root` and `buffer` as a binary glTF
pub fn assemble_glb(root: &json::Root, buffer: &[u8]) -> Result<Vec<u8>> {
    let json_string = json::serialize::to_string(root)?;
    let json_bytes = json_string.as_bytes();

    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;
    let buffer_padding = (4 - (buffer.len() % 4)) % 4;
    let buffer_chunk_length = buffer.len() + buffer_padding;
    let total_length = 12 + 8 + json_chunk_length + 8 + buffer_chunk_length;
    if total_length > u32::MAX as usize {
        bail!("GLB of {} bytes exceeds the 4 GiB container limit", total_length);
    }

    let mut glb = Vec::with_capacity(total_length);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat_n(b' ', json_padding));

    glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(buffer);
    glb.extend(std::iter::repeat_n(0u8, buffer_padding));

    Ok(glb)
}

/// Encode `mesh` as a single-node GLB
///
/// Writes POSITION, NORMAL when present, every populated `TEXCOORD_n` and
/// u32 indices.
pub fn encode_mesh_glb(mesh: &MeshData) -> Result<Vec<u8>> {
    if mesh.positions.is_empty() {
        bail!("Mesh '{}' has no vertices to write", mesh.name);
    }

    let mut buffer = GlbBuffer::new();
    let mut attributes = BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        buffer.push_positions(&mesh.positions),
    );
    if !mesh.normals.is_empty() {
        attributes.insert(
            Valid(json::mesh::Semantic::Normals),
            buffer.push_vec3(&mesh.normals, true),
        );
    }
    for channel in mesh.populated_channels() {
        attributes.insert(
            Valid(json::mesh::Semantic::TexCoords(channel.index() as u32)),
            buffer.push_vec2(&mesh.uvs[channel.index()]),
        );
    }
    let indices = (!mesh.indices.is_empty()).then(|| buffer.push_indices(&mesh.indices));

    let mut root = scene_root(vec![node(&mesh.name, Some(0))], vec![0]);
    root.meshes = vec![triangle_mesh(&mesh.name, attributes, indices)];
    buffer.finish(root)
}

/// Writes meshes as `.glb` files
#[derive(Debug, Default)]
pub struct GlbMeshWriter {
    written: Vec<PathBuf>,
}

impl GlbMeshWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl MeshWriter for GlbMeshWriter {
    fn extension(&self) -> &str {
        "glb"
    }

    fn write_mesh(&mut self, path: &Path, mesh: &MeshData) -> BakeResult<()> {
        let glb = encode_mesh_glb(mesh)?;
        ensure_parent_dir(path)?;
        fs::write(path, glb).map_err(|source| BakeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Wrote mesh {}", path.display());
        self.written.push(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vatex_core::UvChannel;

    fn triangle() -> MeshData {
        MeshData::new(
            "Tri",
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
        )
        .with_normals(vec![Vec3::Z; 3])
        .with_uv(UvChannel::Uv0, vec![Vec2::ZERO, Vec2::X, Vec2::Y])
        .with_uv(UvChannel::Uv2, vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)])
    }

    #[test]
    fn test_glb_header_and_chunks() {
        let glb = encode_mesh_glb(&triangle()).unwrap();
        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(glb[4..8].try_into().unwrap()), 2);
        assert_eq!(
            u32::from_le_bytes(glb[8..12].try_into().unwrap()) as usize,
            glb.len()
        );
        assert_eq!(&glb[16..20], b"JSON");
        assert_eq!(glb.len() % 4, 0);
    }

    #[test]
    fn test_mesh_round_trips_through_gltf() {
        let glb = encode_mesh_glb(&triangle()).unwrap();
        let (document, buffers, _) = gltf::import_slice(&glb).unwrap();

        let mesh = document.meshes().next().unwrap();
        assert_eq!(mesh.name(), Some("Tri"));
        let primitive = mesh.primitives().next().unwrap();
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader.read_positions().unwrap().collect();
        assert_eq!(positions[1], [1.0, 0.0, 0.0]);
        let stamped: Vec<[f32; 2]> = reader.read_tex_coords(2).unwrap().into_f32().collect();
        assert_eq!(stamped[2], [2.0, 0.0]);
        assert!(reader.read_tex_coords(1).is_none());
        let indices: Vec<u32> = reader.read_indices().unwrap().into_u32().collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mesh = MeshData::new("Empty", vec![], vec![]);
        assert!(encode_mesh_glb(&mesh).is_err());
    }

    #[test]
    fn test_writer_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/Tri UV.glb");
        let mut writer = GlbMeshWriter::new();
        writer.write_mesh(&path, &triangle()).unwrap();
        assert!(path.exists());
        assert_eq!(writer.written(), &[path]);
        assert_eq!(writer.extension(), "glb");
    }
}
