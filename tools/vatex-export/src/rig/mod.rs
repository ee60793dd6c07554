//! glTF rig source (glTF/GLB -> skinned vertex snapshots)
//!
//! A [`GltfRig`] holds everything needed to pose the first skinned mesh of a
//! document: rest transforms, joint bindings, bind-pose vertices and clips.
//! [`GltfInstance`] evaluates it for the bakers.

mod keyframes;
mod skinning;

use anyhow::{Context, Result, bail};
use glam::{Mat4, Quat, Vec3};
use std::path::Path;
use vatex_core::{AnimationEvaluator, BakeResult, ClipInfo, Rig, RigComponents};

use keyframes::Clip;
use skinning::{Hierarchy, SkinnedVertices};

/// Local translation, rotation and scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl NodeTransform {
    pub(crate) const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    fn from_node(node: &gltf::Node) -> Self {
        let (translation, rotation, scale) = node.transform().decomposed();
        Self {
            translation: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from_array(scale),
        }
    }

    pub(crate) fn to_mat4(self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Joints of the skin bound to the skinned mesh
#[derive(Debug, Clone)]
struct SkinBinding {
    joints: Vec<usize>,
    inverse_binds: Vec<Mat4>,
}

/// An animated skinned mesh loaded from glTF
#[derive(Debug, Clone)]
pub struct GltfRig {
    name: String,
    hierarchy: Hierarchy,
    rest: Vec<NodeTransform>,
    skin: Option<SkinBinding>,
    vertices: Option<SkinnedVertices>,
    clips: Vec<Clip>,
    animation_count: usize,
    root_rotation: Quat,
}

impl GltfRig {
    /// Load a glTF/GLB file; the rig is named after the file stem
    pub fn load(path: &Path) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import(path).with_context(|| format!("Failed to load glTF: {:?}", path))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Rig".to_string());
        Self::from_document(name, &document, &buffers)
            .with_context(|| format!("Failed to read rig from {:?}", path))
    }

    /// Load from in-memory GLB/glTF bytes
    pub fn from_slice(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import_slice(bytes).context("Failed to parse glTF data")?;
        Self::from_document(name.into(), &document, &buffers)
    }

    pub fn from_document(
        name: String,
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
    ) -> Result<Self> {
        let children: Vec<Vec<usize>> = document
            .nodes()
            .map(|node| node.children().map(|child| child.index()).collect())
            .collect();
        let hierarchy = Hierarchy::new(&children);
        let rest: Vec<NodeTransform> = document.nodes().map(|n| NodeTransform::from_node(&n)).collect();

        let skinned_node = document
            .nodes()
            .find(|node| node.mesh().is_some() && node.skin().is_some());

        let (skin, vertices) = match &skinned_node {
            Some(node) => {
                let skin = node.skin().context("Skinned node lost its skin")?;
                let mesh = node.mesh().context("Skinned node lost its mesh")?;
                let binding = read_skin(&skin, buffers)?;
                let vertices = read_skinned_vertices(&mesh, binding.joints.len(), buffers)?;
                (Some(binding), Some(vertices))
            }
            None => (None, None),
        };

        let mut clips = Vec::new();
        for animation in document.animations() {
            let clip = Clip::read(&animation, buffers)?;
            if clip.duration > 0.0 {
                clips.push(clip);
            } else {
                tracing::debug!("Ignoring animation '{}' with zero duration", clip.name);
            }
        }

        let root_rotation = first_child_rotation(document);
        tracing::debug!(
            "Loaded rig '{}': {} nodes, {} vertices, {} clips",
            name,
            rest.len(),
            vertices.as_ref().map(SkinnedVertices::len).unwrap_or(0),
            clips.len()
        );

        Ok(Self {
            name,
            hierarchy,
            rest,
            skin,
            vertices,
            clips,
            animation_count: document.animations().count(),
            root_rotation,
        })
    }
}

/// Joint node indices and inverse bind matrices of `skin`
fn read_skin(skin: &gltf::Skin, buffers: &[gltf::buffer::Data]) -> Result<SkinBinding> {
    let joints: Vec<usize> = skin.joints().map(|joint| joint.index()).collect();
    let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
    let inverse_binds: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
        Some(iter) => iter.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
        None => vec![Mat4::IDENTITY; joints.len()],
    };
    if inverse_binds.len() < joints.len() {
        bail!(
            "Skin '{}' has {} joints but only {} inverse bind matrices",
            skin.name().unwrap_or("unnamed"),
            joints.len(),
            inverse_binds.len()
        );
    }
    Ok(SkinBinding {
        joints,
        inverse_binds,
    })
}

/// Bind positions and influences of every primitive of `mesh`, in order
fn read_skinned_vertices(
    mesh: &gltf::Mesh,
    joint_count: usize,
    buffers: &[gltf::buffer::Data],
) -> Result<SkinnedVertices> {
    let mut vertices = SkinnedVertices::default();
    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("No positions in skinned mesh")?
            .map(Vec3::from_array)
            .collect();
        let count = positions.len();

        let joints: Vec<[u16; 4]> = reader
            .read_joints(0)
            .map(|iter| iter.into_u16().collect())
            .unwrap_or_default();
        let weights: Vec<[f32; 4]> = reader
            .read_weights(0)
            .map(|iter| iter.into_f32().collect())
            .unwrap_or_default();

        if joints.len() == count && weights.len() == count {
            if let Some((vertex, set)) = joints
                .iter()
                .enumerate()
                .find(|(_, set)| set.iter().any(|&j| j as usize >= joint_count))
            {
                bail!(
                    "Joint indices {:?} at vertex {} exceed skin joint count {}",
                    set,
                    vertex,
                    joint_count
                );
            }
            vertices.joints.extend(joints);
            vertices.weights.extend(weights);
        } else {
            tracing::warn!(
                "Primitive {} of mesh '{}' has no complete skinning data, its vertices stay static",
                primitive.index(),
                mesh.name().unwrap_or("unnamed")
            );
            vertices.joints.extend(std::iter::repeat_n([0; 4], count));
            vertices.weights.extend(std::iter::repeat_n([0.0; 4], count));
        }
        vertices.positions.extend(positions);
    }
    Ok(vertices)
}

/// Local rotation of the first child of the first scene root
fn first_child_rotation(document: &gltf::Document) -> Quat {
    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        return Quat::IDENTITY;
    };
    let Some(root) = scene.nodes().next() else {
        return Quat::IDENTITY;
    };
    let node = root.children().next().unwrap_or(root);
    NodeTransform::from_node(&node).rotation
}

impl Rig for GltfRig {
    type Instance<'a> = GltfInstance<'a>;

    fn name(&self) -> &str {
        &self.name
    }

    fn components(&self) -> RigComponents {
        RigComponents {
            skinned_mesh: self.vertices.is_some(),
            animator: self.skin.as_ref().is_some_and(|skin| !skin.joints.is_empty()),
            controller: self.animation_count > 0,
        }
    }

    fn clips(&self) -> Vec<ClipInfo> {
        self.clips
            .iter()
            .map(|clip| ClipInfo::new(clip.name.clone(), clip.duration))
            .collect()
    }

    fn vertex_count(&self) -> usize {
        self.vertices.as_ref().map(SkinnedVertices::len).unwrap_or(0)
    }

    fn root_rotation(&self) -> Quat {
        self.root_rotation
    }

    fn instantiate(&self) -> BakeResult<GltfInstance<'_>> {
        let (Some(skin), Some(vertices)) = (&self.skin, &self.vertices) else {
            return Err(anyhow::anyhow!("Rig '{}' has no skinned mesh", self.name).into());
        };
        let mut instance = GltfInstance {
            rig: self,
            skin,
            vertices,
            clip: None,
            time: 0.0,
            locals: self.rest.clone(),
            globals: Vec::with_capacity(self.hierarchy.len()),
            joint_matrices: Vec::with_capacity(skin.joints.len()),
        };
        instance.evaluate();
        Ok(instance)
    }
}

/// Posable working copy of a [`GltfRig`]
///
/// Holds its own pose buffers; the rig itself is never mutated.
pub struct GltfInstance<'a> {
    rig: &'a GltfRig,
    skin: &'a SkinBinding,
    vertices: &'a SkinnedVertices,
    clip: Option<&'a Clip>,
    time: f32,
    locals: Vec<NodeTransform>,
    globals: Vec<Mat4>,
    joint_matrices: Vec<Mat4>,
}

impl GltfInstance<'_> {
    /// Local time of the playing clip
    pub fn time(&self) -> f32 {
        self.time
    }

    fn evaluate(&mut self) {
        self.locals.clone_from(&self.rig.rest);
        if let Some(clip) = self.clip {
            for channel in &clip.channels {
                if let Some(local) = self.locals.get_mut(channel.node) {
                    channel.apply(self.time, local);
                }
            }
        }
        self.rig.hierarchy.globals(&self.locals, &mut self.globals);

        self.joint_matrices.clear();
        self.joint_matrices.extend(
            self.skin
                .joints
                .iter()
                .zip(&self.skin.inverse_binds)
                .map(|(&joint, inverse_bind)| self.globals[joint] * *inverse_bind),
        );
    }
}

impl AnimationEvaluator for GltfInstance<'_> {
    fn play(&mut self, clip: &str) -> Result<()> {
        let found = self
            .rig
            .clips
            .iter()
            .find(|c| c.name == clip)
            .with_context(|| format!("Clip '{}' not found on rig '{}'", clip, self.rig.name))?;
        self.clip = Some(found);
        self.time = 0.0;
        self.evaluate();
        Ok(())
    }

    fn advance(&mut self, dt: f32) -> Result<()> {
        self.time += dt;
        self.evaluate();
        Ok(())
    }

    fn snapshot(&mut self, out: &mut Vec<Vec3>) -> Result<()> {
        self.vertices.skin(&self.joint_matrices, out);
        Ok(())
    }
}
