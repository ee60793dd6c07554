//! Programmatic GLB generation for integration tests.
//!
//! Generates a skinned two-bone strip with:
//! - 8 vertices, the bottom ring on "Hip" and the top ring on "Tip"
//! - node tree Root -> Hip -> Tip plus a "Body" mesh node
//! - "Wave", "Idle" and "Turn" clips

#![allow(dead_code)]

mod binary_packing;
mod strip;

pub use strip::{SEGMENT_HEIGHT, VERTEX_COUNT, rest_position};

use gltf_json as json;
use json::validation::Checked::Valid;
use std::collections::BTreeMap;
use binary_packing::SkinPacking;
use strip::ClipData;
use vatex_export::glb::{GlbBuffer, node, scene_root, triangle_mesh};

const ROOT_NODE: u32 = 0;
const HIP_NODE: u32 = 1;
const TIP_NODE: u32 = 2;
const BODY_NODE: u32 = 3;

/// Generate the complete skinned strip as GLB bytes
pub fn generate_skinned_glb() -> Vec<u8> {
    build(strip::create_clips())
}

/// Same strip with every clip removed
pub fn generate_static_glb() -> Vec<u8> {
    build(Vec::new())
}

/// Strip whose only clip ("Blink", 0.02 s) is shorter than one frame at 30 fps
pub fn generate_blink_glb() -> Vec<u8> {
    build(vec![strip::blink_clip()])
}

fn build(clips: Vec<ClipData>) -> Vec<u8> {
    let mesh = strip::create_mesh();
    let mut buffer = GlbBuffer::new();

    let mut attributes = BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        buffer.push_positions(&mesh.positions),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Normals),
        buffer.push_vec3(&mesh.normals, true),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Joints(0)),
        buffer.push_joints(&mesh.joints),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Weights(0)),
        buffer.push_weights(&mesh.weights),
    );
    let indices = buffer.push_indices(&mesh.indices);
    let inverse_binds = buffer.push_matrices(&strip::inverse_bind_matrices());

    let mut animations = Vec::new();
    for clip in clips {
        let mut samplers = Vec::new();
        let mut channels = Vec::new();

        for (target, times, values) in &clip.translations {
            let input = buffer.push_times(times);
            let output = buffer.push_translations(values);
            push_channel(
                &mut samplers,
                &mut channels,
                (input, output),
                *target,
                json::animation::Property::Translation,
            );
        }
        for (target, times, values) in &clip.rotations {
            let input = buffer.push_times(times);
            let output = buffer.push_rotations(values);
            push_channel(
                &mut samplers,
                &mut channels,
                (input, output),
                *target,
                json::animation::Property::Rotation,
            );
        }

        animations.push(json::Animation {
            channels,
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(clip.name.to_string()),
            samplers,
        });
    }

    let mut root_node = node("Root", None);
    root_node.children = Some(vec![json::Index::new(HIP_NODE)]);
    let mut hip = node("Hip", None);
    hip.children = Some(vec![json::Index::new(TIP_NODE)]);
    let mut tip = node("Tip", None);
    tip.translation = Some([0.0, SEGMENT_HEIGHT, 0.0]);
    let mut body = node("Body", Some(0));
    body.skin = Some(json::Index::new(0));

    let mut root = scene_root(vec![root_node, hip, tip, body], vec![ROOT_NODE, BODY_NODE]);
    root.meshes = vec![triangle_mesh("Strip", attributes, Some(indices))];
    root.skins = vec![json::Skin {
        extensions: Default::default(),
        extras: Default::default(),
        inverse_bind_matrices: Some(inverse_binds),
        joints: vec![json::Index::new(HIP_NODE), json::Index::new(TIP_NODE)],
        name: Some("StripSkeleton".to_string()),
        skeleton: Some(json::Index::new(ROOT_NODE)),
    }];
    root.animations = animations;

    buffer.finish(root).expect("Failed to assemble GLB")
}

fn push_channel(
    samplers: &mut Vec<json::animation::Sampler>,
    channels: &mut Vec<json::animation::Channel>,
    (input, output): (json::Index<json::Accessor>, json::Index<json::Accessor>),
    target: u32,
    property: json::animation::Property,
) {
    samplers.push(json::animation::Sampler {
        input,
        interpolation: Valid(json::animation::Interpolation::Linear),
        output,
        extensions: Default::default(),
        extras: Default::default(),
    });
    channels.push(json::animation::Channel {
        sampler: json::Index::new(samplers.len() as u32 - 1),
        target: json::animation::Target {
            node: json::Index::new(target),
            path: Valid(property),
            extensions: Default::default(),
            extras: Default::default(),
        },
        extensions: Default::default(),
        extras: Default::default(),
    });
}

/// Write the generated strip to `dir/Strip.glb`
pub fn write_strip(dir: &std::path::Path) -> std::path::PathBuf {
    write_glb(dir, "Strip.glb", &generate_skinned_glb())
}

pub fn write_glb(dir: &std::path::Path, file_name: &str, glb: &[u8]) -> std::path::PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, glb).expect("Failed to write GLB");
    path
}
