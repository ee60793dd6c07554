//! Skin and animation accessors packed on top of [`GlbBuffer`]

use glam::{Mat4, Quat, Vec3};
use gltf_json as json;
use vatex_export::glb::GlbBuffer;

type AccessorIndex = json::Index<json::Accessor>;

pub(crate) trait SkinPacking {
    /// `JOINTS_n` sets
    fn push_joints(&mut self, values: &[[u16; 4]]) -> AccessorIndex;
    /// `WEIGHTS_n` sets
    fn push_weights(&mut self, values: &[[f32; 4]]) -> AccessorIndex;
    fn push_matrices(&mut self, values: &[Mat4]) -> AccessorIndex;
    /// Keyframe times, with the bounds glTF requires
    fn push_times(&mut self, times: &[f32]) -> AccessorIndex;
    fn push_translations(&mut self, values: &[Vec3]) -> AccessorIndex;
    fn push_rotations(&mut self, values: &[Quat]) -> AccessorIndex;
}

impl SkinPacking for GlbBuffer {
    fn push_joints(&mut self, values: &[[u16; 4]]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(values),
            values.len(),
            json::accessor::ComponentType::U16,
            json::accessor::Type::Vec4,
            Some(json::buffer::Target::ArrayBuffer),
            None,
        )
    }

    fn push_weights(&mut self, values: &[[f32; 4]]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(values),
            values.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec4,
            Some(json::buffer::Target::ArrayBuffer),
            None,
        )
    }

    fn push_matrices(&mut self, values: &[Mat4]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(values),
            values.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Mat4,
            None,
            None,
        )
    }

    fn push_times(&mut self, times: &[f32]) -> AccessorIndex {
        let min = times.iter().copied().fold(f32::MAX, f32::min);
        let max = times.iter().copied().fold(f32::MIN, f32::max);
        self.push(
            bytemuck::cast_slice(times),
            times.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Scalar,
            None,
            Some((vec![min], vec![max])),
        )
    }

    fn push_translations(&mut self, values: &[Vec3]) -> AccessorIndex {
        self.push_vec3(values, false)
    }

    fn push_rotations(&mut self, values: &[Quat]) -> AccessorIndex {
        self.push(
            bytemuck::cast_slice(values),
            values.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec4,
            None,
            None,
        )
    }
}
