//! Offline rig for tests and dry runs
//!
//! [`OfflineRig`] implements the rig capabilities without any asset: vertex
//! `i` rests at a fixed point inside the unit box around the origin and the
//! whole mesh drifts with a constant velocity over clip time.

use anyhow::bail;
use glam::{Quat, Vec3};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::encode::ColorEncoding;
use crate::error::{BakeError, BakeResult};
use crate::mesh::MeshData;
use crate::output::{MeshWriter, TextureWriter};
use crate::rig::{AnimationEvaluator, ClipInfo, Rig, RigComponents};
use crate::texture::{TextureArray, TextureBuffer};

/// Deterministic in-memory rig
#[derive(Debug, Clone)]
pub struct OfflineRig {
    name: String,
    vertex_count: usize,
    clips: Vec<ClipInfo>,
    components: RigComponents,
    root_rotation: Quat,
    velocity: Vec3,
    fail_at_snapshot: Option<u32>,
    fail_instantiate: bool,
    live: Rc<Cell<usize>>,
    created: Rc<Cell<usize>>,
}

impl OfflineRig {
    pub fn new(name: impl Into<String>, vertex_count: usize) -> Self {
        Self {
            name: name.into(),
            vertex_count,
            clips: Vec::new(),
            components: RigComponents::COMPLETE,
            root_rotation: Quat::IDENTITY,
            velocity: Vec3::new(0.25, 0.0, 0.0),
            fail_at_snapshot: None,
            fail_instantiate: false,
            live: Rc::new(Cell::new(0)),
            created: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_clips(mut self, clips: Vec<ClipInfo>) -> Self {
        self.clips = clips;
        self
    }

    pub fn with_components(mut self, components: RigComponents) -> Self {
        self.components = components;
        self
    }

    pub fn with_root_rotation(mut self, rotation: Quat) -> Self {
        self.root_rotation = rotation;
        self
    }

    /// Displacement per second of clip time
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Make the `n`-th snapshot after each `play` fail
    pub fn failing_at_frame(mut self, n: u32) -> Self {
        self.fail_at_snapshot = Some(n);
        self
    }

    /// Make every `instantiate` call fail
    pub fn failing_instantiate(mut self) -> Self {
        self.fail_instantiate = true;
        self
    }

    /// Rest position of vertex `index`, within `[-0.5, 0.5]` on every axis
    pub fn rest_position(&self, index: usize) -> Vec3 {
        Vec3::new(
            -0.25,
            (index % 8) as f32 * 0.05 - 0.2,
            (index % 5) as f32 * 0.05 - 0.1,
        )
    }

    /// Instances currently alive
    pub fn live_instances(&self) -> usize {
        self.live.get()
    }

    /// Instances created over the rig's lifetime
    pub fn instances_created(&self) -> usize {
        self.created.get()
    }
}

impl Rig for OfflineRig {
    type Instance<'a> = OfflineInstance<'a>;

    fn name(&self) -> &str {
        &self.name
    }

    fn components(&self) -> RigComponents {
        self.components
    }

    fn clips(&self) -> Vec<ClipInfo> {
        self.clips.clone()
    }

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn root_rotation(&self) -> Quat {
        self.root_rotation
    }

    fn instantiate(&self) -> BakeResult<OfflineInstance<'_>> {
        if self.fail_instantiate {
            return Err(BakeError::External(anyhow::anyhow!(
                "offline rig '{}' refused to instantiate",
                self.name
            )));
        }
        self.live.set(self.live.get() + 1);
        self.created.set(self.created.get() + 1);
        Ok(OfflineInstance {
            rig: self,
            clip: None,
            time: 0.0,
            snapshots: 0,
        })
    }
}

/// Working copy of an [`OfflineRig`]
#[derive(Debug)]
pub struct OfflineInstance<'a> {
    rig: &'a OfflineRig,
    clip: Option<usize>,
    time: f32,
    snapshots: u32,
}

impl OfflineInstance<'_> {
    /// Local time of the playing clip
    pub fn time(&self) -> f32 {
        self.time
    }
}

impl AnimationEvaluator for OfflineInstance<'_> {
    fn play(&mut self, clip: &str) -> anyhow::Result<()> {
        let Some(index) = self.rig.clips.iter().position(|c| c.name == clip) else {
            bail!("clip '{}' is not on rig '{}'", clip, self.rig.name);
        };
        self.clip = Some(index);
        self.time = 0.0;
        self.snapshots = 0;
        Ok(())
    }

    fn advance(&mut self, dt: f32) -> anyhow::Result<()> {
        if self.clip.is_none() {
            bail!("advance called before play");
        }
        self.time += dt;
        Ok(())
    }

    fn snapshot(&mut self, out: &mut Vec<Vec3>) -> anyhow::Result<()> {
        if self.clip.is_none() {
            bail!("snapshot called before play");
        }
        if self.rig.fail_at_snapshot == Some(self.snapshots) {
            bail!("injected evaluator failure at snapshot {}", self.snapshots);
        }
        self.snapshots += 1;

        let rig = self.rig;
        let offset = rig.velocity * self.time;
        out.clear();
        out.extend(
            (0..rig.vertex_count).map(|i| rig.root_rotation * (rig.rest_position(i) + offset)),
        );
        Ok(())
    }
}

impl Drop for OfflineInstance<'_> {
    fn drop(&mut self) {
        self.rig.live.set(self.rig.live.get() - 1);
    }
}

/// Writer that keeps everything in memory
#[derive(Debug, Default)]
pub struct RecordingWriter {
    pub textures: Vec<(PathBuf, TextureBuffer, ColorEncoding)>,
    pub arrays: Vec<(PathBuf, TextureArray)>,
    pub meshes: Vec<(PathBuf, MeshData)>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path written, textures first
    pub fn paths(&self) -> Vec<PathBuf> {
        self.textures
            .iter()
            .map(|(path, ..)| path.clone())
            .chain(self.arrays.iter().map(|(path, _)| path.clone()))
            .chain(self.meshes.iter().map(|(path, _)| path.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.arrays.is_empty() && self.meshes.is_empty()
    }
}

impl TextureWriter for RecordingWriter {
    fn write_texture(
        &mut self,
        path: &Path,
        texture: &TextureBuffer,
        encoding: ColorEncoding,
    ) -> BakeResult<()> {
        self.textures
            .push((path.to_path_buf(), texture.clone(), encoding));
        Ok(())
    }

    fn write_array(&mut self, path: &Path, array: &TextureArray) -> BakeResult<()> {
        self.arrays.push((path.to_path_buf(), array.clone()));
        Ok(())
    }
}

impl MeshWriter for RecordingWriter {
    fn extension(&self) -> &str {
        "mesh"
    }

    fn write_mesh(&mut self, path: &Path, mesh: &MeshData) -> BakeResult<()> {
        self.meshes.push((path.to_path_buf(), mesh.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instances_are_counted() {
        let rig = OfflineRig::new("Rig", 3).with_clips(vec![ClipInfo::new("Idle", 1.0)]);
        {
            let _a = rig.instantiate().unwrap();
            let _b = rig.instantiate().unwrap();
            assert_eq!(rig.live_instances(), 2);
        }
        assert_eq!(rig.live_instances(), 0);
        assert_eq!(rig.instances_created(), 2);
    }

    #[test]
    fn test_snapshot_follows_time() {
        let rig = OfflineRig::new("Rig", 2).with_clips(vec![ClipInfo::new("Idle", 1.0)]);
        let mut instance = rig.instantiate().unwrap();
        instance.play("Idle").unwrap();
        instance.advance(0.5).unwrap();

        let mut out = Vec::new();
        instance.snapshot(&mut out).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[1].abs_diff_eq(rig.rest_position(1) + Vec3::new(0.125, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_unknown_clip_rejected() {
        let rig = OfflineRig::new("Rig", 2);
        let mut instance = rig.instantiate().unwrap();
        assert!(instance.play("Missing").is_err());
        assert!(instance.advance(0.1).is_err());
    }
}
