//! Animation bake orchestrator
//!
//! One state machine covers the three bake modes. They differ only in the
//! output target (one texture, a texture per clip, or one texture array) and
//! in how files are named.

use tracing::{debug, info, warn};

use super::plan::{AnimationPlan, PlanSize};
use super::preconditions::animation_blocker;
use super::{BakeReport, BakeStatus, BakeTask, OutputPaths, Progress, run_to_completion};
use crate::config::{AnimationBakeConfig, BakeMode};
use crate::diagnostics::{Diagnostic, Ledger};
use crate::encode::{ColorEncoding, PixelEncoder};
use crate::error::{BakeError, BakeResult};
use crate::layout::TexelOrder;
use crate::output::TextureWriter;
use crate::prompt::{SavePrompt, SaveRequest};
use crate::rig::Rig;
use crate::sampler::{FrameSampler, FrameStep, VertexTransform};
use crate::texture::{TextureArray, TextureBuffer};

/// File extension of texture-array output
pub const TEXTURE_ARRAY_EXTENSION: &str = "vatarr";

enum Target {
    /// Single clip, or the clip currently baking in individual mode
    Texture(TextureBuffer),
    /// One slice per planned clip
    Array(TextureArray),
}

/// A running animation bake
///
/// Created by [`start_animation_bake`] once a save path is chosen. The rig
/// instance it samples from is released when the last clip finishes, when a
/// step fails, or when the bake is dropped.
pub struct AnimationBake<'r, R: Rig + 'r, W: TextureWriter> {
    plan: AnimationPlan,
    color: ColorEncoding,
    order: TexelOrder,
    transform: VertexTransform,
    encoder: PixelEncoder,
    instance: Option<R::Instance<'r>>,
    writer: W,
    paths: OutputPaths,
    /// Indices into `plan.clips` of clips that produce frames
    queue: Vec<usize>,
    cursor: usize,
    sampler: Option<FrameSampler>,
    target: Target,
    report: BakeReport,
    step: u64,
    total_steps: u64,
}

fn save_request(rig_name: &str, mode: BakeMode, color: ColorEncoding) -> SaveRequest {
    match mode {
        BakeMode::Single => SaveRequest::new(
            "Save Baked Animation",
            rig_name,
            color.extension(),
            "Please save your baked animation",
        ),
        BakeMode::AllIndividual => SaveRequest::new(
            "Save Baked Animations",
            rig_name,
            color.extension(),
            "Please save your baked animations",
        ),
        BakeMode::AllTextureArray => SaveRequest::new(
            "Save Baked Animation Array",
            rig_name,
            TEXTURE_ARRAY_EXTENSION,
            "Please save your baked animation array",
        ),
    }
}

/// Plan the bake, ask for a save path and prepare the session
///
/// Returns `Ok(None)` when the prompt is declined; nothing is instantiated,
/// written or recorded in that case. Once a path is chosen the session's
/// `PixelOutOfRange` warning is reset.
pub fn start_animation_bake<'r, R, P, W>(
    rig: &'r R,
    config: &AnimationBakeConfig,
    prompt: &mut P,
    writer: W,
    ledger: &mut Ledger,
) -> BakeResult<Option<AnimationBake<'r, R, W>>>
where
    R: Rig,
    P: SavePrompt + ?Sized,
    W: TextureWriter,
{
    if let Some(blocker) = animation_blocker(Some(rig)) {
        return Err(BakeError::Blocked(blocker));
    }
    let plan = AnimationPlan::new(rig, config)?;

    let request = save_request(rig.name(), plan.mode, config.color);
    let Some(chosen) = prompt.request_path(&request) else {
        debug!("Save of '{}' cancelled, nothing baked", rig.name());
        return Ok(None);
    };

    ledger.set_condition(Diagnostic::PixelOutOfRange, false);

    // Texture arrays are always stored as floats
    let color = match plan.mode {
        BakeMode::AllTextureArray => ColorEncoding::Hdr,
        _ => config.color,
    };

    let mut queue = Vec::with_capacity(plan.clips.len());
    let mut report = BakeReport::default();
    for (index, clip) in plan.clips.iter().enumerate() {
        if clip.frame_count() > 0 {
            queue.push(index);
        } else {
            match plan.mode {
                BakeMode::AllTextureArray => {
                    warn!("Clip '{}' has no frames at {} fps, its slice stays clear", clip.name, plan.fps)
                }
                _ => warn!("Clip '{}' has no frames at {} fps, skipping", clip.name, plan.fps),
            }
            report.skipped.push(clip.name.clone());
        }
    }
    if queue.is_empty() {
        return Err(BakeError::NothingToBake { fps: plan.fps });
    }
    let total_steps = queue
        .iter()
        .map(|&index| 1 + plan.clips[index].range.end as u64)
        .sum();

    let target = match plan.size {
        PlanSize::Single(layout) => Target::Texture(TextureBuffer::new(layout)),
        PlanSize::Individual { max, .. } => Target::Texture(TextureBuffer::new(max)),
        PlanSize::Array { side, layers } => Target::Array(TextureArray::new(side, layers)),
    };

    let instance = rig.instantiate()?;
    info!(
        "Baking {} clip(s) of '{}' [{}] at {} fps into {} ({})",
        queue.len(),
        rig.name(),
        plan.mode,
        plan.fps,
        chosen.display(),
        color
    );

    Ok(Some(AnimationBake {
        transform: VertexTransform::for_rig(rig.root_rotation(), config.bake_rotation, config.scale),
        encoder: PixelEncoder::new(color),
        color,
        order: config.texel_order,
        instance: Some(instance),
        writer,
        paths: OutputPaths::new(chosen),
        queue,
        cursor: 0,
        sampler: None,
        target,
        report,
        step: 0,
        total_steps,
        plan,
    }))
}

/// Run an animation bake to completion without a host loop
pub fn bake_animation<R, P, W>(
    rig: &R,
    config: &AnimationBakeConfig,
    prompt: &mut P,
    writer: W,
    ledger: &mut Ledger,
) -> BakeResult<Option<BakeReport>>
where
    R: Rig,
    P: SavePrompt + ?Sized,
    W: TextureWriter,
{
    let Some(mut bake) = start_animation_bake(rig, config, prompt, writer, ledger)? else {
        return Ok(None);
    };
    run_to_completion(&mut bake, ledger).map(Some)
}

impl<'r, R: Rig + 'r, W: TextureWriter> AnimationBake<'r, R, W> {
    pub fn plan(&self) -> &AnimationPlan {
        &self.plan
    }

    /// Encoding used for this session
    pub fn color(&self) -> ColorEncoding {
        self.color
    }

    /// True while the rig instance is held
    pub fn is_running(&self) -> bool {
        self.instance.is_some()
    }

    pub fn progress(&self) -> Progress {
        let (frame, frame_count) = match self.queue.get(self.cursor) {
            Some(&index) => (
                self.sampler.as_ref().map_or(0, FrameSampler::frames_simulated),
                self.plan.clips[index].range.end,
            ),
            None => (0, 0),
        };
        Progress {
            clip: self.cursor,
            clip_count: self.queue.len(),
            frame,
            frame_count,
            step: self.step,
            total_steps: self.total_steps,
        }
    }

    /// Borrow the writer, e.g. to inspect what it recorded
    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn release(&mut self) {
        self.sampler = None;
        if self.instance.take().is_some() {
            debug!("Released rig instance");
        }
    }

    fn advance(&mut self, ledger: &mut Ledger) -> BakeResult<BakeStatus<BakeReport>> {
        let Some(instance) = self.instance.as_mut() else {
            return Err(BakeError::AlreadyFinished);
        };
        let clip_index = self.queue[self.cursor];
        let clip = &self.plan.clips[clip_index];
        let sampler = self.sampler.get_or_insert_with(|| {
            FrameSampler::new(
                clip.name.clone(),
                self.plan.fps,
                clip.range.clone(),
                self.plan.vertex_count,
                self.transform,
            )
        });

        match sampler.step(instance)? {
            FrameStep::Settled => {
                debug!("Playing '{}' ({} frames)", clip.name, clip.range.end);
                if let (Target::Texture(buffer), Some(layout)) = (&mut self.target, clip.layout) {
                    buffer.reset(layout);
                }
            }
            FrameStep::Sampled { frame, positions } => {
                let first = (frame - clip.range.start) as usize * self.plan.vertex_count;
                let buffer = match &mut self.target {
                    Target::Texture(buffer) => buffer,
                    Target::Array(array) => array.slice_mut(clip_index),
                };
                self.encoder
                    .encode_frame(positions, first, self.order, buffer, ledger);
            }
            FrameStep::Skipped { .. } | FrameStep::Finished => {}
        }
        self.step += 1;

        if !sampler.is_exhausted() {
            return Ok(BakeStatus::Pending(self.progress()));
        }

        self.finish_clip(clip_index)?;
        self.sampler = None;
        self.cursor += 1;
        if self.cursor < self.queue.len() {
            return Ok(BakeStatus::Pending(self.progress()));
        }
        self.finalize().map(BakeStatus::Finished)
    }

    fn finish_clip(&mut self, clip_index: usize) -> BakeResult<()> {
        let clip = &self.plan.clips[clip_index];
        let frames = clip.frame_count();
        self.report.clips += 1;
        self.report.frames += frames as u64;

        match &self.target {
            Target::Texture(buffer) => {
                let path = self.paths.clip_texture(
                    &clip.name,
                    frames,
                    buffer.layout(),
                    self.color.extension(),
                );
                self.writer.write_texture(&path, buffer, self.color)?;
                info!(
                    "Baked '{}' ({} frames, {}) to {}",
                    clip.name,
                    frames,
                    buffer.layout(),
                    path.display()
                );
                self.report.files.push(path);
            }
            Target::Array(_) => {
                debug!("Baked '{}' ({} frames) into slice {}", clip.name, frames, clip_index);
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> BakeResult<BakeReport> {
        if let Target::Array(array) = &self.target {
            let path = self.paths.chosen().to_path_buf();
            self.writer.write_array(&path, array)?;
            info!(
                "Wrote {} slice(s) of {}x{} to {}",
                array.layer_count(),
                array.side(),
                array.side(),
                path.display()
            );
            self.report.files.push(path);
        }
        self.release();
        info!(
            "Finished baking {} clip(s), {} frame(s)",
            self.report.clips, self.report.frames
        );
        Ok(std::mem::take(&mut self.report))
    }
}

impl<'r, R: Rig + 'r, W: TextureWriter> BakeTask for AnimationBake<'r, R, W> {
    type Output = BakeReport;

    /// Simulate one frame; errors release the rig instance and end the bake
    fn step(&mut self, ledger: &mut Ledger) -> BakeResult<BakeStatus<BakeReport>> {
        let result = self.advance(ledger);
        if result.is_err() {
            self.release();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClipSelector;
    use crate::diagnostics::Domain;
    use crate::fixture::{OfflineRig, RecordingWriter};
    use crate::layout::TextureLayout;
    use crate::prompt::FixedPrompt;
    use crate::rig::ClipInfo;
    use crate::texture::Pixel;
    use glam::{Quat, Vec3};
    use std::path::PathBuf;

    fn single(config: AnimationBakeConfig) -> AnimationBakeConfig {
        AnimationBakeConfig {
            mode: BakeMode::Single,
            ..config
        }
    }

    fn knight() -> OfflineRig {
        OfflineRig::new("Knight", 4).with_clips(vec![
            ClipInfo::new("Walk", 0.1),
            ClipInfo::new("Blink", 0.01),
            ClipInfo::new("Idle", 0.2),
        ])
    }

    fn expected_pixel(rig: &OfflineRig, vertex: usize, time: f32) -> Pixel {
        let p = rig.rest_position(vertex) + Vec3::new(0.25 * time, 0.0, 0.0) + Vec3::splat(0.5);
        Pixel::new(p.x, p.y, p.z, 1.0)
    }

    fn assert_pixel_eq(actual: Pixel, expected: Pixel) {
        let a = [actual.r, actual.g, actual.b, actual.a];
        let e = [expected.r, expected.g, expected.b, expected.a];
        for (a, e) in a.iter().zip(e) {
            assert!((a - e).abs() < 1e-5, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_scenario_one_second_single_clip() {
        let rig = OfflineRig::new("Rig", 100).with_clips(vec![ClipInfo::new("Run", 1.0)]);
        let mut prompt = FixedPrompt::accept("out/Rig.exr");
        let mut writer = RecordingWriter::new();
        let mut ledger = Ledger::new(Domain::Animation);

        let mut bake = start_animation_bake(
            &rig,
            &single(AnimationBakeConfig::default()),
            &mut prompt,
            &mut writer,
            &mut ledger,
        )
        .unwrap()
        .unwrap();
        assert_eq!(rig.live_instances(), 1);

        let mut steps = 0;
        let report = loop {
            steps += 1;
            match bake.step(&mut ledger).unwrap() {
                BakeStatus::Pending(progress) => {
                    assert_eq!(progress.step, steps);
                    assert_eq!(progress.total_steps, 31);
                }
                BakeStatus::Finished(report) => break report,
            }
        };
        // One settle step plus one step per simulated frame
        assert_eq!(steps, 31);
        assert!(!bake.is_running());
        assert_eq!(rig.live_instances(), 0);
        drop(bake);

        assert_eq!(report.files, vec![PathBuf::from("out/Rig@Run f30 s64x64.exr")]);
        assert_eq!(report.frames, 30);
        let (_, texture, encoding) = &writer.textures[0];
        assert_eq!(*encoding, ColorEncoding::Hdr);
        assert_eq!(texture.layout(), TextureLayout::new(64, 64));
        assert_eq!(texture.written_count(), 3000);
        assert_eq!(prompt.requests()[0].title, "Save Baked Animation");
        assert_eq!(prompt.requests()[0].extension, "exr");
    }

    #[test]
    fn test_texels_follow_column_major_order() {
        let rig = knight();
        let mut writer = RecordingWriter::new();
        let mut ledger = Ledger::new(Domain::Animation);
        bake_animation(
            &rig,
            &single(AnimationBakeConfig::default()),
            &mut FixedPrompt::accept("Knight.exr"),
            &mut writer,
            &mut ledger,
        )
        .unwrap()
        .unwrap();

        // 4 vertices x 3 frames in a 4x4 grid: frame f fills column f
        let (path, texture, _) = &writer.textures[0];
        assert_eq!(path, &PathBuf::from("Knight@Walk f3 s4x4.exr"));
        for frame in 0..3u32 {
            for vertex in 0..4usize {
                assert_pixel_eq(
                    texture.get(frame, vertex as u32),
                    expected_pixel(&rig, vertex, frame as f32 / 30.0),
                );
            }
        }
        assert_eq!(texture.get(3, 0), Pixel::CLEAR);
    }

    #[test]
    fn test_row_major_order() {
        let rig = knight();
        let mut writer = RecordingWriter::new();
        let config = single(AnimationBakeConfig {
            texel_order: TexelOrder::RowMajor,
            ..Default::default()
        });
        bake_animation(
            &rig,
            &config,
            &mut FixedPrompt::accept("Knight.exr"),
            &mut writer,
            &mut Ledger::new(Domain::Animation),
        )
        .unwrap();

        let (_, texture, _) = &writer.textures[0];
        for vertex in 0..4usize {
            assert_pixel_eq(
                texture.get(vertex as u32, 1),
                expected_pixel(&rig, vertex, 1.0 / 30.0),
            );
        }
    }

    #[test]
    fn test_single_frame_range_skips_leading_frames() {
        let rig = OfflineRig::new("Knight", 4).with_clips(vec![ClipInfo::new("Walk", 0.2)]);
        let mut writer = RecordingWriter::new();
        let config = single(AnimationBakeConfig {
            clip: ClipSelector::Name("Walk".into()),
            min_frame: 2,
            max_frame: 4,
            ..Default::default()
        });
        let report = bake_animation(
            &rig,
            &config,
            &mut FixedPrompt::accept("Knight.exr"),
            &mut writer,
            &mut Ledger::new(Domain::Animation),
        )
        .unwrap()
        .unwrap();

        // 8 texels: floor(sqrt(8)) = 2 grows to 4, halved to 2x4
        assert_eq!(report.files, vec![PathBuf::from("Knight@Walk f2 s2x4.exr")]);
        let (_, texture, _) = &writer.textures[0];
        assert_pixel_eq(texture.get(0, 0), expected_pixel(&rig, 0, 2.0 / 30.0));
        assert_pixel_eq(texture.get(1, 3), expected_pixel(&rig, 3, 3.0 / 30.0));
    }

    #[test]
    fn test_individual_writes_one_file_per_clip() {
        let rig = knight();
        let mut writer = RecordingWriter::new();
        let mut ledger = Ledger::new(Domain::Animation);
        let report = bake_animation(
            &rig,
            &AnimationBakeConfig {
                color: ColorEncoding::Ldr,
                ..Default::default()
            },
            &mut FixedPrompt::accept("vat/Knight.png"),
            &mut writer,
            &mut ledger,
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            report.files,
            vec![
                PathBuf::from("vat/Knight@Walk f3 s4x4.png"),
                PathBuf::from("vat/Knight@Idle f6 s4x8.png"),
            ]
        );
        assert_eq!(report.skipped, vec!["Blink".to_string()]);
        assert_eq!(report.clips, 2);
        assert_eq!(writer.textures[1].1.layout(), TextureLayout::new(4, 8));
        assert_eq!(writer.textures[1].1.written_count(), 24);
        assert!(writer.textures.iter().all(|(_, _, e)| *e == ColorEncoding::Ldr));
        assert!(ledger.is_empty());
        assert_eq!(rig.live_instances(), 0);
        assert_eq!(rig.instances_created(), 1);
    }

    #[test]
    fn test_individual_buffer_cleared_between_clips() {
        let rig = OfflineRig::new("Rig", 4).with_clips(vec![
            ClipInfo::new("Long", 0.2),
            ClipInfo::new("Short", 0.1),
        ]);
        let mut writer = RecordingWriter::new();
        bake_animation(
            &rig,
            &AnimationBakeConfig::default(),
            &mut FixedPrompt::accept("Rig.exr"),
            &mut writer,
            &mut Ledger::new(Domain::Animation),
        )
        .unwrap();

        let (_, short, _) = &writer.textures[1];
        assert_eq!(short.layout(), TextureLayout::new(4, 4));
        assert_eq!(short.written_count(), 12);
    }

    #[test]
    fn test_array_mode_slices() {
        let rig = knight();
        let mut writer = RecordingWriter::new();
        let mut prompt = FixedPrompt::accept("Knight.vatarr");
        let report = bake_animation(
            &rig,
            &AnimationBakeConfig {
                mode: BakeMode::AllTextureArray,
                color: ColorEncoding::Ldr,
                ..Default::default()
            },
            &mut prompt,
            &mut writer,
            &mut Ledger::new(Domain::Animation),
        )
        .unwrap()
        .unwrap();

        assert_eq!(prompt.requests()[0].extension, "vatarr");
        assert!(writer.textures.is_empty());
        assert_eq!(report.files, vec![PathBuf::from("Knight.vatarr")]);

        let (_, array) = &writer.arrays[0];
        // Idle: 24 texels, side 8
        assert_eq!(array.side(), 8);
        assert_eq!(array.layer_count(), 3);
        assert_eq!(array.slice(0).written_count(), 12);
        assert_eq!(array.slice(1).written_count(), 0);
        assert_eq!(array.slice(2).written_count(), 24);
        assert_pixel_eq(array.slice(2).get(0, 5), expected_pixel(&rig, 1, 1.0 / 30.0));
    }

    #[test]
    fn test_scenario_ldr_out_of_range_single_warning() {
        // x reaches 1.2 and beyond within the clip
        let rig = OfflineRig::new("Rig", 8)
            .with_clips(vec![ClipInfo::new("Lunge", 1.0)])
            .with_velocity(Vec3::new(2.0, 0.0, 0.0));
        let mut ledger = Ledger::new(Domain::Animation);
        let config = AnimationBakeConfig {
            color: ColorEncoding::Ldr,
            ..Default::default()
        };
        bake_animation(
            &rig,
            &config,
            &mut FixedPrompt::accept("Rig.png"),
            RecordingWriter::new(),
            &mut ledger,
        )
        .unwrap();

        assert_eq!(ledger.iter().collect::<Vec<_>>(), vec![Diagnostic::PixelOutOfRange]);
    }

    #[test]
    fn test_hdr_and_array_never_flag() {
        let rig = OfflineRig::new("Rig", 8)
            .with_clips(vec![ClipInfo::new("Lunge", 1.0)])
            .with_velocity(Vec3::new(2.0, 0.0, 0.0));
        for mode in [BakeMode::AllIndividual, BakeMode::AllTextureArray] {
            let mut ledger = Ledger::new(Domain::Animation);
            let config = AnimationBakeConfig {
                mode,
                color: if mode == BakeMode::AllIndividual {
                    ColorEncoding::Hdr
                } else {
                    ColorEncoding::Ldr
                },
                ..Default::default()
            };
            bake_animation(
                &rig,
                &config,
                &mut FixedPrompt::accept("Rig.out"),
                RecordingWriter::new(),
                &mut ledger,
            )
            .unwrap();
            assert!(ledger.is_empty(), "{:?}", mode);
        }
    }

    #[test]
    fn test_session_start_clears_stale_range_warning() {
        let rig = knight();
        let mut ledger = Ledger::new(Domain::Animation);
        ledger.set_condition(Diagnostic::PixelOutOfRange, true);
        bake_animation(
            &rig,
            &AnimationBakeConfig {
                color: ColorEncoding::Ldr,
                ..Default::default()
            },
            &mut FixedPrompt::accept("Knight.png"),
            RecordingWriter::new(),
            &mut ledger,
        )
        .unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_scenario_cancelled_prompt_has_no_effect() {
        let rig = knight();
        for mode in [BakeMode::Single, BakeMode::AllIndividual, BakeMode::AllTextureArray] {
            let mut writer = RecordingWriter::new();
            let mut ledger = Ledger::new(Domain::Animation);
            ledger.set_condition(Diagnostic::PixelOutOfRange, true);
            let before: Vec<_> = ledger.iter().collect();

            let result = bake_animation(
                &rig,
                &AnimationBakeConfig {
                    mode,
                    ..Default::default()
                },
                &mut FixedPrompt::cancel(),
                &mut writer,
                &mut ledger,
            )
            .unwrap();

            assert!(result.is_none());
            assert!(writer.is_empty());
            assert_eq!(ledger.iter().collect::<Vec<_>>(), before);
        }
        assert_eq!(rig.instances_created(), 0);
    }

    #[test]
    fn test_evaluator_failure_releases_instance() {
        let rig = knight().failing_at_frame(2);
        let mut writer = RecordingWriter::new();
        let mut ledger = Ledger::new(Domain::Animation);
        let mut bake = start_animation_bake(
            &rig,
            &AnimationBakeConfig::default(),
            &mut FixedPrompt::accept("Knight.exr"),
            &mut writer,
            &mut ledger,
        )
        .unwrap()
        .unwrap();

        let err = run_to_completion(&mut bake, &mut ledger).unwrap_err();
        assert!(matches!(err, BakeError::External(_)));
        assert_eq!(rig.live_instances(), 0);
        assert!(matches!(
            bake.step(&mut ledger),
            Err(BakeError::AlreadyFinished)
        ));
        drop(bake);
        assert!(writer.is_empty());
    }

    #[test]
    fn test_dropping_bake_releases_instance() {
        let rig = knight();
        let mut ledger = Ledger::new(Domain::Animation);
        let mut bake = start_animation_bake(
            &rig,
            &AnimationBakeConfig::default(),
            &mut FixedPrompt::accept("Knight.exr"),
            RecordingWriter::new(),
            &mut ledger,
        )
        .unwrap()
        .unwrap();
        bake.step(&mut ledger).unwrap();
        assert_eq!(rig.live_instances(), 1);
        drop(bake);
        assert_eq!(rig.live_instances(), 0);
    }

    #[test]
    fn test_blocked_rig_never_prompts() {
        let rig = OfflineRig::new("Empty", 4);
        let mut prompt = FixedPrompt::accept("Empty.exr");
        let result = bake_animation(
            &rig,
            &AnimationBakeConfig::default(),
            &mut prompt,
            RecordingWriter::new(),
            &mut Ledger::new(Domain::Animation),
        );
        assert!(matches!(
            result,
            Err(BakeError::Blocked(Diagnostic::NoAnimationClips))
        ));
        assert!(prompt.requests().is_empty());
    }

    #[test]
    fn test_bake_rotation_undoes_root() {
        let root = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let rig = knight().with_root_rotation(root);
        let mut writer = RecordingWriter::new();
        bake_animation(
            &rig,
            &single(AnimationBakeConfig::default()),
            &mut FixedPrompt::accept("Knight.exr"),
            &mut writer,
            &mut Ledger::new(Domain::Animation),
        )
        .unwrap();
        let (_, texture, _) = &writer.textures[0];
        assert_pixel_eq(texture.get(0, 2), expected_pixel(&rig, 2, 0.0));
    }

    #[test]
    fn test_progress_reports_clip_and_frame() {
        let rig = knight();
        let mut ledger = Ledger::new(Domain::Animation);
        let mut bake = start_animation_bake(
            &rig,
            &AnimationBakeConfig::default(),
            &mut FixedPrompt::accept("Knight.exr"),
            RecordingWriter::new(),
            &mut ledger,
        )
        .unwrap()
        .unwrap();
        // Walk: 1 + 3 steps, Idle: 1 + 6 steps
        assert_eq!(bake.progress().total_steps, 11);

        for _ in 0..4 {
            bake.step(&mut ledger).unwrap();
        }
        let progress = bake.progress();
        assert_eq!((progress.clip, progress.frame, progress.frame_count), (1, 0, 6));

        bake.step(&mut ledger).unwrap();
        bake.step(&mut ledger).unwrap();
        let progress = bake.progress();
        assert_eq!((progress.clip, progress.frame), (1, 1));
    }
}
