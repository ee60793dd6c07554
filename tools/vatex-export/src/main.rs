//! vatex-export - vertex animation texture export tool
//!
//! Bakes skinned glTF animations and static meshes into position textures
//! (.png / .exr / .vatarr) and stamps vertex indices into mesh UV channels.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use vatex_core::{
    AnimationBakeConfig, BakeMode, ClipSelector, ColorEncoding, MeshBakeConfig, TexelOrder,
    UvChannel, UvStampConfig,
};

use vatex_export::{OutputPrompt, export, manifest};

#[derive(Parser)]
#[command(name = "vatex-export")]
#[command(about = "Vertex animation texture export tool")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every job of a manifest file
    Build {
        /// Path to vatex.toml manifest
        #[arg(default_value = "vatex.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without baking
    Check {
        /// Path to vatex.toml manifest
        #[arg(default_value = "vatex.toml")]
        manifest: PathBuf,
    },

    /// Show rig components, diagnostics and the bake plan
    Inspect {
        /// Input glTF/GLB rig
        input: PathBuf,

        #[command(flatten)]
        bake: AnimationArgs,
    },

    /// List animation clips of a rig
    Clips {
        /// Input glTF/GLB rig
        input: PathBuf,

        /// Frame rate used for frame counts
        #[arg(long, default_value_t = 30)]
        fps: u32,
    },

    /// Bake rig animations to textures
    Animation {
        /// Input glTF/GLB rig
        input: PathBuf,

        /// Save path (default: "<rig>.<ext>" next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        bake: AnimationArgs,
    },

    /// Bake a static mesh to a texture
    Mesh {
        /// Input mesh file (glTF/GLB/OBJ)
        input: PathBuf,

        /// Save path (default: "<mesh> Baked.<ext>" next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Position scale
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        /// Color mode (ldr or hdr)
        #[arg(long, default_value = "hdr")]
        color: ColorEncoding,

        /// Texel fill order (column-major or row-major)
        #[arg(long, default_value = "column-major")]
        texel_order: TexelOrder,
    },

    /// Write a copy of a mesh with vertex indices in a UV channel
    Uv {
        /// Input mesh file (glTF/GLB/OBJ)
        input: PathBuf,

        /// Save path (default: "<mesh> UV.glb" next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target UV channel (uv0..uv7)
        #[arg(long, default_value = "uv1")]
        channel: UvChannel,

        /// Position scale
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
    },
}

/// Animation bake settings shared by `inspect` and `animation`
#[derive(Args)]
struct AnimationArgs {
    /// Capture rate (1-120)
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Position scale
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Keep the rig's root rotation in the baked positions
    #[arg(long)]
    no_rotation: bool,

    /// Color mode (ldr or hdr)
    #[arg(long, default_value = "hdr")]
    color: ColorEncoding,

    /// Bake mode (single, individual or array)
    #[arg(short, long, default_value = "individual")]
    mode: BakeMode,

    /// Clip for single mode, by name or index
    #[arg(short, long, default_value = "0")]
    clip: ClipSelector,

    /// First captured frame (single mode)
    #[arg(long, default_value_t = 0)]
    min_frame: u32,

    /// Frame capture stops before this frame (single mode)
    #[arg(long, default_value_t = 200)]
    max_frame: u32,

    /// Texel fill order (column-major or row-major)
    #[arg(long, default_value = "column-major")]
    texel_order: TexelOrder,
}

impl AnimationArgs {
    fn into_config(self) -> AnimationBakeConfig {
        AnimationBakeConfig {
            fps: self.fps,
            scale: self.scale,
            bake_rotation: !self.no_rotation,
            color: self.color,
            mode: self.mode,
            clip: self.clip,
            min_frame: self.min_frame,
            max_frame: self.max_frame,
            texel_order: self.texel_order,
        }
    }
}

/// Directory containing `input`, for default save paths
fn input_dir(input: &Path) -> PathBuf {
    input.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Build { manifest, output } => {
            tracing::info!("Building from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let summary = manifest::build_all(&config, output.as_deref())?;
            tracing::info!(
                "Build complete: {} animation, {} mesh, {} UV job(s), {} file(s) written",
                summary.animations,
                summary.meshes,
                summary.uvs,
                summary.files
            );
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid ({} job(s))", config.job_count());
        }

        Commands::Inspect { input, bake } => {
            let summary = export::inspect_rig(&input, &bake.into_config())?;
            let components = summary.components;
            tracing::info!("Rig '{}' ({} vertices)", summary.name, summary.vertex_count);
            tracing::info!(
                "  skinned mesh: {}, animator: {}, controller: {}",
                components.skinned_mesh,
                components.animator,
                components.controller
            );
            for diagnostic in &summary.diagnostics {
                tracing::warn!("{}", diagnostic);
            }
            if let Some(plan) = &summary.plan {
                for line in plan.to_string().lines() {
                    tracing::info!("  {}", line);
                }
            }
        }

        Commands::Clips { input, fps } => {
            let clips = export::list_clips(&input)?;
            if clips.is_empty() {
                tracing::info!("No animation clips found in {:?}", input);
                return Ok(());
            }
            tracing::info!("Clips in {:?}:", input);
            for (i, clip) in clips.iter().enumerate() {
                tracing::info!(
                    "  [{}] '{}': {:.2}s, {} frames at {} fps",
                    i,
                    clip.name,
                    clip.length,
                    clip.frame_count(fps),
                    fps
                );
            }
        }

        Commands::Animation {
            input,
            output,
            bake,
        } => {
            let mut prompt = OutputPrompt::new(output, input_dir(&input));
            export::export_animation(&input, &bake.into_config(), &mut prompt)?;
        }

        Commands::Mesh {
            input,
            output,
            scale,
            color,
            texel_order,
        } => {
            let config = MeshBakeConfig {
                scale,
                color,
                texel_order,
            };
            let mut prompt = OutputPrompt::new(output, input_dir(&input));
            if let Some(report) = export::export_mesh(&input, &config, &mut prompt)? {
                tracing::info!("Wrote {:?}", report.path);
            }
        }

        Commands::Uv {
            input,
            output,
            channel,
            scale,
        } => {
            let config = UvStampConfig { channel, scale };
            let mut prompt = OutputPrompt::new(output, input_dir(&input));
            if let Some(path) = export::export_uv(&input, &config, &mut prompt)? {
                tracing::info!("Wrote {:?}", path);
            }
        }
    }

    Ok(())
}
