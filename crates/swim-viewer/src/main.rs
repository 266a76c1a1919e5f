//! SwimPath scene runner
//!
//! Builds the swimmer scene, steps the timeline at a fixed rate and writes the
//! deformed meshes of every frame as OBJ files.
//!
//! # Usage
//!
//! ```bash
//! # Default three-swimmer scene with a procedural body, 120 frames
//! swim_viewer
//!
//! # Custom scene and mesh
//! swim_viewer --config scene.json --glb dolphin.glb --frames 300 --out frames/
//! ```

use std::path::{Path, PathBuf};
use std::process;

use swim_core::{Result, SwimError};
use swim_deform::{BoundaryPolicy, GlbFileSource, InMemorySource, TriangleMesh};
use swim_math::Vector3;
use swim_render::{export_frame_obj, SceneConfig, SceneContext};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!(
        r#"SwimPath scene runner

USAGE:
    swim_viewer [OPTIONS]

OPTIONS:
    --config <scene.json>   Scene description (defaults to the built-in scene)
    --glb <mesh.glb>        Swimmer mesh (defaults to a procedural body)
    --frames <N>            Number of frames to run [default: 120]
    --fps <F>               Timeline rate in frames per second [default: 60]
    --out <DIR>             Directory for frame_NNNN.obj files [default: swim_frames]
    --policy <wrap|clamp>   Override the curve boundary policy
    --help                  Show this help message

ENVIRONMENT:
    RUST_LOG                Log filter, e.g. RUST_LOG=debug
"#
    );
}

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    glb: Option<PathBuf>,
    frames: usize,
    fps: f64,
    out: PathBuf,
    policy: Option<BoundaryPolicy>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: None,
            glb: None,
            frames: 120,
            fps: 60.0,
            out: PathBuf::from("swim_frames"),
            policy: None,
        }
    }
}

fn parse_args(raw: &[String]) -> std::result::Result<Args, String> {
    let mut args = Args::default();
    let mut iter = raw.iter();
    while let Some(flag) = iter.next() {
        let mut value = || iter.next().ok_or_else(|| format!("{} requires a value", flag));
        match flag.as_str() {
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--glb" => args.glb = Some(PathBuf::from(value()?)),
            "--frames" => {
                let v = value()?;
                args.frames = v.parse().map_err(|_| format!("invalid frame count: {}", v))?;
            }
            "--fps" => {
                let v = value()?;
                args.fps = v.parse().map_err(|_| format!("invalid fps: {}", v))?;
                if !args.fps.is_finite() || args.fps <= 0.0 {
                    return Err(format!("fps must be positive: {}", v));
                }
            }
            "--out" => args.out = PathBuf::from(value()?),
            "--policy" => {
                args.policy = Some(match value()?.as_str() {
                    "wrap" => BoundaryPolicy::Wrap,
                    "clamp" => BoundaryPolicy::Clamp,
                    other => return Err(format!("unknown policy: {}", other)),
                })
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        process::exit(0);
    }

    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("Error: {}\n", msg);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(exit_code(&e));
    }
}

fn exit_code(err: &SwimError) -> i32 {
    match err {
        SwimError::Config(_) => 2,
        SwimError::AssetLoad(_) | SwimError::Io(_) => 3,
        _ => 4,
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SceneConfig::from_path(path)?,
        None => SceneConfig::default(),
    };
    if let Some(policy) = args.policy {
        config.policy = policy;
    }

    let mut scene = match &args.glb {
        Some(path) => pollster::block_on(SceneContext::setup(&config, &GlbFileSource::new(path)))?,
        None => {
            let body = TriangleMesh::ellipsoid(Vector3::new(2.0, 3.5, 12.0), 12, 16);
            pollster::block_on(SceneContext::setup(&config, &InMemorySource::new(body)))?
        }
    };

    std::fs::create_dir_all(&args.out)?;
    write_shader(&scene, &args.out)?;

    let dt = 1.0 / args.fps;
    for frame in 0..args.frames {
        let swimmers = scene.frame(dt);
        let path = args.out.join(format!("frame_{:04}.obj", frame));
        export_frame_obj(&path, &scene, &swimmers)?;

        let playheads: Vec<String> = swimmers.iter().map(|s| format!("{:.3}", s.playhead)).collect();
        info!(
            frame,
            time = scene.timeline.time(),
            playheads = %playheads.join(" "),
            "wrote {}",
            path.display()
        );
    }

    info!(frames = args.frames, out = %args.out.display(), "done");
    Ok(())
}

fn write_shader(scene: &SceneContext, dir: &Path) -> Result<()> {
    let path = dir.join("swim_deform.wgsl");
    std::fs::write(&path, scene.shader_source()?)?;
    info!(path = %path.display(), "wrote vertex stage");
    Ok(())
}
