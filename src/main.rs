//! Command-line renderer.
//!
//! Usage:
//!   softshade [--config render.json] [--obj mesh.obj] [--mode wireframe|depth|shaded]
//!             [--shading flat|gouraud|phong|0|1|2] [--size 320x240] [--out image.png]
//!
//! Without `--obj` the built-in cube is rendered. Without `--out` the image is
//! written to stdout as plain-text PPM. Logs go to stderr; set `RUST_LOG` to
//! change the level.

use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use softshade::{MeshData, RenderConfig, RenderMode, ShadingMode};
use tracing::info;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    obj: Option<PathBuf>,
    mode: Option<RenderMode>,
    shading: Option<ShadingMode>,
    size: Option<(u32, u32)>,
    out: Option<PathBuf>,
}

const USAGE: &str = "usage: softshade [--config FILE.json] [--obj FILE.obj] \
[--mode wireframe|depth|shaded] [--shading flat|gouraud|phong] [--size WxH] [--out FILE]";

fn parse_size(s: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("size `{s}` is not WIDTHxHEIGHT"))?;
    let width: u32 = w.parse().with_context(|| format!("bad width in `{s}`"))?;
    let height: u32 = h.parse().with_context(|| format!("bad height in `{s}`"))?;
    if width == 0 || height == 0 {
        bail!("size `{s}` must be non-zero");
    }
    Ok((width, height))
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let argv: Vec<String> = env::args().skip(1).collect();
    let mut i = 0;
    while i < argv.len() {
        let flag = argv[i].as_str();
        if flag == "-h" || flag == "--help" {
            println!("{USAGE}");
            std::process::exit(0);
        }
        let Some(value) = argv.get(i + 1) else {
            bail!("missing value for `{flag}`\n{USAGE}");
        };
        match flag {
            "--config" => args.config = Some(PathBuf::from(value)),
            "--obj" => args.obj = Some(PathBuf::from(value)),
            "--mode" => args.mode = Some(value.parse()?),
            "--shading" => args.shading = Some(value.parse()?),
            "--size" => args.size = Some(parse_size(value)?),
            "--out" => args.out = Some(PathBuf::from(value)),
            _ => bail!("unknown argument `{flag}`\n{USAGE}"),
        }
        i += 2;
    }
    Ok(args)
}

fn load_config(args: &Args) -> anyhow::Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            RenderConfig::from_json_str(&text)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => RenderConfig::default(),
    };

    if let Some(mode) = args.mode {
        config.render_mode = mode;
    }
    if let Some(shading) = args.shading {
        config.shading = shading;
    }
    if let Some((width, height)) = args.size {
        config.width = width;
        config.height = height;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args()?;
    let config = load_config(&args)?;

    let mesh = match &args.obj {
        Some(path) => MeshData::from_obj(path).context("load mesh")?,
        None => MeshData::cube(),
    };
    let scene = config.build_scene(mesh).context("build scene")?;

    info!(
        width = config.width,
        height = config.height,
        mode = %config.render_mode,
        shading = %config.shading,
        triangles = scene.triangle_count(),
        "Rendering"
    );
    let mut engine = config.engine();
    let stats = engine.render(&scene);
    info!(
        fragments = stats.fragments,
        culled = stats.culled,
        behind_camera = stats.behind_camera,
        "Rendered"
    );

    let canvas = engine.into_canvas();
    match &args.out {
        Some(path) => {
            canvas
                .save(path, config.max_intensity)
                .with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "Saved image");
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            canvas
                .write_ppm(&mut out, config.max_intensity)
                .context("write PPM to stdout")?;
            out.flush().context("flush stdout")?;
        }
    }
    Ok(())
}
