use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use scenecraft::{
    AssetKind, AssetSpec, Canvas, CompositingContext, ExportConfig, ExportManager, ExportRequest,
    ExportState, ExportTarget, Fps, LayerObjectIndex, Rect, Scene, SystemEncoderFactory,
    TextAsset,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scenecraft", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Export an MP4 (requires `ffmpeg` on PATH) or a GIF, picked by the output extension.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Asset to place: `kind:path@x,y,w,h[,deg][#g0/g1:layer]`.
    ///
    /// Kinds are `image`, `gif`, `gif-once`, `video` and `text`; text takes words in place of
    /// the path. Repeat to add more assets; later assets on the same layer draw on top.
    #[arg(long = "asset", required = true)]
    assets: Vec<String>,

    /// Canvas size.
    #[arg(long, default_value = "1080x1920")]
    size: String,

    /// Extra directory of font files for text assets.
    #[arg(long)]
    font_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Scene time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Scene duration in seconds.
    #[arg(long)]
    duration: f64,

    /// Frame rate, `N` or `N/D`.
    #[arg(long, default_value = "30")]
    fps: String,

    /// Output `.mp4` or `.gif` path.
    #[arg(long)]
    out: PathBuf,

    /// Export config JSON; `SCENECRAFT_*` environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let ctx = context(&args.scene);
    // A single frame only needs the scene to cover `time`.
    let duration = (args.time + 1.0).max(1.0);
    let mut scene = build_scene(&ctx, &args.scene, duration, Fps::new(30, 1)?)?;

    let image = scene.render(&ctx, args.time, 0.0, None);
    let buffer = ctx.to_output_buffer(image.as_ref(), scene.canvas())?;

    scenecraft::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &buffer.straight_data(),
        buffer.width,
        buffer.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => ExportConfig::default(),
    }
    .apply_env();

    let ctx = context(&args.scene);
    let fps = Fps::parse(&args.fps)?;
    let scene = build_scene(&ctx, &args.scene, args.duration, fps)?;

    let manager = ExportManager::new(Arc::new(ctx), Arc::new(SystemEncoderFactory), config)?;
    let (tx, rx) = mpsc::channel();
    let request = ExportRequest::new(scene, ExportTarget::from_path(&args.out))
        .with_progress(|p| tracing::debug!(scene = %p.scene_id, fraction = p.fraction, "progress"))
        .on_complete(move |result| {
            let _ = tx.send(result);
        });
    manager.submit(request)?;
    manager.shutdown()?;

    let report = rx.recv().context("export worker exited without a result")??;
    if report.state != ExportState::Done {
        bail!("export of '{}' ended in state {:?}", args.out.display(), report.state);
    }
    eprintln!(
        "wrote {} ({} frames, {} skipped, {} dropped)",
        args.out.display(),
        report.frames_rendered,
        report.frames_skipped,
        report.frames_dropped
    );
    Ok(())
}

fn context(args: &SceneArgs) -> CompositingContext {
    let ctx = CompositingContext::default();
    match &args.font_dir {
        Some(dir) => ctx.with_font_dir(dir),
        None => ctx,
    }
}

fn build_scene(
    ctx: &CompositingContext,
    args: &SceneArgs,
    duration: f64,
    fps: Fps,
) -> anyhow::Result<Scene> {
    let canvas = Canvas::parse(&args.size)?;
    let mut scene = Scene::new(duration, fps)?.with_canvas(canvas);
    for raw in &args.assets {
        let (asset, index) = parse_asset(raw)?;
        scene
            .add_asset(ctx, &index, &asset)
            .with_context(|| format!("add asset '{raw}'"))?;
    }
    Ok(scene)
}

fn parse_asset(raw: &str) -> anyhow::Result<(AssetSpec, LayerObjectIndex)> {
    let (body, index) = match raw.rsplit_once('#') {
        Some((body, index)) => (body, LayerObjectIndex::parse(index)?),
        None => (raw, LayerObjectIndex::default()),
    };
    let (head, geometry) = body
        .rsplit_once('@')
        .with_context(|| format!("asset '{raw}' needs '@x,y,w,h'"))?;
    let (kind, target) = head
        .split_once(':')
        .with_context(|| format!("asset '{raw}' needs 'kind:'"))?;

    let nums = geometry
        .split(',')
        .map(|n| n.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid geometry in asset '{raw}'"))?;
    let (frame, degrees) = match nums.as_slice() {
        [x, y, w, h] => (Rect::new(*x, *y, x + w, y + h), 0.0),
        [x, y, w, h, deg] => (Rect::new(*x, *y, x + w, y + h), *deg),
        _ => bail!("asset '{raw}' geometry must be x,y,w,h[,deg]"),
    };

    let kind = match kind.trim() {
        "image" => AssetKind::Image(path(target)),
        "gif" => AssetKind::Gif {
            path: path(target),
            looping: true,
        },
        "gif-once" => AssetKind::Gif {
            path: path(target),
            looping: false,
        },
        "video" => AssetKind::Video(path(target)),
        "text" => AssetKind::Text(TextAsset::new(
            target.split_whitespace().map(str::to_owned).collect(),
        )),
        other => bail!("unknown asset kind '{other}' in '{raw}'"),
    };

    Ok((
        AssetSpec {
            kind,
            frame,
            rotation: degrees.to_radians(),
        },
        index,
    ))
}

fn path(s: &str) -> PathBuf {
    Path::new(s.trim()).to_path_buf()
}
