use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use facelapse::{
    ExportConfig, ExportOptions, ExportOutcome, FfmpegSink, FfmpegSinkOpts, FsPhotoLoader,
    ManifestEyeLocator, PhotoManifest, PngSequenceSink, VideoSink,
};

#[derive(Parser, Debug)]
#[command(name = "facelapse", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the photo series to an MP4 (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
    /// Composite a single photo as a PNG, exactly as it would appear in the video.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct SharedArgs {
    /// Photo manifest JSON. Photo paths are resolved relative to its directory.
    #[arg(long)]
    manifest: PathBuf,

    /// Export config JSON. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output frame rate (5, 10, 15, 24, 30 or 60).
    #[arg(long)]
    fps: Option<u32>,

    /// Canvas width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Disable eye alignment (plain aspect-fit for every photo).
    #[arg(long, default_value_t = false)]
    no_align: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Output MP4 path.
    #[arg(long, required_unless_present = "png_dir")]
    out: Option<PathBuf>,

    /// Write frames as PNGs into this directory instead of encoding an MP4.
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Fail instead of replacing an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Photo index in chronological order (0-based).
    #[arg(long)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

struct Inputs {
    manifest: PhotoManifest,
    loader: FsPhotoLoader,
    config: ExportConfig,
}

fn load_inputs(args: &SharedArgs) -> anyhow::Result<Inputs> {
    let manifest = PhotoManifest::from_path(&args.manifest)?;
    let root = args
        .manifest
        .parent()
        .unwrap_or_else(|| Path::new("."));

    let mut config = match &args.config {
        Some(path) => ExportConfig::from_path(path)?,
        None => ExportConfig::default(),
    };
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if let Some(w) = args.width {
        config.canvas.width = w;
    }
    if let Some(h) = args.height {
        config.canvas.height = h;
    }
    if args.no_align {
        config.align = false;
    }
    config.validate()?;

    Ok(Inputs {
        manifest,
        loader: FsPhotoLoader::new(root),
        config,
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut inputs = load_inputs(&args.shared)?;
    if args.no_overwrite {
        inputs.config.overwrite = false;
    }

    let outcome = match &args.png_dir {
        Some(dir) => run_with_sink(inputs, PngSequenceSink::new(dir))?,
        None => {
            let out = args.out.as_ref().context("--out is required for MP4 output")?;
            let sink = FfmpegSink::new(FfmpegSinkOpts {
                overwrite: inputs.config.overwrite,
                ..FfmpegSinkOpts::new(out)
            });
            run_with_sink(inputs, sink)?
        }
    };

    match outcome {
        ExportOutcome::Written(report) => {
            tracing::info!(
                frames = report.frames_appended,
                skipped = report.frames_skipped,
                aligned = report.frames_aligned,
                duration_secs = report.duration_secs,
                "export finished"
            );
            if let Some(path) = report.output_path {
                eprintln!("wrote {}", path.display());
            }
        }
        ExportOutcome::NothingToExport => eprintln!("nothing to export: manifest has no photos"),
    }
    Ok(())
}

fn run_with_sink<S: VideoSink + 'static>(
    inputs: Inputs,
    sink: S,
) -> anyhow::Result<ExportOutcome> {
    let locator = ManifestEyeLocator::new(&inputs.manifest);
    let (tx, rx) = mpsc::channel();
    let opts = ExportOptions::new(inputs.config).with_progress(tx);

    let worker = facelapse::spawn_export(
        inputs.manifest.source_photos(),
        inputs.loader,
        locator,
        sink,
        opts,
    )?;

    let mut next_decile = 1u32;
    for fraction in rx {
        tracing::debug!(fraction, "progress");
        while f64::from(next_decile) / 10.0 <= fraction && next_decile <= 10 {
            tracing::info!("progress {}%", next_decile * 10);
            next_decile += 1;
        }
    }

    let outcome = worker
        .join()
        .map_err(|_| anyhow::anyhow!("export worker panicked"))??;
    Ok(outcome)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let inputs = load_inputs(&args.shared)?;
    let mut locator = ManifestEyeLocator::new(&inputs.manifest);

    let frame = facelapse::preview_frame(
        inputs.manifest.source_photos(),
        args.index,
        &inputs.loader,
        &mut locator,
        &inputs.config,
    )?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    facelapse::write_png(&args.out, &frame, inputs.config.background_rgba)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
