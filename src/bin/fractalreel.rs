use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::Level;

use fractalreel::{
    Animation, AntiAliasTier, Codec, Container, DirectoryDelivery, ExportOutcome, ExportPhase,
    ExportRequest, ExportSettings, Exporter, ExporterConfig, FfmpegEncoder, FfmpegEncoderOpts,
    OverlaySettings, PrecisionMode,
};

#[derive(Parser, Debug)]
#[command(name = "fractalreel", version)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export an animation to video (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Render a single instant of an animation as a PNG.
    Frame(FrameArgs),
    /// Print timeline and precision information for an animation.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output video path. Defaults to the animation name in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Worker threads for the exact backend.
    #[arg(long)]
    threads: Option<usize>,

    /// Override the zoom factor at which `auto` precision switches to the exact backend.
    #[arg(long)]
    precision_threshold: Option<f64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timeline position in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    time_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Args, Debug, Default)]
struct SettingsArgs {
    /// Export settings JSON; flags below override its fields.
    #[arg(long = "settings")]
    settings_path: Option<PathBuf>,
    /// Frames per second (30 or 60).
    #[arg(long)]
    fps: Option<u32>,
    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,
    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,
    /// Bitrate quality in (0, 1].
    #[arg(long)]
    quality: Option<f64>,
    /// Video codec.
    #[arg(long, value_enum)]
    codec: Option<CodecArg>,
    /// Container format. Inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    container: Option<ContainerArg>,
    /// Anti-aliasing tier.
    #[arg(long, value_enum)]
    aa: Option<AaArg>,
    /// Backend selection policy.
    #[arg(long, value_enum)]
    precision: Option<PrecisionArg>,
    /// Draw the zoom overlay.
    #[arg(long)]
    overlay: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CodecArg {
    H264,
    H265,
    Vp9,
    Av1,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContainerArg {
    Mp4,
    Webm,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AaArg {
    Off,
    Low,
    Medium,
    High,
    Ultra,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PrecisionArg {
    Auto,
    Gpu,
    Cpu,
}

impl SettingsArgs {
    fn resolve(&self, out: Option<&Path>) -> anyhow::Result<ExportSettings> {
        let mut s = match self.settings_path.as_ref() {
            Some(path) => {
                let f = File::open(path)
                    .with_context(|| format!("open settings '{}'", path.display()))?;
                ExportSettings::from_json_reader(BufReader::new(f))?
            }
            None => ExportSettings::default(),
        };

        if let Some(fps) = self.fps {
            s.fps = fps;
        }
        if let Some(width) = self.width {
            s.width = width;
        }
        if let Some(height) = self.height {
            s.height = height;
        }
        if let Some(q) = self.quality {
            s.bitrate_quality = q;
        }
        let inferred = out
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .and_then(|e| match e.to_ascii_lowercase().as_str() {
                "mp4" => Some(Container::Mp4),
                "webm" => Some(Container::Webm),
                _ => None,
            });
        if let Some(container) = self.container.map(Container::from).or(inferred) {
            s.container = container;
        }
        match self.codec {
            Some(codec) => s.codec = codec.into(),
            None if !s.codec.fits(s.container) => {
                s.codec = match s.container {
                    Container::Mp4 => Codec::H264,
                    Container::Webm => Codec::Vp9,
                }
            }
            None => {}
        }
        if let Some(aa) = self.aa {
            s.anti_alias = aa.into();
        }
        if let Some(p) = self.precision {
            s.precision = p.into();
        }
        if self.overlay && s.overlay.is_none() {
            s.overlay = Some(OverlaySettings::default());
        }
        Ok(s)
    }
}

impl From<CodecArg> for Codec {
    fn from(v: CodecArg) -> Self {
        match v {
            CodecArg::H264 => Self::H264,
            CodecArg::H265 => Self::H265,
            CodecArg::Vp9 => Self::Vp9,
            CodecArg::Av1 => Self::Av1,
        }
    }
}

impl From<ContainerArg> for Container {
    fn from(v: ContainerArg) -> Self {
        match v {
            ContainerArg::Mp4 => Self::Mp4,
            ContainerArg::Webm => Self::Webm,
        }
    }
}

impl From<AaArg> for AntiAliasTier {
    fn from(v: AaArg) -> Self {
        match v {
            AaArg::Off => Self::Off,
            AaArg::Low => Self::Low,
            AaArg::Medium => Self::Medium,
            AaArg::High => Self::High,
            AaArg::Ultra => Self::Ultra,
        }
    }
}

impl From<PrecisionArg> for PrecisionMode {
    fn from(v: PrecisionArg) -> Self {
        match v {
            PrecisionArg::Auto => Self::Auto,
            PrecisionArg::Gpu => Self::Gpu,
            PrecisionArg::Cpu => Self::Cpu,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn load_animation(path: &Path) -> anyhow::Result<Animation> {
    let f = File::open(path).with_context(|| format!("open animation '{}'", path.display()))?;
    let anim = Animation::from_json_reader(BufReader::new(f))
        .with_context(|| format!("parse animation '{}'", path.display()))?;
    Ok(anim)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let animation = load_animation(&args.in_path)?;
    let settings = args.settings.resolve(args.out.as_deref())?;

    let mut config = ExporterConfig {
        exact_threads: args.threads,
        ..ExporterConfig::default()
    };
    if let Some(threshold) = args.precision_threshold {
        config.precision_threshold = threshold;
    }

    let mut req = ExportRequest::new(animation, settings);
    let out_dir = match args.out.as_ref() {
        Some(out) => {
            req.file_name = out
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            out.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        }
        None => PathBuf::from("."),
    };

    let encoder = FfmpegEncoder::new(FfmpegEncoderOpts::new(&out_dir));
    let delivery = DirectoryDelivery::new(&out_dir);
    let handle = fractalreel::spawn_export(
        Exporter::builtin(config),
        req,
        Box::new(encoder),
        Box::new(delivery),
    )?;

    // Ctrl-C stops at the next frame boundary; the encoder then removes its partial output.
    let token = handle.cancel_token();
    ctrlc::set_handler(move || {
        if !token.is_cancelled() {
            eprintln!("cancelling export...");
        }
        token.cancel();
    })
    .context("install Ctrl-C handler")?;

    let mut last_decile = None;
    for p in handle.progress().iter() {
        let decile = (p.percent / 10.0).floor() as u32;
        if p.phase == ExportPhase::Rendering && last_decile != Some(decile) {
            eprintln!(
                "rendering {:>3.0}% ({}/{})",
                p.percent, p.current_frame, p.total_frames
            );
            last_decile = Some(decile);
        }
    }

    match handle.wait()? {
        ExportOutcome::Completed(media) => {
            let path = media
                .location
                .map(|p| p.display().to_string())
                .unwrap_or(media.filename);
            eprintln!("wrote {path} ({} bytes)", media.bytes);
        }
        ExportOutcome::Cancelled => eprintln!("export cancelled"),
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let animation = load_animation(&args.in_path)?;
    let settings = args.settings.resolve(None)?;
    let exporter = Exporter::builtin(ExporterConfig::default());
    let (backend, frame) = exporter.render_still(&animation, &settings, args.time_ms)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({backend} backend)", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let animation = load_animation(&args.in_path)?;
    animation.validate()?;
    let settings = args.settings.resolve(None)?;
    let selector = ExporterConfig::default().selector();
    let total = fractalreel::frame_count(animation.total_duration_ms(), settings.fps);

    println!("name: {}", animation.name);
    println!("keyframes: {}", animation.keyframes.len());
    println!("duration: {} ms", animation.total_duration_ms());
    println!("frames: {total} @ {} fps", settings.fps);
    println!("exportable: {}", animation.is_exportable());
    for k in &animation.keyframes {
        let zoom = selector.zoom_factor(&k.view_bounds);
        let backend = selector.select_backend(settings.precision, &k.view_bounds);
        println!(
            "  #{:<4} t={:>7}ms dur={:>6}ms zoom={zoom:>12.2}x backend={backend} center={}",
            k.id,
            k.timestamp_ms,
            k.duration_ms,
            k.view_bounds.center()
        );
    }
    Ok(())
}
