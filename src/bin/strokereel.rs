use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "strokereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a session script and record it as an MP4 (requires `ffmpeg` on PATH).
    Replay(ReplayArgs),
    /// Print estimated durations for a session script.
    Estimate(EstimateArgs),
    /// Print the dense curve for a single stroke as JSON.
    Curve(CurveArgs),
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Session config JSON; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-point advance delay in milliseconds.
    #[arg(long)]
    point_delay_ms: Option<u64>,

    /// Capture ticks per second.
    #[arg(long)]
    capture_fps: Option<u32>,
}

impl ConfigArgs {
    fn load(&self) -> anyhow::Result<strokereel::SessionConfig> {
        let mut cfg = match &self.config {
            Some(path) => strokereel::SessionConfig::from_path(path)?,
            None => strokereel::SessionConfig::default(),
        };
        if let Some(ms) = self.point_delay_ms {
            cfg.point_delay_ms = ms;
        }
        if let Some(fps) = self.capture_fps {
            cfg.capture_fps = fps;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Input session script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,

    /// Frame staging directory.
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Skip the step banner on captured frames.
    #[arg(long, default_value_t = false)]
    no_overlay: bool,

    /// Fixed output fps (used as given, no clamping).
    #[arg(long, conflicts_with = "duration")]
    fps: Option<f64>,

    /// Target video length in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Fit the video to the measured playback time instead of the estimate.
    #[arg(long, default_value_t = false)]
    measured: bool,
}

#[derive(Parser, Debug)]
struct EstimateArgs {
    /// Input session script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct CurveArgs {
    /// Input stroke JSON (`{"x": [...], "y": [...], "t": [...]}`).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Pretty-print the output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
        Command::Estimate(args) => cmd_estimate(args),
        Command::Curve(args) => cmd_curve(args),
    }
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let mut cfg = args.config.load()?;
    if let Some(dir) = args.staging_dir {
        cfg.staging_dir = dir;
    }
    if args.no_overlay {
        cfg.overlay = false;
    }
    if args.fps.is_some() {
        cfg.output_fps = args.fps;
    }
    if args.duration.is_some() {
        cfg.target_duration_secs = args.duration;
    }
    if args.measured {
        cfg.duration_source = strokereel::DurationSource::Measured;
    }
    cfg.validate()?;

    let script = strokereel::SessionScript::from_path(&args.in_path)?;
    let surface =
        strokereel::RasterSurface::new(cfg.canvas, strokereel::RasterSurfaceOpts::default())?;
    let mut session = strokereel::DrawingSession::new(Arc::new(surface), cfg)?;

    let report = session.run(&script, &mut strokereel::ThreadPacer)?;
    let mut sink = strokereel::FfmpegSink::new(strokereel::FfmpegSinkOpts::new(&args.out));
    let video = session.export(&report, &mut sink)?;

    eprintln!(
        "wrote {} ({} frames at {:.2} fps, {:.2}s)",
        args.out.display(),
        video.frames,
        video.fps,
        video.duration_secs
    );
    Ok(())
}

fn cmd_estimate(args: EstimateArgs) -> anyhow::Result<()> {
    let cfg = args.config.load()?;
    let script = strokereel::SessionScript::from_path(&args.in_path)?;
    let interpolator = strokereel::SplineInterpolator::default();
    let estimator = cfg.estimator();

    let mut per_instruction = Vec::new();
    for instruction in script.instructions(cfg.canvas) {
        let counts = instruction
            .strokes
            .iter()
            .map(|s| interpolator.interpolate(s).map(|c| c.len()))
            .collect::<Result<Vec<_>, _>>()?;
        println!(
            "step {}: {} strokes, {:.2}s",
            instruction.step_number,
            counts.len(),
            estimator.instruction(&counts).as_secs_f64()
        );
        per_instruction.push(counts);
    }
    println!(
        "session: {:.2}s",
        estimator.session(&per_instruction).as_secs_f64()
    );
    Ok(())
}

fn cmd_curve(args: CurveArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read stroke '{}'", args.in_path.display()))?;
    let def: strokereel::StrokeDef = serde_json::from_str(&text).context("parse stroke JSON")?;
    let stroke =
        strokereel::Stroke::from_def_or_fallback(0, &def, strokereel::DrawingSpace::default());
    let curve = strokereel::SplineInterpolator::default().interpolate(&stroke)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&curve)
    } else {
        serde_json::to_string(&curve)
    }
    .context("serialize dense curve")?;
    println!("{json}");
    Ok(())
}
