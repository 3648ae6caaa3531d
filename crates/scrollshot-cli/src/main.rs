//! scrollshot: Command-line front end for scrolling screenshots
//!
//! `record` captures a screen region while scrolling the content under it
//! and saves the stitched result. `stitch` composes existing screenshots
//! with the same layouts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use scrollshot_core::capture::constants::{DEFAULT_PIXELS_PER_NOTCH, PREVIEW_MAX_WIDTH};
use scrollshot_core::capture::{Frame, create_default_backend};
use scrollshot_core::model::{CaptureRegion, ExportOptions, GridParams, StitchMode};
use scrollshot_core::session::{CaptureController, SessionConfig, SessionEvent};
use scrollshot_core::stitch::{StitchResult, stitch};
use scrollshot_core::util::export::{default_output_path, export_preview, export_to_file};

#[derive(Parser)]
#[command(name = "scrollshot")]
#[command(about = "Scrolling screenshot capture and stitching")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a region while scrolling, then stitch and save
    Record(RecordArgs),
    /// Stitch existing screenshots into one image
    Stitch(StitchArgs),
}

#[derive(Args)]
struct RecordArgs {
    /// Left edge of the region, in screen pixels
    #[arg(long, allow_negative_numbers = true)]
    x:                i32,
    /// Top edge of the region, in screen pixels
    #[arg(long, allow_negative_numbers = true)]
    y:                i32,
    /// Region width
    #[arg(long)]
    width:            u32,
    /// Region height
    #[arg(long)]
    height:           u32,
    #[command(flatten)]
    layout:           LayoutArgs,
    /// Similarity (0.0-1.0) at or above which a frame counts as unchanged
    #[arg(long)]
    threshold:        Option<f64>,
    /// Consecutive unchanged frames that end the session
    #[arg(long)]
    max_no_change:    Option<u32>,
    /// Wait after each scroll, in milliseconds
    #[arg(long)]
    settle_ms:        Option<u64>,
    /// Capture interval without auto-scroll, in milliseconds
    #[arg(long)]
    interval_ms:      Option<u64>,
    /// Only capture; scroll the content yourself
    #[arg(long)]
    no_auto_scroll:   bool,
    /// Scroll pixels represented by one wheel notch
    #[arg(long, default_value_t = DEFAULT_PIXELS_PER_NOTCH)]
    pixels_per_notch: u32,
    /// JSON session config; flags override its values
    #[arg(long)]
    config:           Option<PathBuf>,
    /// Print session events as JSON lines
    #[arg(long)]
    json:             bool,
    #[command(flatten)]
    output:           OutputArgs,
}

#[derive(Args)]
struct StitchArgs {
    /// Images to stitch, in order
    #[arg(required = true)]
    files:  Vec<PathBuf>,
    #[command(flatten)]
    layout: LayoutArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct LayoutArgs {
    /// Composite layout
    #[arg(long, value_enum, default_value_t = LayoutMode::Vertical)]
    mode:        LayoutMode,
    /// Grid gap in pixels
    #[arg(long)]
    gap:         Option<u32>,
    /// Largest grid column count considered
    #[arg(long)]
    max_columns: Option<u32>,
    /// Grid background as RRGGBB
    #[arg(long, value_parser = parse_background)]
    background:  Option<[u8; 3]>,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file (.png or .jpg); defaults to a timestamped PNG here
    #[arg(short, long)]
    out:     Option<PathBuf>,
    /// JPEG quality (1-100)
    #[arg(long, default_value_t = 100)]
    quality: u8,
    /// Also write a copy scaled down to the preview width
    #[arg(long)]
    preview: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum LayoutMode {
    Vertical,
    Grid,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scrollshot=info".parse()?)
                .add_directive("scrollshot_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record(args) => record(args).await?,
        Commands::Stitch(args) => stitch_files(args)?,
    }

    Ok(())
}

async fn record(args: RecordArgs) -> Result<()> {
    let region = CaptureRegion::new(args.x, args.y, args.width, args.height)?;
    let config = session_config(&args)?;
    let mode = args.layout.stitch_mode();
    let opts = args.output.export_options()?;
    tracing::debug!("Session config: {:?}", config);

    let backend = create_default_backend(region, args.pixels_per_notch)
        .map_err(|e| anyhow::anyhow!("{} ({})", e, e.remediation_hint()))?;

    let mut controller = CaptureController::new(backend, config);
    controller.set_region(region);
    let mut events = controller.start()?;

    let stop = controller.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Stopping...");
            stop.stop();
        }
    });

    eprintln!("Recording {} (Ctrl-C to stop)", region);
    while let Some(event) = events.recv().await {
        if args.json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            print_event(&event);
        }
    }

    match controller.finish_and_stitch(&mode).await? {
        Some(result) => save(&result, &args.output, &opts),
        None => {
            eprintln!("No frames captured, nothing saved");
            Ok(())
        }
    }
}

fn stitch_files(args: StitchArgs) -> Result<()> {
    let frames = args
        .files
        .iter()
        .map(|path| load_frame(path))
        .collect::<Result<Vec<_>>>()?;

    let opts = args.output.export_options()?;
    let result = stitch(&frames, &args.layout.stitch_mode())?;
    save(&result, &args.output, &opts)
}

fn load_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path).with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(Frame::from_dynamic(image))
}

fn save(result: &StitchResult, output: &OutputArgs, opts: &ExportOptions) -> Result<()> {
    let path = match &output.out {
        Some(path) => path.clone(),
        None => default_output_path(&std::env::current_dir()?),
    };

    let bytes = export_to_file(result, &path, opts)?;
    println!(
        "✓ Saved {}x{} {} composite of {} frames to {} ({} bytes)",
        result.width(),
        result.height(),
        result.mode(),
        result.frame_count(),
        path.display(),
        bytes
    );

    if let Some(preview) = &output.preview {
        let bytes = export_preview(result, preview, PREVIEW_MAX_WIDTH, opts)?;
        println!("✓ Saved preview to {} ({} bytes)", preview.display(), bytes);
    }
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Started => println!("Recording started"),
        SessionEvent::FrameCaptured {
            index,
            similarity,
            no_change_count,
        } => match similarity {
            Some(similarity) => println!(
                "  frame {} (similarity {}, unchanged streak {})",
                index, similarity, no_change_count
            ),
            None => println!("  frame {}", index),
        },
        SessionEvent::CaptureFailed { reason } => println!("  capture failed: {}", reason),
        SessionEvent::ScrollFailed { reason } => println!("  scroll failed: {}", reason),
        SessionEvent::Stopped {
            reason,
            frame_count,
        } => println!("Stopped ({}) after {} frames", reason, frame_count),
    }
}

/// Defaults, then the config file, then explicit flags
fn session_config(args: &RecordArgs) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str::<SessionConfig>(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => SessionConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.similarity_threshold = threshold;
    }
    if let Some(streak) = args.max_no_change {
        config.max_no_change_streak = streak;
    }
    if let Some(settle) = args.settle_ms {
        config.settle_delay_ms = settle;
    }
    if let Some(interval) = args.interval_ms {
        config.manual_capture_interval_ms = interval;
    }
    if args.no_auto_scroll {
        config.auto_scroll_enabled = false;
    }

    config.validate()?;
    Ok(config)
}

impl OutputArgs {
    fn export_options(&self) -> Result<ExportOptions> {
        if !(1..=100).contains(&self.quality) {
            anyhow::bail!("Quality must be between 1 and 100");
        }

        Ok(ExportOptions {
            jpeg_quality: self.quality,
            ..ExportOptions::default()
        })
    }
}

impl LayoutArgs {
    fn stitch_mode(&self) -> StitchMode {
        match self.mode {
            LayoutMode::Vertical => StitchMode::Vertical,
            LayoutMode::Grid => {
                let defaults = GridParams::default();
                StitchMode::Grid(GridParams {
                    gap:         self.gap.unwrap_or(defaults.gap),
                    max_columns: self.max_columns.unwrap_or(defaults.max_columns),
                    background:  self.background.unwrap_or(defaults.background),
                })
            }
        }
    }
}

fn parse_background(value: &str) -> Result<[u8; 3], String> {
    let hex = value.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("'{}' is not an RRGGBB color", value));
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse_record(args: &[&str]) -> RecordArgs {
        let cli = Cli::try_parse_from(
            ["scrollshot", "record", "--x", "0", "--y", "0", "--width", "800", "--height", "600"]
                .iter()
                .chain(args),
        )
        .unwrap();
        match cli.command {
            Commands::Record(args) => args,
            Commands::Stitch(_) => panic!("expected record"),
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_background() {
        assert_eq!(parse_background("ffffff").unwrap(), [255, 255, 255]);
        assert_eq!(parse_background("#102030").unwrap(), [0x10, 0x20, 0x30]);
        assert!(parse_background("fff").is_err());
        assert!(parse_background("gg0000").is_err());
    }

    #[test]
    fn test_grid_flags() {
        let args = parse_record(&["--mode", "grid", "--gap", "5", "--background", "000000"]);
        let StitchMode::Grid(params) = args.layout.stitch_mode() else {
            panic!("expected grid mode");
        };

        assert_eq!(params.gap, 5);
        assert_eq!(params.max_columns, GridParams::default().max_columns);
        assert_eq!(params.background, [0, 0, 0]);
    }

    #[test]
    fn test_negative_origin() {
        let cli = Cli::try_parse_from([
            "scrollshot", "record", "--x", "-1920", "--y", "-20", "--width", "10", "--height", "10",
        ])
        .unwrap();
        let Commands::Record(args) = cli.command else {
            panic!("expected record");
        };
        assert_eq!((args.x, args.y), (-1920, -20));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"similarity_threshold": 0.8, "settle_delay_ms": 900}"#).unwrap();

        let args = parse_record(&[
            "--config",
            path.to_str().unwrap(),
            "--threshold",
            "0.97",
            "--no-auto-scroll",
        ]);
        let config = session_config(&args).unwrap();

        assert_eq!(config.similarity_threshold, 0.97);
        assert_eq!(config.settle_delay_ms, 900);
        assert!(!config.auto_scroll_enabled);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let args = parse_record(&["--threshold", "1.5"]);
        assert!(session_config(&args).is_err());
    }

    #[test]
    fn test_quality_range() {
        assert!(parse_record(&["--quality", "0"]).output.export_options().is_err());
        let opts = parse_record(&["--quality", "85"]).output.export_options().unwrap();
        assert_eq!(opts.jpeg_quality, 85);
    }

    #[test]
    fn test_stitch_files_with_preview() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for shade in [0u8, 120, 240] {
            let path = dir.path().join(format!("shot_{}.png", shade));
            image::RgbImage::from_pixel(1000, 50, image::Rgb([shade, shade, shade]))
                .save(&path)
                .unwrap();
            files.push(path.to_str().unwrap().to_string());
        }
        let out = dir.path().join("long.png");
        let preview = dir.path().join("preview.png");

        let mut argv = vec!["scrollshot".to_string(), "stitch".to_string()];
        argv.extend(files);
        argv.extend([
            "--out".to_string(),
            out.to_str().unwrap().to_string(),
            "--preview".to_string(),
            preview.to_str().unwrap().to_string(),
        ]);
        let Commands::Stitch(args) = Cli::try_parse_from(argv).unwrap().command else {
            panic!("expected stitch");
        };

        stitch_files(args).unwrap();

        assert_eq!(image::image_dimensions(&out).unwrap(), (1000, 150));
        assert_eq!(image::image_dimensions(&preview).unwrap(), (PREVIEW_MAX_WIDTH, 120));
    }

    #[test]
    fn test_stitch_requires_files() {
        assert!(Cli::try_parse_from(["scrollshot", "stitch"]).is_err());
    }
}
