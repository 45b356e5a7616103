use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::ProgressBar;
use media_convert::{CollisionPolicy, Pipeline, PipelineConfig, RunObserver};
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{
    create_progress_bar, discover, print_summary_report, resolve_worker_count, ConversionResult,
    FfmpegTranscoder, MediaTypeFilter, OutputLayout, ToolPaths,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "media-convert")]
#[command(version, about = "Normalize a media folder: images to JPEG, videos to MP4", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every image and video under FOLDER, deleting the originals
    #[command(name = "run")]
    Run {
        #[arg(value_name = "FOLDER")]
        input: PathBuf,

        #[arg(short, long, value_enum, default_value = "both")]
        media_type: MediaTypeArg,

        /// Parallel conversions (0 = pick from CPU count)
        #[arg(short, long)]
        workers: Option<usize>,

        #[arg(long, value_enum, default_value = "error")]
        on_collision: CollisionArg,

        /// Print the run report as JSON instead of the summary box
        #[arg(long)]
        json: bool,
    },

    /// List what `run` would convert, without touching anything
    Scan {
        #[arg(value_name = "FOLDER")]
        input: PathBuf,

        #[arg(short, long, value_enum, default_value = "both")]
        media_type: MediaTypeArg,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MediaTypeArg {
    Images,
    Videos,
    Both,
}

impl From<MediaTypeArg> for MediaTypeFilter {
    fn from(arg: MediaTypeArg) -> Self {
        match arg {
            MediaTypeArg::Images => MediaTypeFilter::Images,
            MediaTypeArg::Videos => MediaTypeFilter::Videos,
            MediaTypeArg::Both => MediaTypeFilter::Both,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CollisionArg {
    Error,
    Suffix,
    Overwrite,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Error => CollisionPolicy::Error,
            CollisionArg::Suffix => CollisionPolicy::Suffix,
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
        }
    }
}

/// Prints each result above a progress bar as it arrives.
struct ProgressObserver {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl RunObserver for ProgressObserver {
    fn on_start(&mut self, total: usize) {
        self.bar = Some(create_progress_bar(total as u64, "Converting", self.quiet));
    }

    fn on_result(&mut self, result: &ConversionResult) {
        let Some(bar) = &self.bar else {
            return;
        };
        if !self.quiet {
            let line = if result.success {
                format!("{} {}", style("✅").green(), result.message)
            } else {
                format!("{} {}", style("❌").red(), style(&result.message).red())
            };
            bar.println(line);
        }
        bar.set_message(result.source_name.clone());
        bar.inc(1);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    if let Err(e) = init_logging("media_convert", LogConfig::default().with_level(level)) {
        eprintln!("⚠️  Logging disabled: {:#}", e);
    }

    match cli.command {
        Commands::Run {
            input,
            media_type,
            workers,
            on_collision,
            json,
        } => run_command(input, media_type.into(), workers, on_collision.into(), json),
        Commands::Scan { input, media_type } => scan_command(input, media_type.into()),
    }
}

fn run_command(
    input: PathBuf,
    filter: MediaTypeFilter,
    workers: Option<usize>,
    collision: CollisionPolicy,
    json: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let tools = ToolPaths::detect();
    if tools.missing().contains(&"ffmpeg") {
        warn!(
            ffmpeg = %tools.ffmpeg.display(),
            "ffmpeg not found; only files already in JPEG/MP4 can be processed"
        );
    }

    let mut config = PipelineConfig {
        max_workers: resolve_worker_count(workers),
        ..PipelineConfig::default()
    };
    config.conversion.collision = collision;

    info!(
        input = %input.display(),
        workers = config.max_workers,
        collision = ?collision,
        "🎬 Media normalization"
    );

    let pipeline = Pipeline::new(Arc::new(FfmpegTranscoder::new(&tools.ffmpeg)), config);
    let mut observer = ProgressObserver {
        bar: None,
        quiet: json,
    };
    let report = pipeline
        .run_with_observer(&input, filter, &mut observer)
        .with_context(|| format!("Conversion of {} aborted", input.display()))?;

    if let Some(bar) = observer.bar.take() {
        bar.finish_and_clear();
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else if report.is_empty() {
        println!("📂 Nothing to do in {}", input.display());
    } else {
        print_summary_report(&report.summary, start_time.elapsed(), "Media Conversion");
    }

    if !report.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

fn scan_command(input: PathBuf, filter: MediaTypeFilter) -> anyhow::Result<()> {
    let files = discover(&input, filter, &OutputLayout::default())
        .with_context(|| format!("Failed to scan {}", input.display()))?;

    if files.is_empty() {
        println!("📂 No media files found in {}", input.display());
        return Ok(());
    }

    for file in &files {
        let action = if file.kind.is_canonical(&file.path) {
            "move"
        } else {
            "convert"
        };
        println!("{:<6} {:<8} {}", file.kind.as_str(), action, file.path.display());
    }
    println!("📂 Found {} files", files.len());
    Ok(())
}
