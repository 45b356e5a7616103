use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use console::style;
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{resolve_worker_count, FfmpegTranscoder, FfprobeProber, ToolPaths};
use std::path::{Path, PathBuf};
use tracing::Level;
use vid_res::{
    analyze_directory, generate_filler, ResolutionAnalysis, TargetResolution,
    DEFAULT_FILLER_DURATION_SECS, DEFAULT_FILLER_FILE_NAME,
};

#[derive(Parser)]
#[command(name = "vid-res")]
#[command(version, about = "Video resolution fitter and filler video generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the resolution of every video and the widest / tallest files
    Probe {
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Parallel probes (0 = pick from CPU count)
        #[arg(short, long)]
        workers: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Print the smallest standard 16:9 resolution that fits every video
    Solve {
        #[arg(value_name = "DIR")]
        input: PathBuf,

        #[arg(short, long)]
        workers: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Render a black filler video at the solved (or given) resolution
    Filler {
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Length in seconds
        #[arg(short, long, default_value_t = DEFAULT_FILLER_DURATION_SECS)]
        duration: u64,

        /// Output file (default: DIR/black_frame_4hours.mp4)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip probing and use this width (requires --height)
        #[arg(long, requires = "height")]
        width: Option<u32>,

        #[arg(long, requires = "width")]
        height: Option<u32>,

        #[arg(short, long)]
        workers: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    if let Err(e) = init_logging("vid_res", LogConfig::default().with_level(level)) {
        eprintln!("⚠️  Logging disabled: {:#}", e);
    }

    let tools = ToolPaths::detect();

    match cli.command {
        Commands::Probe {
            input,
            workers,
            json,
        } => {
            let analysis = analyze(&tools, &input, workers)?;
            if json {
                print_json(&analysis)?;
            } else {
                print_listing(&analysis);
                print_maxima(&analysis);
            }
        }

        Commands::Solve {
            input,
            workers,
            json,
        } => {
            let analysis = analyze(&tools, &input, workers)?;
            if json {
                print_json(&analysis)?;
            } else {
                print_maxima(&analysis);
                print_target(&analysis.target);
            }
        }

        Commands::Filler {
            input,
            duration,
            output,
            width,
            height,
            workers,
        } => {
            let target = match (width, height) {
                (Some(w), Some(h)) => TargetResolution::new(format!("{}x{}", w, h), w, h),
                _ => {
                    let analysis = analyze(&tools, &input, workers)?;
                    print_maxima(&analysis);
                    match analysis.measured_target() {
                        Some(target) => target.clone(),
                        None => bail!(
                            "No readable videos in {}; pass --width and --height to render filler anyway",
                            input.display()
                        ),
                    }
                }
            };
            print_target(&target);

            let output = output.unwrap_or_else(|| input.join(DEFAULT_FILLER_FILE_NAME));
            let transcoder = FfmpegTranscoder::new(&tools.ffmpeg);
            if !generate_filler(&transcoder, &target, duration, &output) {
                bail!("Failed to create filler video at {}", output.display());
            }
            println!(
                "\n{} Created filler video at: {}",
                style("✅").green(),
                output.display()
            );
            println!("Resolution: {}x{}", target.width, target.height);
        }
    }

    Ok(())
}

fn analyze(
    tools: &ToolPaths,
    input: &Path,
    workers: Option<usize>,
) -> anyhow::Result<ResolutionAnalysis> {
    let prober = FfprobeProber::new(&tools.ffprobe);
    analyze_directory(&prober, input, resolve_worker_count(workers))
        .with_context(|| format!("Failed to probe videos in {}", input.display()))
}

fn print_json(analysis: &ResolutionAnalysis) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(analysis).context("Failed to serialize analysis")?
    );
    Ok(())
}

fn print_listing(analysis: &ResolutionAnalysis) {
    if analysis.report.samples.is_empty() && analysis.report.failures.is_empty() {
        println!("📂 No videos found in {}", analysis.directory.display());
        return;
    }
    for sample in &analysis.report.samples {
        println!("{}: ({}, {})", sample.file_name, sample.width, sample.height);
    }
    for failure in &analysis.report.failures {
        println!(
            "{}: {}",
            failure.file_name,
            style(format!("unreadable ({})", failure.error)).red()
        );
    }
}

fn print_maxima(analysis: &ResolutionAnalysis) {
    let maxima = &analysis.maxima;
    println!("\nLargest dimensions:");
    println!(
        "Widest video: {} ({}px)",
        maxima.widest_file.as_deref().unwrap_or("-"),
        maxima.max_width
    );
    println!(
        "Tallest video: {} ({}px)",
        maxima.tallest_file.as_deref().unwrap_or("-"),
        maxima.max_height
    );
    if !analysis.report.failures.is_empty() {
        println!(
            "{}",
            style(format!(
                "⚠️  {} file(s) could not be probed and were ignored",
                analysis.report.failures.len()
            ))
            .yellow()
        );
    }
}

fn print_target(target: &TargetResolution) {
    println!("\nOptimal standard resolution that fits all videos:");
    println!("Resolution: {}", style(&target.label).cyan().bold());
    println!("Width: {}px", target.width);
    println!("Height: {}px", target.height);
    println!("Ratio: {:.2}:1", target.aspect_ratio());
}
