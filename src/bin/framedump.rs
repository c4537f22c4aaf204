use std::{
    path::PathBuf,
    sync::{Arc, OnceLock},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framedump::{
    CancellationToken, ExtractionConfig, FfmpegLogLevel, OutputFormat, ProgressCallback,
    ProgressInfo, VideoSource, ZeroPad,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framedump extract input.mov --out extracted_frames\n  framedump extract input.mp4 --out frames --format png --pad auto --progress\n  framedump probe input.mp4 --json\n  framedump completions zsh > _framedump";

#[derive(Debug, Parser)]
#[command(
    name = "framedump",
    version,
    about = "Dump every frame of a video file to numbered still images",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    ffmpeg_log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract every frame to an output directory (alias: dump).
    #[command(
        about = "Extract all frames as numbered images",
        visible_alias = "dump",
        after_help = "Examples:\n  framedump extract input.mov --out extracted_frames\n  framedump extract input.mp4 --out frames --format png --pad auto --progress"
    )]
    Extract {
        /// Input video path.
        input: PathBuf,
        /// Output directory for the frame images (created if missing).
        #[arg(long)]
        out: PathBuf,
        /// Output image format (jpg, png).
        #[arg(long, default_value = "jpg")]
        format: String,
        /// Zero-pad width for frame indices, or `auto` to size it from the
        /// declared frame count.
        #[arg(long, default_value = "5")]
        pad: String,
        /// Fire a progress report every N written frames.
        #[arg(long, default_value_t = 100)]
        report_every: u64,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
    },

    /// Print video metadata without decoding (alias: info).
    #[command(
        about = "Print video metadata",
        visible_alias = "info",
        after_help = "Examples:\n  framedump probe input.mp4\n  framedump probe input.mp4 --json"
    )]
    Probe {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_output_format(value: &str) -> Option<OutputFormat> {
    match value.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some(OutputFormat::Jpg),
        "png" => Some(OutputFormat::Png),
        _ => None,
    }
}

fn parse_zero_pad(value: &str) -> Option<ZeroPad> {
    if value.eq_ignore_ascii_case("auto") {
        return Some(ZeroPad::Auto);
    }
    match value.parse::<u32>() {
        Ok(width) if width > 0 => Some(ZeroPad::Fixed(width)),
        _ => None,
    }
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.ffmpeg_log_level {
        let parsed: FfmpegLogLevel = level
            .parse()
            .map_err(|_| format!("unsupported --ffmpeg-log-level: {level}"))?;
        framedump::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

/// Renders progress callbacks as an indicatif bar.
///
/// The bar is built lazily on the first callback, once the advisory total is
/// known; with no usable total it degrades to a spinner.
#[derive(Default)]
struct TerminalProgress {
    bar: OnceLock<ProgressBar>,
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let bar = self.bar.get_or_init(|| {
            let bar = match info.advisory_total {
                Some(total) => ProgressBar::new(total),
                None => ProgressBar::new_spinner(),
            };
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} frames",
            ) {
                bar.set_style(style.progress_chars("##-"));
            }
            bar
        });
        bar.set_position(info.frames_written);
    }
}

impl TerminalProgress {
    fn finish(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish_and_clear();
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Extract {
            input,
            out,
            format,
            pad,
            report_every,
            progress,
        } => {
            let output_format =
                parse_output_format(&format).ok_or(format!("unsupported --format: {format}"))?;
            let zero_pad =
                parse_zero_pad(&pad).ok_or(format!("unsupported --pad: {pad} (use N or auto)"))?;

            let token = CancellationToken::new();
            {
                let token = token.clone();
                ctrlc::set_handler(move || token.cancel())?;
            }

            let mut config = ExtractionConfig::new()
                .with_output_format(output_format)
                .with_zero_pad(zero_pad)
                .with_progress_interval(report_every)
                .with_cancellation(token);

            let terminal_progress = Arc::new(TerminalProgress::default());
            if progress {
                config = config.with_progress(terminal_progress.clone());
            }

            let result = framedump::extract_frames_with_config(&input, &out, &config);
            terminal_progress.finish();
            let report = result?;

            if let framedump::StreamEnd::DecodeError { frame, reason } = &report.stream_end {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("decoding aborted at frame {frame}: {reason}").yellow()
                );
            }

            if cli.global.verbose && report.advisory_frame_count != report.frames_written {
                eprintln!(
                    "note: container declared {} frame(s), {} decoded",
                    report.advisory_frame_count, report.frames_written,
                );
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "Extracted {} frame(s) to {}",
                    report.frames_written,
                    report.output_folder.display()
                )
                .green()
            );
        }
        Commands::Probe { input, json } => {
            let source = VideoSource::open(&input)?;
            let info = source.info();
            if json {
                let payload = json!({
                    "format": info.format,
                    "duration_seconds": info.duration.as_secs_f64(),
                    "width": info.width,
                    "height": info.height,
                    "fps": info.frames_per_second,
                    "advisory_frame_count": info.advisory_frame_count,
                    "codec": info.codec,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", info.format);
                println!("Duration: {:?}", info.duration);
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    info.width, info.height, info.frames_per_second, info.codec,
                );
                println!("Declared frames: {}", info.advisory_frame_count);
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framedump", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
