//! # sqshed - Main Entry Point
//!
//! ## Execution flow:
//! 1. Parse CLI arguments with `clap`
//! 2. Initialize `tracing` (INFO, or DEBUG with --verbose)
//! 3. Verify the external encoder dependencies (blocking, user-facing)
//! 4. Collect files and settings (flags, or the interactive flow)
//! 5. Run the batch orchestrator and print the summary
//!
//! ## Usage:
//! ```bash
//! sqshed                       # interactive flow
//! sqshed movie.mp4             # quick mode, medium quality
//! sqshed photos/ -q low --rm   # folder batch, delete originals
//! sqshed setup                 # dependency check
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

use sqshed::classifier::Classifier;
use sqshed::platform::{self, PlatformCommands};
use sqshed::progress::TerminalReporter;
use sqshed::session::{ExitConfirmation, InterruptAction, EXIT_CONFIRM_WINDOW};
use sqshed::settings::validate_target_size;
use sqshed::{
    AdvancedSettings, BatchOrchestrator, CompressionSettings, FfmpegEncoder, FileDescriptor,
    QualityTier, SqshError,
};

#[derive(Parser)]
#[command(name = "sqshed")]
#[command(version)]
#[command(about = "Squish video, image and audio files with ffmpeg")]
struct Args {
    /// Files or folders to compress (empty = interactive flow)
    files: Vec<PathBuf>,

    /// Quality tier: high, medium, low or custom
    #[arg(short, long, default_value = "medium", value_parser = parse_tier)]
    quality: QualityTier,

    /// Percent quality for the custom tier (1-100)
    #[arg(long)]
    custom_quality: Option<u8>,

    /// Output folder (default: next to each input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format, e.g. webm or webp (default: keep original)
    #[arg(short, long)]
    format: Option<String>,

    /// Desired output size in bytes (overrides the quality tier)
    #[arg(long)]
    target_size: Option<u64>,

    /// Delete originals after a successful, size-reducing compression
    #[arg(long)]
    rm: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the external encoder tools are installed
    Setup,
}

fn parse_tier(s: &str) -> Result<QualityTier, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(Command::Setup) = args.command {
        return setup().await;
    }

    // The orchestrator is never constructed before this passes
    platform::check_dependencies().await?;

    spawn_interrupt_handler();

    let (descriptors, settings) = if args.files.is_empty() {
        sqshed::interactive::collect().await?
    } else {
        gather(&args).await?
    };

    if let Some(target) = settings.target_size() {
        validate_target_size(target, &descriptors)?;
    }

    let mut orchestrator = BatchOrchestrator::new();
    for descriptor in descriptors {
        orchestrator.push(descriptor);
    }
    orchestrator.configure(settings);

    let encoder = FfmpegEncoder::new();
    let reporter = TerminalReporter::new();
    orchestrator.run(&encoder, &reporter).await?;

    let summary = orchestrator.summarize();
    if args.json {
        println!("{}", summary.to_json(orchestrator.records())?);
    } else {
        print!("{}", summary.render(orchestrator.records()));
    }

    Ok(())
}

/// Resolve CLI paths into a batch: files classified directly, folders
/// enumerated one level deep
async fn gather(args: &Args) -> Result<(Vec<FileDescriptor>, CompressionSettings)> {
    let mut descriptors = Vec::new();

    for path in &args.files {
        if path.is_dir() {
            descriptors.extend(Classifier::enumerate(path).await?);
        } else {
            match Classifier::classify(path).await? {
                Some(descriptor) => descriptors.push(descriptor),
                None => {
                    return Err(SqshError::Classification(format!(
                        "not a supported media file: {}",
                        path.display()
                    ))
                    .into());
                }
            }
        }
    }

    if descriptors.is_empty() {
        return Err(
            SqshError::Classification("no supported media files found".to_string()).into(),
        );
    }

    let advanced = AdvancedSettings {
        output_folder: args.output.clone(),
        target_size: args.target_size,
        output_format: args
            .format
            .as_ref()
            .map(|f| f.trim_start_matches('.').to_lowercase()),
    };

    let settings = CompressionSettings::resolve(
        args.quality,
        args.custom_quality,
        args.rm,
        Some(advanced),
    );

    Ok((descriptors, settings))
}

/// Two-stage Ctrl+C: first press arms a confirm window, second press
/// inside it terminates. An in-flight encode is not cancelled gracefully;
/// exiting terminates the whole process.
fn spawn_interrupt_handler() {
    tokio::spawn(async move {
        let mut confirm = ExitConfirmation::default();
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                debug!("Interrupt handler unavailable");
                return;
            }
            match confirm.on_interrupt(Instant::now()) {
                InterruptAction::Armed => {
                    eprintln!(
                        "\nPress Ctrl+C again within {}s to exit",
                        EXIT_CONFIRM_WINDOW.as_secs()
                    );
                }
                InterruptAction::Exit => std::process::exit(130),
            }
        }
    });
}

/// The `setup` subcommand: report every external tool's availability
async fn setup() -> Result<()> {
    let commands = PlatformCommands::instance();
    let mut missing = false;

    for tool in ["ffmpeg", "ffprobe"] {
        if commands.is_command_available(tool).await {
            println!("{} {}", style("[OK]").green(), tool);
        } else {
            println!("{} {}", style("[MISSING]").red(), tool);
            missing = true;
        }
    }

    if missing {
        println!(
            "\nInstall ffmpeg from https://ffmpeg.org/download.html and make\n\
             sure it is on your PATH, then run `sqshed setup` again."
        );
        return Err(SqshError::MissingDependency("ffmpeg".to_string()).into());
    }

    println!("\nAll dependencies are in place.");
    Ok(())
}
