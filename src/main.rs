//! ffbox - Video Processing Toolbox
//!
//! This is the main entry point for the ffbox application, which assembles
//! and runs ffmpeg invocations for common video processing tasks and splits
//! multilingual subtitle files into per-language files.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ffbox::cli::{Args, Commands};
use ffbox::config::Config;
use ffbox::error::FfboxError;
use ffbox::media::{ConvertOptions, QualityMode};
use ffbox::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let workflow = Workflow::new(config)?;

    // Execute command
    match args.command {
        Commands::Convert {
            input,
            output,
            quality,
            crf,
            bitrate,
            subtitles,
            hevc,
            gpu,
            start,
            end,
            deinterlace,
            dedupe,
            mono,
        } => {
            info!("Converting video file: {}", input.display());

            let options = ConvertOptions {
                quality: parse_quality_mode(&quality, crf, bitrate)?,
                subtitles,
                hevc,
                gpu,
                start,
                end,
                deinterlace,
                dedupe,
                mono,
            };
            workflow.convert_video(&input, &output, &options).await?;
        }
        Commands::Cut { input, output, spans } => {
            info!("Cutting video file: {}", input.display());
            workflow.cut_video(&input, &output, &spans).await?;
        }
        Commands::Merge { inputs, output } => {
            info!("Merging {} video file(s) into {}", inputs.len(), output.display());
            workflow.merge_videos(&inputs, &output).await?;
        }
        Commands::Embed { input_dir, output_dir, dry_run } => {
            info!("Embedding subtitles for videos in: {}", input_dir.display());
            workflow.embed_directory(&input_dir, &output_dir, dry_run).await?;
        }
        Commands::Split { input, flush_trailing } => {
            info!("Splitting subtitle file: {}", input.display());

            let written = workflow.split_subtitle(&input, flush_trailing)?;
            if written.is_empty() {
                println!("No complete subtitle blocks found, nothing written.");
            } else {
                println!("Wrote {} language file(s):", written.len());
                for path in &written {
                    println!("  {}", path.display());
                }
            }
        }
    }

    info!("ffbox completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let ffbox_dir = std::env::current_dir()?.join(".ffbox");
    let log_dir = ffbox_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "ffbox.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Parse quality mode from string
fn parse_quality_mode(mode: &str, crf: u8, bitrate: u32) -> Result<QualityMode> {
    match mode.to_lowercase().as_str() {
        "default" => Ok(QualityMode::Default),
        "crf" => Ok(QualityMode::Crf(crf)),
        "bitrate" => Ok(QualityMode::Bitrate(bitrate)),
        _ => Err(FfboxError::Config(format!(
            "Invalid quality mode '{}'. Valid modes: default, crf, bitrate",
            mode
        ))
        .into()),
    }
}
