use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::info;

use super::{ConvertOptions, MediaCommand, MediaCommandBuilder, MediaProcessorTrait};
use crate::config::MediaConfig;
use crate::error::{FfboxError, Result};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path, config.hwaccel.clone());

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    /// Transcode a video file
    async fn convert(
        &self,
        input_path: &Path,
        output_path: &Path,
        options: &ConvertOptions,
    ) -> Result<()> {
        info!(
            "Converting {} -> {}",
            input_path.display(),
            output_path.display()
        );

        let command = self.command_builder.convert(
            input_path,
            output_path,
            options,
            &self.config.extra_options,
        );

        command.execute().await?;

        info!("Video conversion completed successfully");
        Ok(())
    }

    /// Trim one segment out of a video file
    async fn cut_segment(
        &self,
        input_path: &Path,
        output_path: &Path,
        start: &str,
        end: &str,
    ) -> Result<()> {
        info!(
            "Cutting {} [{} - {}] -> {}",
            input_path.display(),
            start,
            end,
            output_path.display()
        );

        let command = self
            .command_builder
            .cut_segment(input_path, output_path, start, end);
        command.execute().await?;

        info!("Segment cut completed");
        Ok(())
    }

    /// Concatenate videos listed in a concat-demuxer list file
    async fn merge_list(&self, list_path: &Path, output_path: &Path) -> Result<()> {
        info!(
            "Concatenating videos from {} -> {}",
            list_path.display(),
            output_path.display()
        );

        let command = self.command_builder.merge(list_path, output_path);
        command.execute().await?;

        info!("Video concatenation completed");
        Ok(())
    }

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| FfboxError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(FfboxError::Media("Media processor version check failed".to_string()))
        }
    }

    /// Execute custom media processing command
    async fn execute_command(&self, command: MediaCommand) -> Result<()> {
        info!("Executing custom media processing command: {}", command.description);
        command.execute().await
    }
}
