// Modular media processing architecture
//
// This module provides a clean abstraction over media processing operations:
// - Processor: Main implementation with abstract command building
// - Commands: Command builders and abstractions

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Transcode a video file
    async fn convert(
        &self,
        input_path: &Path,
        output_path: &Path,
        options: &ConvertOptions,
    ) -> Result<()>;

    /// Trim one segment out of a video file
    async fn cut_segment(
        &self,
        input_path: &Path,
        output_path: &Path,
        start: &str,
        end: &str,
    ) -> Result<()>;

    /// Concatenate videos listed in a concat-demuxer list file
    async fn merge_list(&self, list_path: &Path, output_path: &Path) -> Result<()>;

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()>;

    /// Execute custom media processing command
    async fn execute_command(&self, command: MediaCommand) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
