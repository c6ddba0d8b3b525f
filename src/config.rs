use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FfboxError, Result};

fn default_flush_trailing() -> bool {
    false
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub media: MediaConfig,
    pub split: SplitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Hardware acceleration backend passed to -hwaccel (e.g. "cuda")
    pub hwaccel: Option<String>,
    /// Additional encoding options appended to every convert invocation
    /// Common options: ["-pix_fmt", "yuv420p"]
    pub extra_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Flush an unterminated trailing block at end of file.
    ///
    /// By default a block that is not followed by a blank line before EOF is
    /// dropped. Enabling this keeps that last block instead.
    #[serde(default = "default_flush_trailing")]
    pub flush_trailing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                hwaccel: Some("cuda".to_string()),
                extra_options: vec![],
            },
            split: SplitConfig {
                flush_trailing: false,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FfboxError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| FfboxError::Config(format!("Failed to parse config file: {}", e)))
    }
}
