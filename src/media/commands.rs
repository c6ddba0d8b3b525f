use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{FfboxError, Result};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Suppress the banner ffmpeg prints on startup
    pub fn hide_banner(self) -> Self {
        self.arg("-hide_banner")
    }

    /// Set hardware acceleration backend
    pub fn hwaccel<S: Into<String>>(self, backend: S) -> Self {
        self.arg("-hwaccel").arg(backend)
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Set subtitle codec
    pub fn subtitle_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:s").arg(codec)
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.video_codec("copy")
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Map a stream specifier
    pub fn map<S: Into<String>>(self, specifier: S) -> Self {
        self.arg("-map").arg(specifier)
    }

    /// Set a metadata key/value
    pub fn metadata<S1: Into<String>, S2: Into<String>>(self, specifier: S1, value: S2) -> Self {
        self.arg(format!("-metadata{}", specifier.into())).arg(value)
    }

    /// Seek to a start time before reading the input
    pub fn seek<S: Into<String>>(self, start: S) -> Self {
        self.arg("-ss").arg(start)
    }

    /// Stop reading at an end time
    pub fn stop_at<S: Into<String>>(self, end: S) -> Self {
        self.arg("-to").arg(end)
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);

        let output = cmd.output()
            .map_err(|e| FfboxError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FfboxError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr
            )));
        }

        Ok(())
    }

    /// Render as a copy-pasteable command line, quoting arguments with spaces
    pub fn render(&self) -> String {
        let mut rendered = self.binary_path.clone();
        for arg in &self.args {
            rendered.push(' ');
            if arg.contains(' ') {
                rendered.push('"');
                rendered.push_str(arg);
                rendered.push('"');
            } else {
                rendered.push_str(arg);
            }
        }
        rendered
    }
}

/// Quality selection for transcoding
#[derive(Debug, Clone, PartialEq)]
pub enum QualityMode {
    /// Encoder defaults
    Default,
    /// Constant rate factor (0-51)
    Crf(u8),
    /// Target video bitrate in kbit/s
    Bitrate(u32),
}

/// Options for one transcode invocation
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub quality: QualityMode,
    /// Copy subtitle streams into the output
    pub subtitles: bool,
    /// Encode with HEVC instead of H.264
    pub hevc: bool,
    /// Use the NVENC hardware encoder
    pub gpu: bool,
    pub start: Option<String>,
    pub end: Option<String>,
    pub deinterlace: bool,
    pub dedupe: bool,
    /// Convert side-by-side 3D to mono
    pub mono: bool,
}

impl ConvertOptions {
    fn encoder(&self) -> &'static str {
        match (self.hevc, self.gpu) {
            (true, true) => "hevc_nvenc",
            (true, false) => "libx265",
            (false, true) => "h264_nvenc",
            (false, false) => "libx264",
        }
    }
}

/// Builder for common media processing operations
pub struct MediaCommandBuilder {
    binary_path: String,
    hwaccel: Option<String>,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S, hwaccel: Option<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            hwaccel,
        }
    }

    fn base<S: Into<String>>(&self, description: S) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.binary_path, description).hide_banner();
        if let Some(backend) = &self.hwaccel {
            cmd = cmd.hwaccel(backend.clone());
        }
        cmd
    }

    /// Build a transcode command
    pub fn convert<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: P,
        options: &ConvertOptions,
        extra_options: &[String],
    ) -> MediaCommand {
        let mut cmd = self.base("Video conversion");

        // Trim bounds apply to input seeking, so they precede -i
        if let Some(start) = &options.start {
            cmd = cmd.seek(start.clone());
        }
        if let Some(end) = &options.end {
            cmd = cmd.stop_at(end.clone());
        }

        cmd = cmd
            .input(&input_path)
            .map("0:v:0")
            .map("0:a:0")
            .map("0:a:0")
            .audio_codec("aac")
            .video_codec(options.encoder())
            .arg("-preset")
            .arg("slow");

        if options.subtitles {
            cmd = cmd.map("0:s?").subtitle_codec("copy");
        }

        match options.quality {
            QualityMode::Default => {}
            QualityMode::Crf(crf) => {
                cmd = cmd.arg("-crf").arg(crf.to_string());
            }
            QualityMode::Bitrate(kbps) => {
                cmd = cmd.arg("-b:v").arg(format!("{}k", kbps));
            }
        }

        if options.gpu {
            cmd = cmd
                .arg("-profile:v")
                .arg("main")
                .arg("-rc")
                .arg("vbr")
                .arg("-qmin")
                .arg("18");
        }

        let mut filters: Vec<String> = Vec::new();

        if options.deinterlace {
            if options.gpu {
                filters.extend(
                    ["hwupload_cuda", "bwdif_cuda=0", "hwdownload", "format=nv12", "format=yuv420p"]
                        .map(String::from),
                );
            } else {
                filters.push("bwdif=0".to_string());
            }
        }

        if options.dedupe {
            filters.push("mpdecimate".to_string());
            cmd = cmd.arg("-vsync").arg("vfr");
        }

        if options.mono {
            filters.push("stereo3d=sbsl:ml".to_string());
            cmd = cmd.metadata(":s:v:0", "stereo_mode=mono");
        }

        if !filters.is_empty() {
            cmd = cmd.video_filter(filters.join(","));
        }

        for option in extra_options {
            cmd = cmd.arg(option);
        }

        cmd.output(output_path)
    }

    /// Build a single-segment trim command
    pub fn cut_segment<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: P,
        start: &str,
        end: &str,
    ) -> MediaCommand {
        self.base("Video cutting")
            .input(input_path)
            .seek(start)
            .stop_at(end)
            .output(output_path)
    }

    /// Build a concat-demuxer merge command over a prepared list file
    pub fn merge<P: AsRef<Path>>(&self, list_path: P, output_path: P) -> MediaCommand {
        self.base("Video concatenation")
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .input(list_path)
            .output(output_path)
    }

    /// Build custom command
    pub fn custom<S: Into<String>>(&self, description: S) -> MediaCommand {
        MediaCommand::new(&self.binary_path, description.into())
    }
}
