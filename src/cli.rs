use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcode a video file
    Convert {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,

        /// Quality mode: default, crf or bitrate
        #[arg(short, long, default_value = "default")]
        quality: String,

        /// CRF value when quality mode is crf (0-51)
        #[arg(long, default_value = "23")]
        crf: u8,

        /// Video bitrate in kbit/s when quality mode is bitrate
        #[arg(long, default_value = "2000")]
        bitrate: u32,

        /// Copy subtitle streams into the output
        #[arg(long)]
        subtitles: bool,

        /// Encode with HEVC instead of H.264
        #[arg(long)]
        hevc: bool,

        /// Use the GPU (NVENC) encoder
        #[arg(long)]
        gpu: bool,

        /// Start time (e.g. 00:01:30)
        #[arg(long)]
        start: Option<String>,

        /// End time (e.g. 00:02:45)
        #[arg(long)]
        end: Option<String>,

        /// Deinterlace the video
        #[arg(long)]
        deinterlace: bool,

        /// Drop duplicate frames
        #[arg(long)]
        dedupe: bool,

        /// Convert side-by-side 3D to mono
        #[arg(long)]
        mono: bool,
    },

    /// Cut a video into segments given timestamp ranges
    Cut {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output path pattern; `?` is replaced by the 1-based segment number
        #[arg(short, long, default_value = "?.mp4")]
        output: PathBuf,

        /// Timestamp range as `start,end`; repeat for multiple segments
        #[arg(short, long = "span", required = true)]
        spans: Vec<String>,
    },

    /// Concatenate multiple videos into one
    Merge {
        /// Input video files, in order
        #[arg(short, long, required = true)]
        inputs: Vec<PathBuf>,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Embed subtitle files into videos and remux to MKV
    Embed {
        /// Directory containing video files and their subtitles
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Directory to write the remuxed MKV files to
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Print the assembled commands without executing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Split a multilingual subtitle file into per-language files
    Split {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Keep an unterminated trailing block instead of dropping it
        #[arg(long)]
        flush_trailing: bool,
    },
}
