//! ffbox - Video Processing Toolbox
//!
//! A Rust implementation of a video processing toolbox that assembles and runs
//! ffmpeg invocations (convert, cut, merge, embed subtitles) and splits
//! multilingual subtitle files into per-language files.

pub mod cli;
pub mod config;
pub mod embed;
pub mod error;
pub mod media;
pub mod subtitle;
pub mod workflow;
