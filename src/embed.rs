//! Subtitle discovery and embed planning.
//!
//! For each video the Embed tool looks for one Chinese and one English
//! subtitle file in two locations: a `<base>.<lang>.srt` sibling of the video
//! takes priority, with `Subs/<base>/` pattern matches as fallback. Videos
//! with no discovered subtitles are skipped.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::media::{MediaCommand, MediaCommandBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleLanguage {
    Chinese,
    English,
}

impl SubtitleLanguage {
    /// ISO 639-2 code used for the stream language tag and sibling filenames
    pub fn code(&self) -> &'static str {
        match self {
            Self::Chinese => "chi",
            Self::English => "eng",
        }
    }

    /// Display title for the subtitle stream
    pub fn title(&self) -> &'static str {
        match self {
            Self::Chinese => "中文",
            Self::English => "English",
        }
    }

    /// Filename suffixes matched inside the `Subs/<base>/` fallback directory
    fn fallback_suffixes(&self) -> &'static [&'static str] {
        match self {
            Self::Chinese => &["_Chinese.srt", "_chi.srt", "_ch.srt"],
            Self::English => &["_English.srt", "_eng.srt", "_en.srt"],
        }
    }
}

/// One subtitle file matched to a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub path: PathBuf,
    pub language: SubtitleLanguage,
}

/// Discover subtitle tracks for a video, Chinese before English.
///
/// Returns at most one track per language.
pub fn discover_tracks(video_path: &Path, input_dir: &Path) -> Vec<SubtitleTrack> {
    let base_name = match video_path.file_stem() {
        Some(stem) => stem.to_string_lossy().to_string(),
        None => return Vec::new(),
    };
    let subs_dir = input_dir.join("Subs").join(&base_name);

    let mut tracks = Vec::new();
    for language in [SubtitleLanguage::Chinese, SubtitleLanguage::English] {
        if let Some(path) = find_subtitle(video_path, &base_name, &subs_dir, language) {
            debug!(
                "Found {} subtitle for {}: {}",
                language.code(),
                base_name,
                path.display()
            );
            tracks.push(SubtitleTrack { path, language });
        }
    }
    tracks
}

fn find_subtitle(
    video_path: &Path,
    base_name: &str,
    subs_dir: &Path,
    language: SubtitleLanguage,
) -> Option<PathBuf> {
    // Sibling file takes priority over the Subs directory
    let sibling = video_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{}.{}.srt", base_name, language.code()));
    if sibling.exists() {
        return Some(sibling);
    }

    if !subs_dir.exists() {
        return None;
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(subs_dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    for suffix in language.fallback_suffixes() {
        if let Some(found) = entries.iter().find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().ends_with(suffix))
                .unwrap_or(false)
        }) {
            return Some(found.clone());
        }
    }
    None
}

/// Assemble the remux command for one video and its discovered tracks.
///
/// Video and audio streams are copied, the container title is cleared, each
/// subtitle file becomes one SRT stream tagged with its language and title,
/// and the first subtitle stream is marked as default.
pub fn build_embed_command(
    builder: &MediaCommandBuilder,
    video_path: &Path,
    tracks: &[SubtitleTrack],
    output_path: &Path,
) -> MediaCommand {
    let mut cmd = builder
        .custom("Subtitle embedding")
        .overwrite()
        .input(video_path);

    for track in tracks {
        cmd = cmd.input(&track.path);
    }

    cmd = cmd
        .map("0:v")
        .map("0:a")
        .copy_video()
        .copy_audio()
        .metadata("", "title=");

    for (stream, _) in tracks.iter().enumerate() {
        cmd = cmd.map(format!("{}:s", stream + 1));
    }

    if !tracks.is_empty() {
        cmd = cmd
            .subtitle_codec("srt")
            .arg("-disposition:s:0")
            .arg("+default");
    }

    for (stream, track) in tracks.iter().enumerate() {
        cmd = cmd
            .metadata(format!(":s:s:{}", stream), format!("language={}", track.language.code()))
            .metadata(format!(":s:s:{}", stream), format!("title={}", track.language.title()));
    }

    cmd.output(output_path)
}
