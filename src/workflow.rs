use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::embed::{build_embed_command, discover_tracks};
use crate::error::{FfboxError, Result};
use crate::media::{
    ConvertOptions, MediaCommandBuilder, MediaProcessorFactory, MediaProcessorTrait,
};
use crate::subtitle;

pub struct Workflow {
    config: Config,
    media: Box<dyn MediaProcessorTrait>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        // ffmpeg availability is checked per media operation; the subtitle
        // splitter is a pure text transform and must work without it
        Ok(Self { config, media })
    }

    /// Transcode a single video file
    pub async fn convert_video<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: P,
        options: &ConvertOptions,
    ) -> Result<()> {
        let input_path = strip_quotes(input_path.as_ref());
        let output_path = strip_quotes(output_path.as_ref());

        if !input_path.exists() {
            return Err(FfboxError::FileNotFound(input_path.display().to_string()));
        }
        self.media.check_availability()?;

        self.media.convert(&input_path, &output_path, options).await
    }

    /// Cut a video into one segment per timestamp span.
    ///
    /// Each span is `start,end`; the `?` in the output pattern is replaced by
    /// the 1-based segment number, so `clip ?.mp4` yields `clip 1.mp4`,
    /// `clip 2.mp4`, ...
    pub async fn cut_video<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_pattern: P,
        spans: &[String],
    ) -> Result<()> {
        let input_path = strip_quotes(input_path.as_ref());
        let output_pattern = strip_quotes(output_pattern.as_ref());

        if !input_path.exists() {
            return Err(FfboxError::FileNotFound(input_path.display().to_string()));
        }
        self.media.check_availability()?;

        for (segment, span) in spans.iter().enumerate() {
            let (start, end) = parse_span(span)?;
            let output_path = segment_output_path(&output_pattern, segment + 1);
            self.media
                .cut_segment(&input_path, &output_path, start, end)
                .await?;
        }

        info!("Cut {} segment(s)", spans.len());
        Ok(())
    }

    /// Concatenate videos into one output file.
    ///
    /// Writes a concat-demuxer list file next to the output, runs the merge,
    /// then removes the list.
    pub async fn merge_videos<P: AsRef<Path>>(
        &self,
        input_paths: &[PathBuf],
        output_path: P,
    ) -> Result<()> {
        let output_path = strip_quotes(output_path.as_ref());
        self.media.check_availability()?;

        let list_path = write_concat_list(input_paths, &output_path)?;
        let result = self.media.merge_list(&list_path, &output_path).await;

        // The list is scratch state either way
        if let Err(e) = std::fs::remove_file(&list_path) {
            warn!("Failed to remove concat list {}: {}", list_path.display(), e);
        }

        result
    }

    /// Embed discovered subtitle files into every video in a directory.
    ///
    /// With `dry_run` the assembled commands are printed instead of executed.
    pub async fn embed_directory<P: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: P,
        dry_run: bool,
    ) -> Result<()> {
        let input_dir = strip_quotes(input_dir.as_ref());
        let output_dir = strip_quotes(output_dir.as_ref());

        if !input_dir.is_dir() {
            return Err(FfboxError::FileNotFound(input_dir.display().to_string()));
        }
        if !dry_run {
            self.media.check_availability()?;
        }
        fs::create_dir_all(&output_dir).await?;

        let mut video_files: Vec<PathBuf> = WalkDir::new(&input_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.path().to_path_buf())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("mp4"))
                    .unwrap_or(false)
            })
            .collect();
        video_files.sort();

        if video_files.is_empty() {
            return Err(FfboxError::Media(format!(
                "No .mp4 files found in {}",
                input_dir.display()
            )));
        }

        info!("Found {} video file(s) to process", video_files.len());

        let command_builder = MediaCommandBuilder::new(
            &self.config.media.binary_path,
            self.config.media.hwaccel.clone(),
        );
        let mut processed = 0usize;

        for video_path in &video_files {
            let base_name = video_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();

            let tracks = discover_tracks(video_path, &input_dir);
            if tracks.is_empty() {
                warn!("No subtitle files found for {}, skipping", base_name);
                continue;
            }

            let output_path = output_dir.join(format!("{}.mkv", base_name));
            let command =
                build_embed_command(&command_builder, video_path, &tracks, &output_path);

            if dry_run {
                println!("{}", command.render());
                continue;
            }

            match self.media.execute_command(command).await {
                Ok(()) => {
                    info!("Successfully processed: {}.mkv", base_name);
                    processed += 1;
                }
                Err(e) => warn!("Failed to process {}: {}", base_name, e),
            }
        }

        if dry_run {
            info!("Dry run completed for {} video file(s)", video_files.len());
        } else {
            info!(
                "Processing completed, {}/{} video file(s) succeeded",
                processed,
                video_files.len()
            );
        }
        Ok(())
    }

    /// Split a multilingual subtitle file into per-language files
    pub fn split_subtitle<P: AsRef<Path>>(
        &self,
        input_path: P,
        flush_trailing: bool,
    ) -> Result<Vec<PathBuf>> {
        let input_path = strip_quotes(input_path.as_ref());
        let flush = flush_trailing || self.config.split.flush_trailing;
        subtitle::split_file(&input_path, flush)
    }
}

/// Strip surrounding double quotes a path picked up from a copy-pasted string
fn strip_quotes(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let trimmed = raw.trim().trim_matches('"');
    PathBuf::from(trimmed)
}

/// Parse a `start,end` timestamp span
fn parse_span(span: &str) -> Result<(&str, &str)> {
    match span.split_once(',') {
        Some((start, end)) if !start.trim().is_empty() && !end.trim().is_empty() => {
            Ok((start.trim(), end.trim()))
        }
        _ => Err(FfboxError::Config(format!(
            "Invalid timestamp span '{}', expected 'start,end'",
            span
        ))),
    }
}

/// Substitute the `?` placeholder in the output pattern with a segment number
fn segment_output_path(pattern: &Path, segment: usize) -> PathBuf {
    PathBuf::from(
        pattern
            .to_string_lossy()
            .replace('?', &segment.to_string()),
    )
}

/// Write the ffmpeg concat-demuxer list for the given inputs.
///
/// The list lands next to the output as `<output filename>.txt` and holds one
/// `file '<path>'` line per input, in order.
fn write_concat_list(input_paths: &[PathBuf], output_path: &Path) -> Result<PathBuf> {
    let list_path = concat_list_path(output_path)?;

    let mut content = String::new();
    for input in input_paths {
        let stripped = strip_quotes(input);
        content.push_str(&format!("file '{}'\n", stripped.display()));
    }

    std::fs::write(&list_path, content)?;
    Ok(list_path)
}

/// Concat list location for an output path: `<output filename>.txt` in the
/// output's directory
fn concat_list_path(output_path: &Path) -> Result<PathBuf> {
    let file_name = output_path
        .file_name()
        .ok_or_else(|| FfboxError::Config("Output path has no file name".to_string()))?;
    let list_name = format!("{}.txt", file_name.to_string_lossy());

    Ok(match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(list_name),
        _ => PathBuf::from(list_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow_without_ffmpeg() -> Workflow {
        let mut config = Config::default();
        config.media.binary_path = "/nonexistent/ffmpeg".to_string();
        Workflow::new(config).unwrap()
    }

    #[test]
    fn test_split_works_without_ffmpeg_installed() {
        let workflow = workflow_without_ffmpeg();

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("movie.srt");
        std::fs::write(&input, "1\n00:00:01,000 --> 00:00:02,000\nHello\n你好\n\n").unwrap();

        let written = workflow.split_subtitle(&input, false).unwrap();
        assert_eq!(written.len(), 2);
    }

    #[tokio::test]
    async fn test_media_operations_report_missing_ffmpeg() {
        let workflow = workflow_without_ffmpeg();

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"").unwrap();

        let err = workflow
            .cut_video(&input, &dir.path().join("?.mp4"), &["0:00,0:10".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, FfboxError::Media(_)));
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes(Path::new("\"/tmp/a.mp4\"")), PathBuf::from("/tmp/a.mp4"));
        assert_eq!(strip_quotes(Path::new("/tmp/a.mp4")), PathBuf::from("/tmp/a.mp4"));
        assert_eq!(strip_quotes(Path::new(" \"a b.mp4\" ")), PathBuf::from("a b.mp4"));
    }

    #[test]
    fn test_parse_span() {
        assert_eq!(parse_span("00:00:01,00:00:05").unwrap(), ("00:00:01", "00:00:05"));
        assert_eq!(parse_span(" 0:10 , 0:20 ").unwrap(), ("0:10", "0:20"));
        assert!(parse_span("00:00:01").is_err());
        assert!(parse_span(",00:00:05").is_err());
    }

    #[test]
    fn test_segment_output_path() {
        assert_eq!(
            segment_output_path(Path::new("/tmp/clip ?.mp4"), 3),
            PathBuf::from("/tmp/clip 3.mp4")
        );
        assert_eq!(segment_output_path(Path::new("?.mp4"), 1), PathBuf::from("1.mp4"));
    }

    #[test]
    fn test_write_concat_list() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("merged.mp4");
        let inputs = vec![PathBuf::from("01.mp4"), PathBuf::from("\"02 part.mp4\"")];

        let list_path = write_concat_list(&inputs, &output).unwrap();

        assert_eq!(list_path, dir.path().join("merged.mp4.txt"));
        let content = std::fs::read_to_string(&list_path).unwrap();
        assert_eq!(content, "file '01.mp4'\nfile '02 part.mp4'\n");
    }

    #[test]
    fn test_concat_list_path() {
        assert_eq!(
            concat_list_path(Path::new("/tmp/out/merged.mp4")).unwrap(),
            PathBuf::from("/tmp/out/merged.mp4.txt")
        );
        assert_eq!(
            concat_list_path(Path::new("merged.mp4")).unwrap(),
            PathBuf::from("merged.mp4.txt")
        );
        assert!(concat_list_path(Path::new("/")).is_err());
    }
}
