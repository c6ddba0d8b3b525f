//! Multilingual subtitle splitting.
//!
//! Input files are structured as blocks of non-blank lines separated by blank
//! lines: an index line, a timing line, then one text line per language in a
//! fixed slot order. Splitting emits one file per language slot, each keeping
//! the original index and timing lines and exactly that slot's text.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{FfboxError, Result};

/// One timed subtitle entry with parallel per-language text lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleBlock {
    /// Sequence number line, kept verbatim.
    pub index: String,
    /// Timestamp range line, kept verbatim.
    pub timing: String,
    /// Text lines, one per language slot.
    pub texts: Vec<String>,
}

impl SubtitleBlock {
    /// Build a block from the raw lines of one blank-line-delimited group.
    ///
    /// Groups with fewer than two lines have no index/timing header and are
    /// degenerate; they contribute nothing.
    fn from_lines(lines: &[String]) -> Option<Self> {
        let (index, rest) = lines.split_first()?;
        let (timing, texts) = rest.split_first()?;

        Some(Self {
            index: index.clone(),
            timing: timing.clone(),
            texts: texts.to_vec(),
        })
    }
}

/// Accumulated output content for one language slot.
#[derive(Debug, Default, Clone)]
pub struct LanguageStream {
    content: String,
}

impl LanguageStream {
    fn push_entry(&mut self, index: &str, timing: &str, text: &str) {
        // write! to a String cannot fail
        let _ = write!(self.content, "{}\n{}\n{}\n\n", index, timing, text);
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Streaming splitter state: the block being collected plus one lazily
/// created stream per language slot seen so far.
pub struct SubtitleSplitter {
    flush_trailing: bool,
    current: Vec<String>,
    streams: Vec<LanguageStream>,
}

impl SubtitleSplitter {
    /// Create a splitter.
    ///
    /// With `flush_trailing` disabled, a final block not followed by a blank
    /// line before EOF is dropped. Enabling it keeps that block.
    pub fn new(flush_trailing: bool) -> Self {
        Self {
            flush_trailing,
            current: Vec::new(),
            streams: Vec::new(),
        }
    }

    /// Feed one input line, line terminator already stripped.
    pub fn feed_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.complete_block();
        } else {
            self.current.push(line.to_string());
        }
    }

    /// Consume the splitter and return the accumulated per-slot streams.
    pub fn finish(mut self) -> Vec<LanguageStream> {
        if self.flush_trailing {
            self.complete_block();
        } else if !self.current.is_empty() {
            debug!(
                lines = self.current.len(),
                "Dropping unterminated trailing block"
            );
        }
        self.streams
    }

    fn complete_block(&mut self) {
        let lines = std::mem::take(&mut self.current);
        let Some(block) = SubtitleBlock::from_lines(&lines) else {
            return;
        };

        for (slot, text) in block.texts.iter().enumerate() {
            // Streams are created lazily, in slot order, as wider blocks
            // are encountered.
            if self.streams.len() <= slot {
                self.streams.push(LanguageStream::default());
            }
            self.streams[slot].push_entry(&block.index, &block.timing, text);
        }
    }
}

/// Split subtitle text into one output content per language slot.
pub fn split_content(text: &str, flush_trailing: bool) -> Vec<LanguageStream> {
    let mut splitter = SubtitleSplitter::new(flush_trailing);
    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        splitter.feed_line(line);
    }
    splitter.finish()
}

/// Split a multilingual subtitle file into one file per language slot.
///
/// Output files are written next to the input, named by inserting the 1-based
/// slot ordinal before the extension (`movie.srt` -> `movie (1).srt`), and
/// overwritten if they already exist. Index numbers are kept as-is, so a
/// stream that skips narrower blocks may carry gaps; SRT consumers tolerate
/// non-sequential indices. A file with no complete blocks yields no output
/// files and is not an error.
pub fn split_file<P: AsRef<Path>>(input_path: P, flush_trailing: bool) -> Result<Vec<PathBuf>> {
    let input_path = input_path.as_ref();
    info!("Splitting subtitle file: {}", input_path.display());

    let bytes = std::fs::read(input_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => FfboxError::FileNotFound(input_path.display().to_string()),
        _ => FfboxError::Io(e),
    })?;

    let text = String::from_utf8(bytes).map_err(|e| {
        FfboxError::Decode(format!(
            "{} is not valid UTF-8: {}",
            input_path.display(),
            e.utf8_error()
        ))
    })?;

    let streams = split_content(&text, flush_trailing);

    let mut written = Vec::with_capacity(streams.len());
    for (slot, stream) in streams.iter().enumerate() {
        let output_path = slot_output_path(input_path, slot + 1);
        std::fs::write(&output_path, stream.content()).map_err(|e| {
            FfboxError::Media(format!(
                "Failed to write language {} file {}: {}",
                slot + 1,
                output_path.display(),
                e
            ))
        })?;
        debug!("Wrote language slot {} to {}", slot + 1, output_path.display());
        written.push(output_path);
    }

    info!(
        "Split {} into {} language file(s)",
        input_path.display(),
        written.len()
    );
    Ok(written)
}

/// Output path for a 1-based language ordinal: `<stem> (<ordinal>)<ext>`,
/// placed in the input's directory.
fn slot_output_path(input_path: &Path, ordinal: usize) -> PathBuf {
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let name = match input_path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, ordinal, ext.to_string_lossy()),
        None => format!("{} ({})", stem, ordinal),
    };

    match input_path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BILINGUAL: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello\n你好\n\n2\n00:00:03,000 --> 00:00:04,000\nWorld\n世界\n\n";

    #[test]
    fn test_uniform_block_width_yields_one_file_per_slot() {
        let streams = split_content(BILINGUAL, false);
        assert_eq!(streams.len(), 2);
    }

    #[test]
    fn test_concrete_bilingual_scenario() {
        let streams = split_content(BILINGUAL, false);

        assert_eq!(
            streams[0].content(),
            "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:03,000 --> 00:00:04,000\nWorld\n\n"
        );
        assert_eq!(
            streams[1].content(),
            "1\n00:00:01,000 --> 00:00:02,000\n你好\n\n2\n00:00:03,000 --> 00:00:04,000\n世界\n\n"
        );
    }

    #[test]
    fn test_varying_block_width() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\none\ntwo\n\n2\n00:00:03,000 --> 00:00:04,000\neins\nzwei\ndrei\n\n";
        let streams = split_content(input, false);

        assert_eq!(streams.len(), 3);
        // The third slot only exists in the second block, so its stream keeps
        // the original index 2 without renumbering.
        assert_eq!(
            streams[2].content(),
            "2\n00:00:03,000 --> 00:00:04,000\ndrei\n\n"
        );
    }

    #[test]
    fn test_index_and_timing_kept_verbatim() {
        let input = "42\n00:10:00,500 --> 00:10:02,750\nline a\nline b\n\n";
        let streams = split_content(input, false);

        for stream in &streams {
            assert!(stream.content().starts_with("42\n00:10:00,500 --> 00:10:02,750\n"));
        }
        assert_eq!(streams[0].content(), "42\n00:10:00,500 --> 00:10:02,750\nline a\n\n");
        assert_eq!(streams[1].content(), "42\n00:10:00,500 --> 00:10:02,750\nline b\n\n");
    }

    #[test]
    fn test_empty_input_yields_no_streams() {
        assert!(split_content("", false).is_empty());
        assert!(split_content("\n\n\n", false).is_empty());
    }

    #[test]
    fn test_degenerate_block_contributes_nothing() {
        // A lone index line with no timing has no language slots.
        let input = "1\n\n2\n00:00:03,000 --> 00:00:04,000\nonly\n\n";
        let streams = split_content(input, false);

        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].content(), "2\n00:00:03,000 --> 00:00:04,000\nonly\n\n");
    }

    #[test]
    fn test_block_with_header_only_has_no_slots() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\n\n";
        assert!(split_content(input, false).is_empty());
    }

    #[test]
    fn test_trailing_block_dropped_without_final_blank_line() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\nkept\n\n2\n00:00:03,000 --> 00:00:04,000\nlost";
        let streams = split_content(input, false);

        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].content(), "1\n00:00:01,000 --> 00:00:02,000\nkept\n\n");
    }

    #[test]
    fn test_trailing_block_kept_with_flush_enabled() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\nkept\n\n2\n00:00:03,000 --> 00:00:04,000\nalso kept";
        let streams = split_content(input, true);

        assert_eq!(streams.len(), 1);
        assert_eq!(
            streams[0].content(),
            "1\n00:00:01,000 --> 00:00:02,000\nkept\n\n2\n00:00:03,000 --> 00:00:04,000\nalso kept\n\n"
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = "1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\nWelt\r\n\r\n";
        let streams = split_content(input, false);

        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].content(), "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n");
    }

    #[test]
    fn test_slot_output_path_naming() {
        assert_eq!(
            slot_output_path(Path::new("/tmp/movie.srt"), 1),
            PathBuf::from("/tmp/movie (1).srt")
        );
        assert_eq!(
            slot_output_path(Path::new("/tmp/movie.srt"), 2),
            PathBuf::from("/tmp/movie (2).srt")
        );
        assert_eq!(
            slot_output_path(Path::new("/tmp/noext"), 1),
            PathBuf::from("/tmp/noext (1)")
        );
    }

    #[test]
    fn test_split_file_writes_one_file_per_slot() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("movie.srt");
        std::fs::write(&input, BILINGUAL).unwrap();

        let written = split_file(&input, false).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(written[0], dir.path().join("movie (1).srt"));
        assert_eq!(written[1], dir.path().join("movie (2).srt"));

        let first = std::fs::read_to_string(&written[0]).unwrap();
        assert!(first.contains("Hello"));
        assert!(!first.contains("你好"));
    }

    #[test]
    fn test_split_file_is_idempotent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("movie.srt");
        std::fs::write(&input, BILINGUAL).unwrap();

        let first_run = split_file(&input, false).unwrap();
        let second_run = split_file(&input, false).unwrap();

        assert_eq!(first_run, second_run);
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        // Input plus exactly two outputs, no duplicates.
        assert_eq!(entries, 3);
    }

    #[test]
    fn test_split_file_empty_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.srt");
        std::fs::write(&input, "\n\n").unwrap();

        let written = split_file(&input, false).unwrap();

        assert!(written.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_split_file_missing_input() {
        let err = split_file("/nonexistent/movie.srt", false).unwrap_err();
        assert!(matches!(err, FfboxError::FileNotFound(_)));
    }

    #[test]
    fn test_split_file_write_failure_names_stream() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("movie.srt");
        std::fs::write(&input, BILINGUAL).unwrap();
        // A directory squatting on the first output path makes its write fail
        std::fs::create_dir(dir.path().join("movie (1).srt")).unwrap();

        let err = split_file(&input, false).unwrap_err();

        match err {
            FfboxError::Media(msg) => {
                assert!(msg.contains("language 1"));
                assert!(msg.contains("movie (1).srt"));
            }
            other => panic!("expected Media error, got {:?}", other),
        }
    }

    #[test]
    fn test_split_file_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("latin1.srt");
        std::fs::write(&input, b"1\n00:00:01,000 --> 00:00:02,000\ncaf\xe9\n\n").unwrap();

        let err = split_file(&input, false).unwrap_err();
        assert!(matches!(err, FfboxError::Decode(_)));
    }
}
