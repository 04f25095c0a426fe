use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;

use serde::Deserialize;

use super::cache::{Downloader, TrackMetadata};
use crate::error::CacheError;

const PROGRAM: &str = "yt-dlp";
const AUDIO_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio/best";
const RETRIES: &str = "3";

/// `Downloader` backed by the `yt-dlp` executable.
pub struct YtDlp {
    program: PathBuf,
}

#[derive(Deserialize)]
struct VideoInfo {
    id: String,
    title: Option<String>,
    duration: Option<f64>,
}

impl YtDlp {
    pub fn new() -> Self {
        YtDlp {
            program: PathBuf::from(PROGRAM),
        }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        YtDlp {
            program: program.into(),
        }
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    fn run(&self, args: &[&str]) -> Result<Output, CacheError> {
        tracing::debug!("Running {} {:?}", self.program_name(), args);
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    CacheError::ToolMissing {
                        program: self.program_name(),
                    }
                } else {
                    CacheError::Spawn {
                        program: self.program_name(),
                        source,
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("unknown error")
                .trim()
                .to_string();
            return Err(CacheError::CommandFailed {
                program: self.program_name(),
                message,
            });
        }

        Ok(output)
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

impl Downloader for YtDlp {
    fn fetch_metadata(&self, url: &str) -> Result<TrackMetadata, CacheError> {
        let output = self.run(&[
            "--dump-single-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            "--",
            url,
        ])?;

        let info: VideoInfo =
            serde_json::from_slice(&output.stdout).map_err(CacheError::Metadata)?;
        Ok(info.into_metadata())
    }

    fn download(&self, url: &str, output_template: &Path) -> Result<PathBuf, CacheError> {
        let template = output_template.to_string_lossy();
        let output = self.run(&[
            "--format",
            AUDIO_FORMAT,
            "--no-playlist",
            "--no-part",
            "--retries",
            RETRIES,
            "--quiet",
            "--no-warnings",
            "--no-simulate",
            "--print",
            "after_move:filepath",
            "--output",
            &*template,
            "--",
            url,
        ])?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(last_path_line(&stdout).unwrap_or_else(|| output_template.to_path_buf()))
    }
}

impl VideoInfo {
    fn into_metadata(self) -> TrackMetadata {
        TrackMetadata {
            video_id: self.id,
            title: self
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            duration: self
                .duration
                .filter(|d| *d > 0.0)
                .and_then(|d| Duration::try_from_secs_f64(d).ok()),
        }
    }
}

fn last_path_line(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_from_video_info() {
        let info: VideoInfo = serde_json::from_str(
            r#"{"id": "dQw4w9WgXcQ", "title": "Song", "duration": 213.0, "uploader": "x"}"#,
        )
        .unwrap();
        let meta = info.into_metadata();
        assert_eq!(meta.video_id, "dQw4w9WgXcQ");
        assert_eq!(meta.title, "Song");
        assert_eq!(meta.duration, Some(Duration::from_secs(213)));
    }

    #[test]
    fn missing_title_and_duration_fall_back() {
        let info: VideoInfo = serde_json::from_str(r#"{"id": "abc", "title": null}"#).unwrap();
        let meta = info.into_metadata();
        assert_eq!(meta.title, "Untitled");
        assert_eq!(meta.duration, None);
    }

    #[test]
    fn out_of_range_duration_is_dropped() {
        let info: VideoInfo =
            serde_json::from_str(r#"{"id": "abc", "title": "Long", "duration": 1e300}"#).unwrap();
        assert_eq!(info.into_metadata().duration, None);
    }

    #[test]
    fn printed_path_is_last_non_empty_line() {
        assert_eq!(
            last_path_line("noise\n/cache/abc.m4a\n\n"),
            Some(PathBuf::from("/cache/abc.m4a"))
        );
        assert_eq!(last_path_line("  \n"), None);
    }

    #[test]
    fn missing_binary_is_reported_as_tool_missing() {
        let ytdlp = YtDlp::with_program("definitely-not-a-real-yt-dlp-binary");
        let err = ytdlp
            .fetch_metadata("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .unwrap_err();
        assert!(matches!(err, CacheError::ToolMissing { .. }));
    }
}
