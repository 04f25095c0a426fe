//! Error types for the persistence, cache, queue and build layers.
//!
//! The UI loop and `main` work with `color_eyre::Result`; these enums are what
//! the lower layers return so callers can match on the failure kind.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing `layout.json`.
///
/// Loading never fails: a missing or corrupt file yields the empty layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Failed to serialize layout: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write layout file: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to replace {path} with {temp_path}")]
    Rename {
        path: PathBuf,
        temp_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the audio cache and the downloader behind it.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid YouTube URL.")]
    InvalidUrl(String),

    #[error("{program} is not installed or not on PATH")]
    ToolMissing { program: String },

    #[error("Failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed: {message}")]
    CommandFailed { program: String, message: String },

    #[error("Failed to read video metadata: {0}")]
    Metadata(#[source] serde_json::Error),

    #[error("Download finished but no audio file found in cache for {video_id}.")]
    NoAudioFile { video_id: String },

    #[error("Cache I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Queue transport failures. These are user-facing status messages rather
/// than faults.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue is empty.")]
    Empty,

    #[error("No queue entry at position {index} (length {len}).")]
    OutOfBounds { index: usize, len: usize },

    #[error("Reached end of queue.")]
    EndOfQueue,

    #[error("No previous item.")]
    NoPrevious,

    #[error("Nothing to resume.")]
    NothingToResume,
}

/// Errors that abort startup while rebuilding the packaged executable.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Could not remove old executable ({path})")]
    RemoveStale {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare build output at {path}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Build exited with status {}", code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    Failed { code: Option<i32> },

    #[error("Failed to copy {from} to {to}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Build succeeded but no executable was produced at {path}")]
    MissingArtifact { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_failed_display_includes_exit_code() {
        let err = BuildError::Failed { code: Some(101) };
        assert!(err.to_string().contains("101"));
    }

    #[test]
    fn build_failed_display_without_code() {
        let err = BuildError::Failed { code: None };
        assert!(err.to_string().contains("unknown"));
    }

    #[test]
    fn remove_stale_chains_io_source() {
        let err = BuildError::RemoveStale {
            path: PathBuf::from("dist/TimerDashboard"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("dist/TimerDashboard"));
    }

    #[test]
    fn tool_missing_names_program() {
        let err = CacheError::ToolMissing {
            program: "yt-dlp".to_string(),
        };
        assert!(err.to_string().contains("yt-dlp"));
    }

    #[test]
    fn queue_errors_read_as_status_messages() {
        assert_eq!(QueueError::EndOfQueue.to_string(), "Reached end of queue.");
        assert_eq!(QueueError::NoPrevious.to_string(), "No previous item.");
    }
}
