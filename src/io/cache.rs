//! The audio cache: `<cache>/<video id>.<ext>` plus a `<video id>.meta.json`
//! sidecar holding the title and duration, so a hit needs no network access.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::file::AudioFile;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::youtube::{canonical_watch_url, extract_video_id, is_valid_youtube_url};

/// Suffixes left behind by interrupted downloads.
pub const PARTIAL_SUFFIXES: [&str; 4] = [".part", ".ytdl", ".tmp", ".temp"];
const SIDECAR_SUFFIX: &str = ".meta.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub video_id: String,
    pub title: String,
    pub duration: Option<Duration>,
}

/// Fetches metadata and audio for a canonical watch URL.
pub trait Downloader: Send + Sync {
    fn fetch_metadata(&self, url: &str) -> Result<TrackMetadata, CacheError>;

    /// Downloads the best audio stream. `output_template` uses yt-dlp's
    /// `%(ext)s` placeholder. Returns the path the file landed at.
    fn download(&self, url: &str, output_template: &Path) -> Result<PathBuf, CacheError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStage {
    FetchingMetadata,
    Downloading,
}

impl fmt::Display for DownloadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadStage::FetchingMetadata => write!(f, "Fetching metadata..."),
            DownloadStage::Downloading => write!(f, "Downloading audio..."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAudio {
    pub url: String,
    pub video_id: String,
    pub title: String,
    pub duration: Duration,
    pub path: PathBuf,
    /// `false` when the file was already in the cache.
    pub downloaded: bool,
}

pub struct AudioCache {
    dir: PathBuf,
    downloader: Box<dyn Downloader>,
}

impl AudioCache {
    /// Creates the cache directory and clears partial files left by a
    /// previous run.
    pub fn new(dir: impl Into<PathBuf>, downloader: Box<dyn Downloader>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CacheError::Io {
            path: dir.clone(),
            source,
        })?;

        let cache = AudioCache { dir, downloader };
        let removed = cache.cleanup_partial_files(None);
        if removed > 0 {
            tracing::info!("Removed {} partial download(s) from {:?}", removed, cache.dir);
        }

        Ok(cache)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Finds a complete cached audio file for `video_id` without touching
    /// the network.
    pub fn lookup(&self, video_id: &str) -> Option<PathBuf> {
        let prefix = format!("{video_id}.");
        let mut candidates = self
            .entries()
            .filter(|(name, path)| {
                name.starts_with(&prefix)
                    && !is_partial(name)
                    && !name.ends_with(SIDECAR_SUFFIX)
                    && path.is_file()
            })
            .map(|(_, path)| path)
            .collect::<Vec<_>>();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .map(|p| fs::canonicalize(&p).unwrap_or(p))
    }

    /// Returns the cached file for `url`, downloading it first on a miss.
    ///
    /// `on_stage` is told when metadata is fetched and when a download
    /// actually starts.
    pub fn get_or_download<F>(&self, url: &str, mut on_stage: F) -> Result<CachedAudio, CacheError>
    where
        F: FnMut(DownloadStage),
    {
        if !is_valid_youtube_url(url) {
            return Err(CacheError::InvalidUrl(url.to_string()));
        }
        let url = canonical_watch_url(url);
        let url_id = extract_video_id(&url).ok_or_else(|| CacheError::InvalidUrl(url.clone()))?;

        if let (Some(path), Some(meta)) = (self.lookup(&url_id), self.read_sidecar(&url_id)) {
            tracing::debug!("Cache hit for {}", url_id);
            return Ok(self.cached(url, meta, path, false));
        }

        on_stage(DownloadStage::FetchingMetadata);
        let meta = self.downloader.fetch_metadata(&url)?;
        let video_id = meta.video_id.clone();

        self.cleanup_partial_files(Some(&video_id));
        if let Some(path) = self.lookup(&video_id) {
            tracing::debug!("Cache hit for {} after metadata fetch", video_id);
            self.write_sidecar(&meta);
            return Ok(self.cached(url, meta, path, false));
        }

        on_stage(DownloadStage::Downloading);
        tracing::info!("Downloading {} ({})", meta.title, video_id);
        let template = self.dir.join(format!("{video_id}.%(ext)s"));
        let reported = self.downloader.download(&url, &template)?;

        let path = if reported.is_file() {
            fs::canonicalize(&reported).unwrap_or(reported)
        } else {
            self.lookup(&video_id)
                .ok_or_else(|| CacheError::NoAudioFile {
                    video_id: video_id.clone(),
                })?
        };

        self.write_sidecar(&meta);
        Ok(self.cached(url, meta, path, true))
    }

    /// Removes partial download files, for one video or for the whole cache.
    /// Returns how many files were removed.
    pub fn cleanup_partial_files(&self, video_id: Option<&str>) -> usize {
        let prefix = video_id.map(|id| format!("{id}."));
        self.entries()
            .filter(|(name, path)| {
                is_partial(name)
                    && prefix.as_ref().is_none_or(|p| name.starts_with(p.as_str()))
                    && path.is_file()
            })
            .filter(|(_, path)| match fs::remove_file(path) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Could not remove partial file {:?}: {}", path, e);
                    false
                }
            })
            .count()
    }

    fn cached(&self, url: String, meta: TrackMetadata, path: PathBuf, downloaded: bool) -> CachedAudio {
        let duration = meta
            .duration
            .filter(|d| !d.is_zero())
            .or_else(|| probe_duration(&path))
            .unwrap_or(Duration::ZERO);

        CachedAudio {
            url,
            video_id: meta.video_id,
            title: meta.title,
            duration,
            path,
            downloaded,
        }
    }

    fn entries(&self) -> impl Iterator<Item = (String, PathBuf)> + use<> {
        fs::read_dir(&self.dir)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                (name, entry.path())
            })
    }

    fn sidecar_path(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("{video_id}{SIDECAR_SUFFIX}"))
    }

    fn read_sidecar(&self, video_id: &str) -> Option<TrackMetadata> {
        let content = fs::read_to_string(self.sidecar_path(video_id)).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn write_sidecar(&self, meta: &TrackMetadata) {
        let path = self.sidecar_path(&meta.video_id);
        let result = serde_json::to_string_pretty(meta)
            .map_err(std::io::Error::other)
            .and_then(|json| fs::write(&path, json));
        if let Err(e) = result {
            tracing::warn!("Could not write cache metadata {:?}: {}", path, e);
        }
    }
}

fn is_partial(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .map(|tagged| tagged.properties().duration())
        .ok()
        .filter(|d| !d.is_zero())
}
