use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::event::Event;
use crate::io::AudioCache;
use crate::models::Track;

#[derive(Clone, Debug)]
pub enum DownloadMessage {
    Progress(String),
    Finished(Track),
    Failed(String),
}

/// Resolves `url` through the cache on its own thread and reports back to
/// the UI loop. The queue is only touched when `Finished` arrives there.
pub fn spawn_download(cache: Arc<AudioCache>, url: String, event_tx: Sender<Event>) {
    let spawned = std::thread::Builder::new()
        .name("download".into())
        .spawn({
            let event_tx = event_tx.clone();
            move || {
                let message = resolve(&cache, &url, &event_tx);
                _ = event_tx.send(Event::Download(message));
            }
        });

    if let Err(e) = spawned {
        tracing::error!("Could not start download thread: {}", e);
        _ = event_tx.send(Event::Download(DownloadMessage::Failed(e.to_string())));
    }
}

fn resolve(cache: &AudioCache, url: &str, event_tx: &Sender<Event>) -> DownloadMessage {
    let result = cache.get_or_download(url, |stage| {
        _ = event_tx.send(Event::Download(DownloadMessage::Progress(stage.to_string())));
    });

    match result {
        Ok(audio) => {
            tracing::info!(
                "Resolved {} to {:?} (downloaded: {})",
                audio.video_id,
                audio.path,
                audio.downloaded
            );
            DownloadMessage::Finished(Track::from_cached(audio))
        }
        Err(e) => {
            tracing::warn!("Download of {} failed: {}", url, e);
            DownloadMessage::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::io::{Downloader, TrackMetadata};
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::tempdir;

    struct FileWriter;

    impl Downloader for FileWriter {
        fn fetch_metadata(&self, _url: &str) -> Result<TrackMetadata, CacheError> {
            Ok(TrackMetadata {
                video_id: "dQw4w9WgXcQ".to_string(),
                title: "Song".to_string(),
                duration: Some(Duration::from_secs(10)),
            })
        }

        fn download(&self, _url: &str, output_template: &Path) -> Result<PathBuf, CacheError> {
            let path = PathBuf::from(output_template.to_string_lossy().replace("%(ext)s", "m4a"));
            std::fs::write(&path, b"audio").unwrap();
            Ok(path)
        }
    }

    #[test]
    fn reports_progress_then_finished_track() {
        let dir = tempdir().unwrap();
        let cache = Arc::new(AudioCache::new(dir.path(), Box::new(FileWriter)).unwrap());
        let (tx, rx) = crossbeam_channel::unbounded();

        spawn_download(cache, "https://youtu.be/dQw4w9WgXcQ".to_string(), tx);

        let mut progress = Vec::new();
        loop {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                Event::Download(DownloadMessage::Progress(p)) => progress.push(p),
                Event::Download(DownloadMessage::Finished(track)) => {
                    assert_eq!(track.title, "Song");
                    assert!(track.path.is_file());
                    break;
                }
                Event::Download(DownloadMessage::Failed(e)) => panic!("download failed: {e}"),
                _ => panic!("unexpected event"),
            }
        }
        assert_eq!(progress, ["Fetching metadata...", "Downloading audio..."]);
    }

    #[test]
    fn invalid_url_reports_failure() {
        let dir = tempdir().unwrap();
        let cache = Arc::new(AudioCache::new(dir.path(), Box::new(FileWriter)).unwrap());
        let (tx, rx) = crossbeam_channel::unbounded();

        spawn_download(cache, "https://example.com".to_string(), tx);

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            Event::Download(DownloadMessage::Failed(e)) => assert_eq!(e, "Invalid YouTube URL."),
            _ => panic!("expected failure"),
        }
    }
}
