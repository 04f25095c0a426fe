use std::{path::PathBuf, time::Duration};

use uuid::Uuid;

use crate::io::cache::CachedAudio;
use crate::utils::format_duration_short;

/// A queue entry backed by a file in the audio cache. `uuid` is unique per
/// entry, so the same video can sit in the queue more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub uuid: Uuid,
    pub url: String,
    pub video_id: String,
    pub title: String,
    pub duration: Duration,
    pub path: PathBuf,
}

impl Track {
    pub fn from_cached(audio: CachedAudio) -> Self {
        Track {
            uuid: Uuid::new_v4(),
            url: audio.url,
            video_id: audio.video_id,
            title: audio.title,
            duration: audio.duration,
            path: audio.path,
        }
    }

    pub fn display_text(&self) -> String {
        format!(
            "{}  [{}]",
            self.title,
            format_duration_short(self.duration.as_secs())
        )
    }

    pub fn is_cached(&self) -> bool {
        self.path.is_file()
    }
}
