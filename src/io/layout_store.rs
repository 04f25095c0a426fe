//! Persistence for the dashboard layout.
//!
//! `load` never fails: a missing file yields the empty layout, and a file
//! that cannot be parsed is moved aside to `layout.json.corrupt` before the
//! empty layout is returned. `save` writes through a temp file and renames it
//! over the target so a crash mid-write leaves the previous layout intact.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::LayoutError;
use crate::models::{
    GridGeometry, LAYOUT_VERSION, LayoutState, MAX_TOTAL_SECONDS, Timer, TimerMode, TimerState,
    new_timer_id,
};

const DEFAULT_TITLE: &str = "Timer";
const DEFAULT_TOTAL_SECONDS: u64 = 60;

pub struct LayoutStore {
    path: PathBuf,
}

impl LayoutStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LayoutStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, ".corrupt")
    }

    fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, ".tmp")
    }

    pub fn load(&self) -> LayoutState {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No layout at {:?}, starting empty", self.path);
                return LayoutState::default();
            }
            Err(e) => {
                tracing::warn!("Could not read layout {:?}: {}", self.path, e);
                return LayoutState::default();
            }
        };

        match parse_layout(&content) {
            Ok(state) => {
                tracing::info!(
                    "Loaded {} timer(s) from {:?}",
                    state.timers.len(),
                    self.path
                );
                state
            }
            Err(e) => {
                tracing::warn!("Layout {:?} is corrupt: {}", self.path, e);
                self.backup_corrupt();
                LayoutState::default()
            }
        }
    }

    pub fn save(&self, state: &LayoutState) -> Result<(), LayoutError> {
        let json = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LayoutError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, json).map_err(|source| LayoutError::Write {
            path: temp_path.clone(),
            source,
        })?;

        let file = fs::File::open(&temp_path).map_err(|source| LayoutError::Write {
            path: temp_path.clone(),
            source,
        })?;
        file.sync_all().map_err(|source| LayoutError::Write {
            path: temp_path.clone(),
            source,
        })?;

        fs::rename(&temp_path, &self.path).map_err(|source| LayoutError::Rename {
            path: self.path.clone(),
            temp_path: temp_path.clone(),
            source,
        })?;

        tracing::debug!("Saved {} timer(s) to {:?}", state.timers.len(), self.path);
        Ok(())
    }

    fn backup_corrupt(&self) -> Option<PathBuf> {
        let backup = self.backup_path();
        match fs::rename(&self.path, &backup) {
            Ok(()) => {
                tracing::warn!("Moved corrupt layout to {:?}", backup);
                Some(backup)
            }
            Err(e) => {
                tracing::warn!("Could not back up corrupt layout {:?}: {}", self.path, e);
                None
            }
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[derive(Deserialize)]
struct RawLayout {
    #[serde(default)]
    timers: Vec<Value>,
    #[serde(default)]
    grid: GridGeometry,
}

/// One timer record as found on disk. Every field is optional; the legacy
/// `timer_id`/`remaining_seconds`/`is_running` fields are still understood.
#[derive(Deserialize)]
struct RawTimer {
    #[serde(alias = "timer_id")]
    id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    mode: TimerMode,
    total_seconds: Option<u64>,
    elapsed_ms: Option<u64>,
    remaining_seconds: Option<u64>,
    state: Option<TimerState>,
    is_running: Option<bool>,
}

impl RawTimer {
    fn into_timer(self) -> Timer {
        let total_seconds = self
            .total_seconds
            .filter(|&s| s > 0 && s <= MAX_TOTAL_SECONDS)
            .unwrap_or(DEFAULT_TOTAL_SECONDS);
        let total_ms = total_seconds.saturating_mul(1000);

        let elapsed_ms = match (self.elapsed_ms, self.remaining_seconds) {
            (Some(ms), _) => ms,
            (None, Some(remaining)) => total_ms.saturating_sub(remaining.saturating_mul(1000)),
            (None, None) => 0,
        };
        let elapsed_ms = match self.mode {
            TimerMode::Countdown => elapsed_ms.min(total_ms),
            TimerMode::Stopwatch => elapsed_ms,
        };

        let state = match (self.state, self.is_running) {
            (Some(state), _) => state,
            (None, Some(true)) => TimerState::Running,
            (None, _) if elapsed_ms > 0 && elapsed_ms < total_ms => TimerState::Paused,
            (None, _) => TimerState::Stopped,
        };

        let mut timer = Timer {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(new_timer_id),
            title: self
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            mode: self.mode,
            total_seconds,
            elapsed_ms,
            state,
        };

        // A finished countdown cannot be running.
        if timer.is_finished() && timer.state == TimerState::Running {
            timer.state = TimerState::Stopped;
        }

        timer
    }
}

fn parse_layout(content: &str) -> Result<LayoutState, serde_json::Error> {
    let raw: RawLayout = serde_json::from_str(content)?;

    let mut seen = HashSet::new();
    let mut timers = Vec::with_capacity(raw.timers.len());
    for value in raw.timers {
        match serde_json::from_value::<RawTimer>(value) {
            Ok(record) => {
                let timer = record.into_timer();
                if seen.insert(timer.id.clone()) {
                    timers.push(timer);
                } else {
                    tracing::warn!("Skipping duplicate timer id {}", timer.id);
                }
            }
            Err(e) => tracing::warn!("Skipping invalid timer record: {}", e),
        }
    }

    Ok(LayoutState {
        version: LAYOUT_VERSION,
        timers,
        grid: raw.grid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_state() -> LayoutState {
        let mut running = Timer::countdown("tea", 180);
        running.start();
        running.tick(std::time::Duration::from_millis(42_500));

        let mut paused = Timer::stopwatch("laps");
        paused.start();
        paused.tick(std::time::Duration::from_secs(75));
        paused.pause();

        LayoutState {
            version: LAYOUT_VERSION,
            timers: vec![Timer::countdown("1 min", 60), running, paused],
            grid: GridGeometry { columns: 3 },
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = LayoutStore::new(dir.path().join("layout.json"));
        let state = sample_state();

        store.save(&state).unwrap();
        assert_eq!(store.load(), state);

        // Saving what was loaded changes nothing.
        store.save(&store.load()).unwrap();
        assert_eq!(store.load(), state);
    }

    #[test]
    fn missing_file_yields_empty_state() {
        let dir = tempdir().unwrap();
        let store = LayoutStore::new(dir.path().join("layout.json"));
        assert_eq!(store.load(), LayoutState::default());
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn corrupt_file_is_backed_up_and_yields_empty_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, "{ not json").unwrap();
        let store = LayoutStore::new(&path);

        assert_eq!(store.load(), LayoutState::default());
        assert!(!path.exists());
        assert_eq!(
            fs::read_to_string(store.backup_path()).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn non_object_json_counts_as_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let store = LayoutStore::new(&path);

        assert!(store.load().timers.is_empty());
        assert!(store.backup_path().exists());
    }

    #[test]
    fn save_creates_parent_directories_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("layout.json");
        let store = LayoutStore::new(&path);

        store.save(&LayoutState::default()).unwrap();
        assert!(path.exists());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn missing_fields_get_defaults() {
        let state = parse_layout(r#"{"timers": [{}]}"#).unwrap();
        let timer = &state.timers[0];
        assert_eq!(timer.title, "Timer");
        assert_eq!(timer.total_seconds, 60);
        assert_eq!(timer.elapsed_ms, 0);
        assert_eq!(timer.state, TimerState::Stopped);
        assert_eq!(timer.mode, TimerMode::Countdown);
        assert!(!timer.id.is_empty());
    }

    #[test]
    fn legacy_records_are_understood() {
        let json = r#"{
            "timers": [
                {"timer_id": "abc", "title": "Tea", "total_seconds": 180,
                 "remaining_seconds": 120, "is_running": true},
                {"timer_id": "def", "title": "Nap", "total_seconds": 600,
                 "remaining_seconds": 300, "is_running": false}
            ]
        }"#;
        let state = parse_layout(json).unwrap();
        assert_eq!(state.timers[0].id, "abc");
        assert_eq!(state.timers[0].remaining_seconds(), 120);
        assert_eq!(state.timers[0].state, TimerState::Running);
        assert_eq!(state.timers[1].state, TimerState::Paused);
    }

    #[test]
    fn invalid_records_and_duplicates_are_skipped() {
        let json = r#"{
            "timers": [
                {"id": "a", "title": "First"},
                "garbage",
                {"id": "b", "mode": "hourglass"},
                {"id": "a", "title": "Second"}
            ]
        }"#;
        let state = parse_layout(json).unwrap();
        assert_eq!(state.timers.len(), 1);
        assert_eq!(state.timers[0].title, "First");
    }

    #[test]
    fn oversized_duration_falls_back_to_default() {
        let state = parse_layout(
            r#"{"timers": [
                {"id": "a", "total_seconds": 18446744073709551615, "remaining_seconds": 5},
                {"id": "b", "total_seconds": 360000}
            ]}"#,
        )
        .unwrap();
        assert_eq!(state.timers.len(), 2);
        assert!(state.timers.iter().all(|t| t.total_seconds == 60));
        assert_eq!(state.timers[0].remaining_seconds(), 5);
    }

    #[test]
    fn elapsed_is_clamped_to_duration() {
        let state = parse_layout(
            r#"{"timers": [{"total_seconds": 10, "elapsed_ms": 99999, "state": "running"}]}"#,
        )
        .unwrap();
        let timer = &state.timers[0];
        assert_eq!(timer.elapsed_ms, 10_000);
        assert_eq!(timer.state, TimerState::Stopped);
    }
}
