use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::event::Key;

pub const LAYOUT_FILE_NAME: &str = "layout.json";
pub const CACHE_DIR_NAME: &str = "cache";
pub const DIST_DIR_NAME: &str = "dist";
pub const DEFAULT_VOLUME: u8 = 80;

/// Process-scoped settings handed to every constructor that touches disk.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub layout_path: PathBuf,
    pub cache_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub tick_rate: Duration,
    pub volume: u8,
    pub key_config: KeyConfig,
}

impl Config {
    /// Lays out `layout.json`, `cache/` and `dist/` under `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Config {
            layout_path: base_dir.join(LAYOUT_FILE_NAME),
            cache_dir: base_dir.join(CACHE_DIR_NAME),
            dist_dir: base_dir.join(DIST_DIR_NAME),
            base_dir,
            tick_rate: Duration::from_millis(250),
            volume: DEFAULT_VOLUME,
            key_config: KeyConfig::default(),
        }
    }

    pub fn with_layout_path(mut self, path: impl AsRef<Path>) -> Self {
        self.layout_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = volume.min(100);
        self
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct KeyConfig {
    pub quit: Key,
    pub switch_focus: Key,
    pub save_layout: Key,
    pub cancel: Key,

    pub scroll_up: Key,
    pub scroll_down: Key,
    pub scroll_left: Key,
    pub scroll_right: Key,

    pub toggle_timer: Key,
    pub reset_timer: Key,
    pub delete_timer: Key,
    pub edit_timer: Key,
    pub add_one_minute: Key,
    pub add_three_minutes: Key,
    pub add_one_hour: Key,
    pub add_custom_timer: Key,
    pub add_stopwatch: Key,
    pub move_card_left: Key,
    pub move_card_right: Key,
    pub more_columns: Key,
    pub fewer_columns: Key,

    pub add_url: Key,
    pub play_audio: Key,
    pub pause: Key,
    pub stop: Key,
    pub skip_to_next_audio: Key,
    pub skip_to_prev_audio: Key,
    pub remove_from_queue: Key,
    pub move_track_up: Key,
    pub move_track_down: Key,
    pub clear_queue: Key,

    pub seek_forward: Key,
    pub seek_backward: Key,
    pub volume_up: Key,
    pub volume_down: Key,
}

impl Default for KeyConfig {
    fn default() -> Self {
        KeyConfig {
            quit: Key::Char('q'),
            switch_focus: Key::Tab,
            save_layout: Key::Ctrl('s'),
            cancel: Key::Esc,
            scroll_up: Key::Char('k'),
            scroll_down: Key::Char('j'),
            scroll_left: Key::Char('h'),
            scroll_right: Key::Char('l'),
            toggle_timer: Key::Char(' '),
            reset_timer: Key::Char('r'),
            delete_timer: Key::Char('d'),
            edit_timer: Key::Char('e'),
            add_one_minute: Key::Char('1'),
            add_three_minutes: Key::Char('2'),
            add_one_hour: Key::Char('3'),
            add_custom_timer: Key::Char('c'),
            add_stopwatch: Key::Char('w'),
            move_card_left: Key::Char('H'),
            move_card_right: Key::Char('L'),
            more_columns: Key::Char('+'),
            fewer_columns: Key::Char('-'),
            add_url: Key::Char('a'),
            play_audio: Key::Enter,
            pause: Key::Char(' '),
            stop: Key::Char('s'),
            skip_to_next_audio: Key::Char('n'),
            skip_to_prev_audio: Key::Char('p'),
            remove_from_queue: Key::Char('x'),
            move_track_up: Key::Char('K'),
            move_track_down: Key::Char('J'),
            clear_queue: Key::Char('C'),
            seek_forward: Key::Char(']'),
            seek_backward: Key::Char('['),
            volume_up: Key::Char('.'),
            volume_down: Key::Char(','),
        }
    }
}

impl KeyConfig {
    pub fn is_up(&self, key: Key) -> bool {
        key == self.scroll_up || key == Key::Up
    }

    pub fn is_down(&self, key: Key) -> bool {
        key == self.scroll_down || key == Key::Down
    }

    pub fn is_left(&self, key: Key) -> bool {
        key == self.scroll_left || key == Key::Left
    }

    pub fn is_right(&self, key: Key) -> bool {
        key == self.scroll_right || key == Key::Right
    }
}
