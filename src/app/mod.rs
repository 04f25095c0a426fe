use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossbeam_channel::{Receiver, Sender};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Widget, WidgetRef};

use crate::components::{
    Component, ComponentCommand, PlayerControlsComponent, QueuePanelComponent,
    TimerFormComponent, TimerGridComponent, UrlPromptComponent,
};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::download_worker::{DownloadMessage, spawn_download};
use crate::event::{AudioMessage, Command as AudioCommand, Event, EventState, Key};
use crate::io::{AudioCache, LayoutStore};

const SAVE_DEBOUNCE: Duration = Duration::from_millis(250);
const SEEK_STEP: Duration = Duration::from_secs(5);
const VOLUME_STEP: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Timers,
    Queue,
}

enum Popup {
    Url(UrlPromptComponent),
    TimerForm(TimerFormComponent),
}

pub struct App {
    timer_grid: TimerGridComponent,
    queue_panel: QueuePanelComponent,
    player_controls: PlayerControlsComponent,
    popup: Option<Popup>,

    focus: Focus,
    layout_store: LayoutStore,
    cache: Arc<AudioCache>,

    audio_tx: Sender<AudioCommand>,
    event_tx: Sender<Event>,
    widget_cmd_tx: Sender<ComponentCommand>,
    widget_cmd_rx: Receiver<ComponentCommand>,

    last_tick: Instant,
    save_deadline: Option<Instant>,
    playback_pos: Duration,

    pub config: Config,
}

impl App {
    pub fn new(
        config: Config,
        cache: Arc<AudioCache>,
        audio_tx: Sender<AudioCommand>,
        event_tx: Sender<Event>,
    ) -> Self {
        let layout_store = LayoutStore::new(&config.layout_path);
        let mut dashboard = Dashboard::from_layout(layout_store.load());
        let mut player_controls = PlayerControlsComponent::new(config.volume);

        if dashboard.seed_defaults() {
            tracing::info!("No saved timers, seeding presets");
            dashboard.take_dirty();
            if let Err(e) = layout_store.save(&dashboard.to_layout()) {
                tracing::warn!("Could not write initial layout: {}", e);
                player_controls.set_status(format!("Could not save layout: {e}"));
            }
        }

        let (widget_cmd_tx, widget_cmd_rx) = crossbeam_channel::bounded(256);

        App {
            timer_grid: TimerGridComponent::new(
                dashboard,
                config.key_config.clone(),
                widget_cmd_tx.clone(),
            ),
            queue_panel: QueuePanelComponent::new(config.key_config.clone(), widget_cmd_tx.clone()),
            player_controls,
            popup: None,
            focus: Focus::Timers,
            layout_store,
            cache,
            audio_tx,
            event_tx,
            widget_cmd_tx,
            widget_cmd_rx,
            last_tick: Instant::now(),
            save_deadline: None,
            playback_pos: Duration::ZERO,
            config,
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let [main_area, controls_area, help_area] = Layout::new(
            Direction::Vertical,
            [
                Constraint::Fill(1),
                Constraint::Length(6),
                Constraint::Length(1),
            ],
        )
        .areas(area);

        let [timers_area, queue_area] = Layout::new(
            Direction::Horizontal,
            [Constraint::Fill(3), Constraint::Fill(1)],
        )
        .areas(main_area);

        self.timer_grid.render_ref(timers_area, buf);
        self.queue_panel.render_ref(queue_area, buf);
        self.player_controls.render_ref(controls_area, buf);

        Line::raw("tab switch panel · a add URL · ctrl-s save · q quit")
            .style(Style::default().fg(Color::DarkGray))
            .centered()
            .render(help_area, buf);

        match &self.popup {
            Some(Popup::Url(prompt)) => prompt.render_ref(area, buf),
            Some(Popup::TimerForm(form)) => form.render_ref(area, buf),
            None => {}
        }
    }

    pub fn event(&mut self, key: Key) -> Result<EventState> {
        let mut res = self.component_event(key)?;
        if !res.is_consumed() {
            res = self.global_event(key)?;
        }
        self.drain_commands()?;
        self.schedule_save();
        Ok(res)
    }

    /// Advances timers by the real time since the last tick and flushes a
    /// pending layout save once it is due.
    pub fn tick(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;

        if self.timer_grid.dashboard().any_running() {
            for title in self.timer_grid.tick(dt) {
                tracing::info!("Timer finished: {}", title);
                self.player_controls.set_status(format!("{title} finished!"));
            }
        }

        _ = self.audio_tx.send(AudioCommand::SendState);

        self.drain_commands()?;
        self.schedule_save();
        if self.save_deadline.is_some_and(|deadline| now >= deadline) {
            self.save_layout();
        }
        Ok(())
    }

    pub fn audio(&mut self, audio_message: AudioMessage) -> Result<()> {
        match audio_message {
            AudioMessage::EndOfTrack => {
                self.playback_pos = Duration::ZERO;
                self.queue_panel.track_finished()?;
            }
            AudioMessage::State(state) => {
                self.playback_pos = state.pos;
                self.player_controls.position = state.pos;
                if let Some(total) = state.total_duration {
                    self.player_controls.total = total;
                }
            }
            AudioMessage::Error(message) => {
                tracing::warn!("Audio error: {}", message);
                if self.queue_panel.queue().is_playing() {
                    self.queue_panel.playback_failed();
                    self.player_controls.clear();
                }
                self.player_controls.set_status(message);
            }
        }
        self.drain_commands()
    }

    pub fn download(&mut self, message: DownloadMessage) -> Result<()> {
        match message {
            DownloadMessage::Progress(stage) => self.player_controls.set_status(stage),
            DownloadMessage::Finished(track) => {
                self.finish_download();
                self.queue_panel.add_track(track)?;
            }
            DownloadMessage::Failed(error) => {
                self.finish_download();
                self.player_controls.set_status(format!("Error: {error}"));
            }
        }
        self.drain_commands()
    }

    /// Writes the layout now, whatever the debounce says.
    pub fn save_layout(&mut self) {
        self.save_deadline = None;
        let layout = self.timer_grid.dashboard().to_layout();
        match self.layout_store.save(&layout) {
            Ok(()) => tracing::debug!("Saved layout to {:?}", self.layout_store.path()),
            Err(e) => {
                tracing::error!("Saving layout failed: {}", e);
                self.player_controls
                    .set_status(format!("Could not save layout: {e}"));
            }
        }
    }

    /// Final save and player stop before the process exits.
    pub fn shutdown(&mut self) {
        self.save_layout();
        _ = self.audio_tx.send(AudioCommand::Stop);
    }

    fn finish_download(&mut self) {
        self.player_controls.pending_downloads =
            self.player_controls.pending_downloads.saturating_sub(1);
    }

    fn component_event(&mut self, key: Key) -> Result<EventState> {
        match &mut self.popup {
            Some(Popup::Url(prompt)) => return prompt.event(key),
            Some(Popup::TimerForm(form)) => return form.event(key),
            None => {}
        }

        match self.focus {
            Focus::Timers => self.timer_grid.event(key),
            Focus::Queue => self.queue_panel.event(key),
        }
    }

    fn global_event(&mut self, key: Key) -> Result<EventState> {
        let keys = self.config.key_config.clone();

        if key == keys.switch_focus || key == Key::BackTab {
            self.set_focus(match self.focus {
                Focus::Timers => Focus::Queue,
                Focus::Queue => Focus::Timers,
            });
        } else if key == keys.save_layout {
            self.save_layout();
            self.player_controls.set_status("Layout saved.");
        } else if key == keys.add_url {
            self.popup = Some(Popup::Url(UrlPromptComponent::new(
                self.config.key_config.clone(),
                self.widget_cmd_tx.clone(),
            )));
        } else if key == keys.seek_forward {
            self.seek_by(SEEK_STEP, true);
        } else if key == keys.seek_backward {
            self.seek_by(SEEK_STEP, false);
        } else if key == keys.volume_up {
            self.change_volume(VOLUME_STEP, true);
        } else if key == keys.volume_down {
            self.change_volume(VOLUME_STEP, false);
        } else {
            return Ok(EventState::NotConsumed);
        }

        Ok(EventState::Consumed)
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.timer_grid.focused = focus == Focus::Timers;
        self.queue_panel.focused = focus == Focus::Queue;
    }

    fn seek_by(&mut self, step: Duration, forward: bool) {
        if self.queue_panel.queue().current_track().is_none() {
            return;
        }
        let target = if forward {
            let target = self.playback_pos + step;
            match self.player_controls.total {
                total if total.is_zero() => target,
                total => target.min(total),
            }
        } else {
            self.playback_pos.saturating_sub(step)
        };
        self.playback_pos = target;
        _ = self.audio_tx.send(AudioCommand::Seek(target));
    }

    fn change_volume(&mut self, step: u8, up: bool) {
        let volume = if up {
            self.player_controls.volume.saturating_add(step).min(100)
        } else {
            self.player_controls.volume.saturating_sub(step)
        };
        self.player_controls.volume = volume;
        _ = self
            .audio_tx
            .send(AudioCommand::SetVolume(f32::from(volume) / 100.0));
    }

    fn schedule_save(&mut self) {
        if self.timer_grid.dashboard_mut().take_dirty() && self.save_deadline.is_none() {
            self.save_deadline = Some(Instant::now() + SAVE_DEBOUNCE);
        }
    }

    fn drain_commands(&mut self) -> Result<()> {
        while let Ok(cmd) = self.widget_cmd_rx.try_recv() {
            match cmd {
                ComponentCommand::TimerGrid(cmd) => {
                    use crate::components::timer_grid::Command;
                    match cmd {
                        Command::Status(message) => self.player_controls.set_status(message),
                        Command::NewTimer => {
                            self.popup = Some(Popup::TimerForm(TimerFormComponent::new_timer(
                                self.config.key_config.clone(),
                                self.widget_cmd_tx.clone(),
                            )));
                        }
                        Command::EditTimer {
                            id,
                            title,
                            total_seconds,
                        } => {
                            self.popup = Some(Popup::TimerForm(TimerFormComponent::edit(
                                id,
                                title,
                                total_seconds,
                                self.config.key_config.clone(),
                                self.widget_cmd_tx.clone(),
                            )));
                        }
                    }
                }
                ComponentCommand::QueuePanel(cmd) => {
                    use crate::components::queue_panel::Command;
                    match cmd {
                        Command::Play(track) => {
                            self.playback_pos = Duration::ZERO;
                            self.player_controls.now_playing(&track);
                            _ = self.audio_tx.send(AudioCommand::Play(track.path));
                        }
                        Command::Pause => {
                            _ = self.audio_tx.send(AudioCommand::Pause);
                        }
                        Command::Resume => {
                            _ = self.audio_tx.send(AudioCommand::Resume);
                        }
                        Command::Stop => {
                            self.playback_pos = Duration::ZERO;
                            self.player_controls.clear();
                            _ = self.audio_tx.send(AudioCommand::Stop);
                        }
                        Command::Status(message) => self.player_controls.set_status(message),
                    }
                }
                ComponentCommand::UrlPrompt(cmd) => {
                    use crate::components::url_prompt::Command;
                    self.popup = None;
                    if let Command::Submit(url) = cmd {
                        tracing::info!("Queueing download of {}", url);
                        self.player_controls.pending_downloads += 1;
                        self.player_controls.set_status("Fetching metadata...");
                        spawn_download(self.cache.clone(), url, self.event_tx.clone());
                    }
                }
                ComponentCommand::TimerForm(cmd) => {
                    use crate::components::timer_form::Command;
                    self.popup = None;
                    match cmd {
                        Command::Create {
                            title,
                            total_seconds,
                        } => {
                            let title = self
                                .timer_grid
                                .dashboard_mut()
                                .add_countdown(&title, total_seconds)
                                .title
                                .clone();
                            self.player_controls.set_status(format!("Added {title}"));
                        }
                        Command::SetDuration { id, total_seconds } => {
                            self.timer_grid
                                .dashboard_mut()
                                .update(&id, |t| t.set_duration(total_seconds));
                        }
                        Command::Cancel => {}
                    }
                }
            }
        }

        self.player_controls.playing = self.queue_panel.queue().is_playing();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::io::{Downloader, TrackMetadata};
    use std::path::{Path, PathBuf};
    use tempfile::{TempDir, tempdir};

    struct OfflineDownloader;

    impl Downloader for OfflineDownloader {
        fn fetch_metadata(&self, _url: &str) -> Result<TrackMetadata, CacheError> {
            Err(CacheError::ToolMissing {
                program: "yt-dlp".into(),
            })
        }

        fn download(&self, _url: &str, _output: &Path) -> Result<PathBuf, CacheError> {
            Err(CacheError::ToolMissing {
                program: "yt-dlp".into(),
            })
        }
    }

    struct Harness {
        app: App,
        audio_rx: Receiver<AudioCommand>,
        _event_rx: Receiver<Event>,
        dir: TempDir,
    }

    fn harness() -> Harness {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path());
        let cache = Arc::new(AudioCache::new(&config.cache_dir, Box::new(OfflineDownloader)).unwrap());
        let (audio_tx, audio_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        Harness {
            app: App::new(config, cache, audio_tx, event_tx),
            audio_rx,
            _event_rx: event_rx,
            dir,
        }
    }

    #[test]
    fn first_run_seeds_and_saves_presets() {
        let h = harness();
        assert_eq!(h.app.timer_grid.dashboard().len(), 3);
        let saved = LayoutStore::new(h.dir.path().join("layout.json")).load();
        assert_eq!(saved.timers.len(), 3);
    }

    #[test]
    fn edits_are_saved_after_debounce() {
        let mut h = harness();
        h.app.event(Key::Char('w')).unwrap();
        assert!(h.app.save_deadline.is_some());

        h.app.save_deadline = Some(Instant::now());
        h.app.tick().unwrap();
        assert!(h.app.save_deadline.is_none());

        let saved = LayoutStore::new(h.dir.path().join("layout.json")).load();
        assert_eq!(saved.timers.len(), 4);
    }

    #[test]
    fn custom_timer_form_round_trip() {
        let mut h = harness();
        h.app.event(Key::Char('c')).unwrap();
        assert!(matches!(h.app.popup, Some(Popup::TimerForm(_))));

        // The form swallows the quit key as text.
        assert!(h.app.event(Key::Char('q')).unwrap().is_consumed());
        h.app.event(Key::Enter).unwrap();
        assert!(h.app.popup.is_none());
        assert_eq!(h.app.timer_grid.dashboard().len(), 4);
    }

    #[test]
    fn tab_switches_focus_and_quit_falls_through() {
        let mut h = harness();
        h.app.event(Key::Tab).unwrap();
        assert_eq!(h.app.focus, Focus::Queue);
        assert!(!h.app.event(Key::Char('q')).unwrap().is_consumed());
    }

    #[test]
    fn invalid_url_never_reaches_downloader() {
        let mut h = harness();
        h.app.event(Key::Char('a')).unwrap();
        for c in "not a url".chars() {
            h.app.event(Key::Char(c)).unwrap();
        }
        h.app.event(Key::Enter).unwrap();
        assert!(matches!(h.app.popup, Some(Popup::Url(_))));
        assert_eq!(h.app.player_controls.pending_downloads, 0);
    }

    #[test]
    fn volume_keys_clamp_and_reach_audio_thread() {
        let mut h = harness();
        for _ in 0..10 {
            h.app.event(Key::Char('.')).unwrap();
        }
        assert_eq!(h.app.player_controls.volume, 100);
        let last = h.audio_rx.try_iter().last();
        assert_eq!(last, Some(AudioCommand::SetVolume(1.0)));
    }

    #[test]
    fn audio_error_clears_playing_state() {
        let mut h = harness();
        h.app
            .audio(AudioMessage::Error("Audio player unavailable.".into()))
            .unwrap();
        assert_eq!(h.app.player_controls.status, "Audio player unavailable.");
        assert!(!h.app.player_controls.playing);
    }

    #[test]
    fn failed_download_reports_error() {
        let mut h = harness();
        h.app.player_controls.pending_downloads = 1;
        h.app
            .download(DownloadMessage::Failed("yt-dlp is not installed".into()))
            .unwrap();
        assert_eq!(h.app.player_controls.pending_downloads, 0);
        assert!(h.app.player_controls.status.starts_with("Error:"));
    }

    #[test]
    fn shutdown_saves_and_stops_player() {
        let mut h = harness();
        h.app.shutdown();
        assert!(h.audio_rx.try_iter().any(|c| c == AudioCommand::Stop));
        assert!(h.dir.path().join("layout.json").is_file());
    }
}
