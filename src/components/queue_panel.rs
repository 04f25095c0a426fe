use color_eyre::Result;
use crossbeam_channel::Sender;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};

use super::ComponentCommand;
use super::{Component, Widget, WidgetRef};
use crate::components::utils::VerticalScroll;
use crate::config::KeyConfig;
use crate::event::{EventState, Key};
use crate::models::Track;
use crate::queue::{PlaybackQueue, Transport};

const MISSING_FILE: &str = "Cached file missing. Remove it and add the URL again.";

pub enum Command {
    Play(Track),
    Pause,
    Resume,
    Stop,
    Status(String),
}

pub struct QueuePanelComponent {
    queue: PlaybackQueue,
    scroll: VerticalScroll,
    pub focused: bool,
    key_config: KeyConfig,
    app_cmd_tx: Sender<ComponentCommand>,
}

impl QueuePanelComponent {
    pub fn new(key_config: KeyConfig, app_cmd_tx: Sender<ComponentCommand>) -> Self {
        Self {
            queue: PlaybackQueue::new(),
            scroll: VerticalScroll::new(),
            focused: false,
            key_config,
            app_cmd_tx,
        }
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    pub fn add_track(&mut self, track: Track) -> Result<()> {
        let message = format!("Added: {}", track.title);
        self.queue.add(track);
        self.status(message)
    }

    /// The player ran out of audio: move on, or stop at the end.
    pub fn track_finished(&mut self) -> Result<()> {
        match self.queue.next().cloned() {
            Ok(track) => self.begin(track),
            Err(e) => {
                self.queue.finish_current();
                self.status(e.to_string())
            }
        }
    }

    /// Stops tracking playback without telling the player, for when the
    /// player itself failed.
    pub fn playback_failed(&mut self) {
        self.queue.stop();
    }

    fn start(&mut self, index: usize) -> Result<()> {
        let track = self.queue.play(index)?.clone();
        self.begin(track)
    }

    /// Hands a track the queue just made current to the player, unless its
    /// cached file is gone.
    fn begin(&mut self, track: Track) -> Result<()> {
        if !track.is_cached() {
            tracing::warn!("Cached file vanished: {:?}", track.path);
            self.queue.stop();
            self.send_command(Command::Stop)?;
            return self.status(MISSING_FILE.to_string());
        }
        let message = format!("Playing: {}", track.title);
        self.send_command(Command::Play(track))?;
        self.status(message)
    }

    fn play_selected(&mut self) -> Result<()> {
        match self.queue.selected_index() {
            Some(index) => self.start(index),
            None => self.status("Select an item to play.".to_string()),
        }
    }

    fn toggle(&mut self) -> Result<()> {
        match self.queue.toggle() {
            Ok(Transport::Paused) => self.send_command(Command::Pause),
            Ok(Transport::Resumed) => self.send_command(Command::Resume),
            Ok(Transport::Started(_)) => {
                // Restart through `start` so the cache check applies.
                let index = self.queue.current_index().unwrap_or(0);
                self.start(index)
            }
            Err(e) => self.status(e.to_string()),
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.queue.stop();
        self.send_command(Command::Stop)?;
        self.status("Stopped.".to_string())
    }

    fn skip(&mut self, forward: bool) -> Result<()> {
        let moved = match forward {
            true => self.queue.next(),
            false => self.queue.prev(),
        };
        match moved.cloned() {
            Ok(track) => self.begin(track),
            Err(e) => self.status(e.to_string()),
        }
    }

    fn remove_selected(&mut self) -> Result<()> {
        let Some(index) = self.queue.selected_index() else {
            return self.status("Select an item to remove.".to_string());
        };
        let removed = self.queue.remove(index)?;
        if removed.was_current {
            self.send_command(Command::Stop)?;
        }
        self.status(format!("Removed: {}", removed.track.title))
    }

    fn move_selected(&mut self, delta: isize) -> Result<()> {
        if self.queue.move_selected(delta).is_some() {
            self.status("Reordered queue.".to_string())?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Ok(());
        }
        if self.queue.current_index().is_some() {
            self.send_command(Command::Stop)?;
        }
        self.queue.clear();
        self.status("Cleared queue.".to_string())
    }

    fn status(&self, message: String) -> Result<()> {
        self.send_command(Command::Status(message))
    }

    fn send_command(&self, cmd: Command) -> Result<()> {
        self.app_cmd_tx.send(ComponentCommand::QueuePanel(cmd))?;
        Ok(())
    }

    fn row_text(&self, index: usize, track: &Track) -> String {
        let marker = match (self.queue.current_index() == Some(index), self.queue.is_playing()) {
            (true, true) => "▶ ",
            (true, false) => "‖ ",
            _ => "  ",
        };
        format!("{marker}{}", track.display_text())
    }
}

impl WidgetRef for QueuePanelComponent {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::LightCyan)
        } else {
            Style::default()
        };
        let area = {
            let border = Block::bordered()
                .title(format!(" Queue ({}) ", self.queue.len()))
                .border_style(border_style);
            let a = border.inner(area);
            border.render(area, buf);
            a
        };

        if self.queue.is_empty() {
            Paragraph::new("Queue is empty. Press a to add a YouTube URL.")
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        let selection = self.queue.selected_index().unwrap_or(0);
        let offset = self
            .scroll
            .update(area.height as usize, selection, self.queue.len());

        let lines = self
            .queue
            .tracks()
            .iter()
            .enumerate()
            .skip(offset)
            .take(area.height as usize)
            .map(|(i, t)| Line::raw(self.row_text(i, t)))
            .collect::<Vec<_>>();

        Paragraph::new(lines).render(area, buf);

        if self.queue.selected_index().is_some() && selection >= offset {
            let y = area.y + (selection - offset) as u16;
            let bg = if self.focused {
                Color::Blue
            } else {
                Color::DarkGray
            };
            for x in area.x..area.x + area.width {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_bg(bg);
                }
            }
        }
    }
}

impl Component for QueuePanelComponent {
    fn event(&mut self, key: Key) -> Result<EventState> {
        let keys = self.key_config.clone();

        if keys.is_up(key) {
            self.queue.select_prev();
        } else if keys.is_down(key) {
            self.queue.select_next();
        } else if key == keys.play_audio {
            self.play_selected()?;
        } else if key == keys.pause {
            self.toggle()?;
        } else if key == keys.stop {
            self.stop()?;
        } else if key == keys.skip_to_next_audio {
            self.skip(true)?;
        } else if key == keys.skip_to_prev_audio {
            self.skip(false)?;
        } else if key == keys.remove_from_queue {
            self.remove_selected()?;
        } else if key == keys.move_track_up {
            self.move_selected(-1)?;
        } else if key == keys.move_track_down {
            self.move_selected(1)?;
        } else if key == keys.clear_queue {
            self.clear()?;
        } else {
            return Ok(EventState::NotConsumed);
        }

        Ok(EventState::Consumed)
    }
}
