use color_eyre::Result;
use crossbeam_channel::Sender;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear};

use super::utils::{TextInput, centered_rect};
use super::{Component, ComponentCommand, Widget, WidgetRef};
use crate::config::KeyConfig;
use crate::error::CacheError;
use crate::event::{EventState, Key};
use crate::youtube::is_valid_youtube_url;

pub enum Command {
    Submit(String),
    Cancel,
}

/// Popup asking for a YouTube link. Only a valid link is submitted.
pub struct UrlPromptComponent {
    input: TextInput,
    error: Option<String>,
    key_config: KeyConfig,
    app_cmd_tx: Sender<ComponentCommand>,
}

impl UrlPromptComponent {
    pub fn new(key_config: KeyConfig, app_cmd_tx: Sender<ComponentCommand>) -> Self {
        Self {
            input: TextInput::new(),
            error: None,
            key_config,
            app_cmd_tx,
        }
    }

    fn submit(&mut self) -> Result<()> {
        let url = self.input.value().trim();
        if url.is_empty() {
            self.error = Some("Paste a YouTube URL.".to_string());
            return Ok(());
        }
        if !is_valid_youtube_url(url) {
            self.error = Some(CacheError::InvalidUrl(url.to_string()).to_string());
            return Ok(());
        }
        let url = url.to_string();
        self.send_command(Command::Submit(url))
    }

    fn send_command(&self, cmd: Command) -> Result<()> {
        self.app_cmd_tx.send(ComponentCommand::UrlPrompt(cmd))?;
        Ok(())
    }
}

impl WidgetRef for UrlPromptComponent {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let area = centered_rect(area, 70, 6);
        Clear.render(area, buf);

        let area = {
            let border = Block::bordered()
                .border_type(BorderType::Rounded)
                .title(" Add YouTube URL ");
            let a = border.inner(area);
            border.render(area, buf);
            a
        };

        let [input_area, _, message_area, hint_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.input.render(input_area, buf, true);

        if let Some(error) = &self.error {
            Line::raw(error.as_str())
                .style(Style::default().fg(Color::Red))
                .render(message_area, buf);
        }

        Line::raw("enter add · esc cancel")
            .style(Style::default().fg(Color::DarkGray))
            .render(hint_area, buf);
    }
}

impl Component for UrlPromptComponent {
    /// Swallows every key while open.
    fn event(&mut self, key: Key) -> Result<EventState> {
        if key == self.key_config.cancel {
            self.send_command(Command::Cancel)?;
        } else if key == Key::Enter {
            self.submit()?;
        } else if self.input.handle(key) {
            self.error = None;
        }
        Ok(EventState::Consumed)
    }
}
