use color_eyre::Result;
use crossbeam_channel::Sender;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear};

use super::utils::{TextInput, centered_rect};
use super::{Component, ComponentCommand, Widget, WidgetRef};
use crate::config::KeyConfig;
use crate::event::{EventState, Key};
use crate::models::MAX_TOTAL_SECONDS;
use crate::utils::{format_hms, parse_duration};

pub enum Command {
    Create { title: String, total_seconds: u64 },
    SetDuration { id: String, total_seconds: u64 },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    New,
    Edit { id: String, title: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Duration,
}

/// Popup for a custom countdown, or for changing an existing timer's
/// duration.
pub struct TimerFormComponent {
    mode: Mode,
    title: TextInput,
    duration: TextInput,
    field: Field,
    error: Option<String>,
    key_config: KeyConfig,
    app_cmd_tx: Sender<ComponentCommand>,
}

impl TimerFormComponent {
    pub fn new_timer(key_config: KeyConfig, app_cmd_tx: Sender<ComponentCommand>) -> Self {
        Self {
            mode: Mode::New,
            title: TextInput::with_value("Timer"),
            duration: TextInput::with_value("5:00"),
            field: Field::Title,
            error: None,
            key_config,
            app_cmd_tx,
        }
    }

    pub fn edit(
        id: String,
        title: String,
        total_seconds: u64,
        key_config: KeyConfig,
        app_cmd_tx: Sender<ComponentCommand>,
    ) -> Self {
        Self {
            mode: Mode::Edit { id, title },
            title: TextInput::new(),
            duration: TextInput::with_value(format_hms(total_seconds)),
            field: Field::Duration,
            error: None,
            key_config,
            app_cmd_tx,
        }
    }

    fn switch_field(&mut self) {
        if self.mode == Mode::New {
            self.field = match self.field {
                Field::Title => Field::Duration,
                Field::Duration => Field::Title,
            };
        }
    }

    fn submit(&mut self) -> Result<()> {
        let total_seconds = match parse_duration(self.duration.value()) {
            None => {
                self.error = Some("Use 90, 1:30, 01:30:00 or 1h30m.".to_string());
                return Ok(());
            }
            Some(0) => {
                self.error = Some("Duration must be at least one second.".to_string());
                return Ok(());
            }
            Some(seconds) if seconds > MAX_TOTAL_SECONDS => {
                self.error = Some("Duration must be at most 99:59:59.".to_string());
                return Ok(());
            }
            Some(seconds) => seconds,
        };

        let cmd = match &self.mode {
            Mode::New => Command::Create {
                title: self.title.value().trim().to_string(),
                total_seconds,
            },
            Mode::Edit { id, .. } => Command::SetDuration {
                id: id.clone(),
                total_seconds,
            },
        };
        self.send_command(cmd)
    }

    fn send_command(&self, cmd: Command) -> Result<()> {
        self.app_cmd_tx.send(ComponentCommand::TimerForm(cmd))?;
        Ok(())
    }

    fn render_field(&self, label: &str, input: &TextInput, field: Field, area: Rect, buf: &mut Buffer) {
        let [label_area, input_area] =
            Layout::horizontal([Constraint::Length(11), Constraint::Fill(1)]).areas(area);
        let focused = self.field == field;
        let label = Line::raw(label);
        if focused {
            label.bold().render(label_area, buf);
        } else {
            label.render(label_area, buf);
        }
        input.render(input_area, buf, focused);
    }
}

impl WidgetRef for TimerFormComponent {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let area = centered_rect(area, 50, 7);
        Clear.render(area, buf);

        let heading = match &self.mode {
            Mode::New => " New timer ".to_string(),
            Mode::Edit { title, .. } => format!(" Edit {title} "),
        };
        let area = {
            let border = Block::bordered()
                .border_type(BorderType::Rounded)
                .title(heading);
            let a = border.inner(area);
            border.render(area, buf);
            a
        };

        let [title_area, duration_area, _, message_area, hint_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if self.mode == Mode::New {
            self.render_field("Title", &self.title, Field::Title, title_area, buf);
        }
        self.render_field("Duration", &self.duration, Field::Duration, duration_area, buf);

        if let Some(error) = &self.error {
            Line::raw(error.as_str())
                .style(Style::default().fg(Color::Red))
                .render(message_area, buf);
        }

        Line::raw("tab next field · enter save · esc cancel")
            .style(Style::default().fg(Color::DarkGray))
            .render(hint_area, buf);
    }
}

impl Component for TimerFormComponent {
    /// Swallows every key while open.
    fn event(&mut self, key: Key) -> Result<EventState> {
        if key == self.key_config.cancel {
            self.send_command(Command::Cancel)?;
        } else if key == Key::Enter {
            self.submit()?;
        } else if matches!(key, Key::Tab | Key::BackTab | Key::Up | Key::Down) {
            self.switch_field();
        } else {
            let input = match self.field {
                Field::Title => &mut self.title,
                Field::Duration => &mut self.duration,
            };
            if input.handle(key) {
                self.error = None;
            }
        }
        Ok(EventState::Consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::Receiver;

    fn type_text(form: &mut TimerFormComponent, text: &str) {
        for c in text.chars() {
            form.event(Key::Char(c)).unwrap();
        }
    }

    fn clear_field(form: &mut TimerFormComponent) {
        form.event(Key::Ctrl('u')).unwrap();
    }

    fn new_form() -> (TimerFormComponent, Receiver<ComponentCommand>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (TimerFormComponent::new_timer(KeyConfig::default(), tx), rx)
    }

    #[test]
    fn creates_countdown_from_both_fields() {
        let (mut form, rx) = new_form();
        clear_field(&mut form);
        type_text(&mut form, "Pasta");
        form.event(Key::Tab).unwrap();
        clear_field(&mut form);
        type_text(&mut form, "1h30m");
        form.event(Key::Enter).unwrap();

        match rx.try_recv() {
            Ok(ComponentCommand::TimerForm(Command::Create {
                title,
                total_seconds,
            })) => {
                assert_eq!(title, "Pasta");
                assert_eq!(total_seconds, 5400);
            }
            _ => panic!("expected a create"),
        }
    }

    #[test]
    fn bad_duration_keeps_form_open() {
        let (mut form, rx) = new_form();
        form.event(Key::Tab).unwrap();
        clear_field(&mut form);
        type_text(&mut form, "soon");
        form.event(Key::Enter).unwrap();
        assert!(rx.try_recv().is_err());
        assert!(form.error.is_some());

        clear_field(&mut form);
        type_text(&mut form, "0");
        form.event(Key::Enter).unwrap();
        assert!(rx.try_recv().is_err());

        clear_field(&mut form);
        type_text(&mut form, "100:00:00");
        form.event(Key::Enter).unwrap();
        assert!(rx.try_recv().is_err());

        clear_field(&mut form);
        type_text(&mut form, "999999999999999999:0");
        form.event(Key::Enter).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn edit_prefills_and_only_changes_duration() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut form =
            TimerFormComponent::edit("abc".into(), "Tea".into(), 180, KeyConfig::default(), tx);
        assert_eq!(form.duration.value(), "00:03:00");

        form.event(Key::Tab).unwrap();
        assert_eq!(form.field, Field::Duration);

        clear_field(&mut form);
        type_text(&mut form, "4:00");
        form.event(Key::Enter).unwrap();
        match rx.try_recv() {
            Ok(ComponentCommand::TimerForm(Command::SetDuration { id, total_seconds })) => {
                assert_eq!(id, "abc");
                assert_eq!(total_seconds, 240);
            }
            _ => panic!("expected a duration change"),
        }
    }

    #[test]
    fn esc_cancels() {
        let (mut form, rx) = new_form();
        form.event(Key::Esc).unwrap();
        assert!(matches!(
            rx.try_recv(),
            Ok(ComponentCommand::TimerForm(Command::Cancel))
        ));
    }
}
