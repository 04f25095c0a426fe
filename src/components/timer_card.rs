use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Gauge, Widget};

use crate::models::{Timer, TimerMode, TimerState};

/// One timer drawn as a card: title, big time readout and a progress gauge.
pub struct TimerCard<'a> {
    timer: &'a Timer,
    selected: bool,
}

impl<'a> TimerCard<'a> {
    pub fn new(timer: &'a Timer, selected: bool) -> Self {
        TimerCard { timer, selected }
    }

    fn accent(&self) -> Color {
        match (self.timer.state, self.timer.is_finished()) {
            (_, true) => Color::Red,
            (TimerState::Running, _) => Color::Green,
            (TimerState::Paused, _) => Color::Yellow,
            (TimerState::Stopped, _) => Color::Gray,
        }
    }
}

impl Widget for TimerCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.selected {
            Style::default().fg(Color::LightCyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::from(format!(" {} ", self.timer.title)).bold());
        let inner = block.inner(area);
        block.render(area, buf);

        let [status_area, _, time_area, _, gauge_area, hint_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let mode = match self.timer.mode {
            TimerMode::Countdown => "countdown",
            TimerMode::Stopwatch => "stopwatch",
        };
        let state = if self.timer.is_finished() {
            "done"
        } else {
            self.timer.state.label()
        };
        Line::from(format!("{mode} · {state}"))
            .dark_gray()
            .centered()
            .render(status_area, buf);

        Line::from(self.timer.display_time())
            .bold()
            .fg(self.accent())
            .centered()
            .render(time_area, buf);

        Gauge::default()
            .gauge_style(Style::default().fg(self.accent()).bg(Color::Black))
            .ratio(self.timer.progress().clamp(0.0, 1.0))
            .label("")
            .render(gauge_area, buf);

        let action = if self.timer.is_running() { "pause" } else { "start" };
        Line::from(format!("space {action} · r reset"))
            .dark_gray()
            .centered()
            .render(hint_area, buf);
    }
}
