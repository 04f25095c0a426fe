use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, Widget, WidgetRef};

use crate::models::Track;
use crate::utils::format_duration_short;

pub struct PlayerControlsComponent {
    pub name: Option<String>,
    pub position: Duration,
    pub total: Duration,
    pub volume: u8,
    pub playing: bool,
    pub pending_downloads: usize,
    pub status: String,
}

impl PlayerControlsComponent {
    pub fn new(volume: u8) -> Self {
        PlayerControlsComponent {
            name: None,
            position: Duration::ZERO,
            total: Duration::ZERO,
            volume: volume.min(100),
            playing: false,
            pending_downloads: 0,
            status: "Ready.".to_string(),
        }
    }

    pub fn now_playing(&mut self, track: &Track) {
        self.name = Some(track.title.clone());
        self.position = Duration::ZERO;
        self.total = track.duration;
    }

    pub fn clear(&mut self) {
        self.name = None;
        self.position = Duration::ZERO;
        self.total = Duration::ZERO;
    }

    /// Playback progress in percent.
    pub fn progress(&self) -> u16 {
        if self.total.is_zero() {
            return 0;
        }
        let ratio = self.position.as_secs_f64() / self.total.as_secs_f64();
        (ratio.clamp(0.0, 1.0) * 100.0).round() as u16
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }
}

impl WidgetRef for PlayerControlsComponent {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let area = {
            let border = Block::bordered().title(" Player ");
            let a = border.inner(area);
            border.render(area, buf);
            a
        };

        let [name_area, progress_area, control_area, status_area] = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ],
        )
        .areas(area);

        let [time_area, progress_area, total_area] = Layout::new(
            Direction::Horizontal,
            [
                Constraint::Length(9),
                Constraint::Fill(1),
                Constraint::Length(9),
            ],
        )
        .areas(progress_area);

        let name = match (&self.name, self.playing) {
            (Some(name), true) => format!("▶ {name}"),
            (Some(name), false) => format!("‖ {name}"),
            (None, _) => "Nothing playing".to_string(),
        };
        Line::raw(name).bold().centered().render(name_area, buf);

        Line::raw(format_duration_short(self.position.as_secs()))
            .centered()
            .render(time_area, buf);
        Line::raw(format_duration_short(self.total.as_secs()))
            .centered()
            .render(total_area, buf);

        let done = (u32::from(progress_area.width) * u32::from(self.progress()) / 100) as u16;
        for i in 0..progress_area.width {
            if let Some(c) = buf.cell_mut((i + progress_area.x, progress_area.y)) {
                c.set_char(if i < done { '#' } else { '-' });
            }
        }

        let mut controls = format!(
            "space play/pause · n next · p prev · s stop · [ ] seek · , . vol {}%",
            self.volume
        );
        if self.pending_downloads > 0 {
            controls.push_str(&format!(" · downloading {}", self.pending_downloads));
        }
        Line::raw(controls)
            .style(Style::default().fg(Color::DarkGray))
            .centered()
            .render(control_area, buf);

        Line::raw(self.status.as_str()).render(status_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_a_clamped_percentage() {
        let mut controls = PlayerControlsComponent::new(80);
        assert_eq!(controls.progress(), 0);

        controls.total = Duration::from_secs(200);
        controls.position = Duration::from_secs(50);
        assert_eq!(controls.progress(), 25);

        controls.position = Duration::from_secs(500);
        assert_eq!(controls.progress(), 100);
    }

    #[test]
    fn renders_name_times_and_status() {
        let mut controls = PlayerControlsComponent::new(80);
        controls.name = Some("Song".into());
        controls.playing = true;
        controls.total = Duration::from_secs(125);
        controls.position = Duration::from_secs(65);
        controls.set_status("Playing: Song");

        let area = Rect::new(0, 0, 100, 6);
        let mut buf = Buffer::empty(area);
        controls.render_ref(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();

        assert!(text.contains("▶ Song"));
        assert!(text.contains("01:05"));
        assert!(text.contains("02:05"));
        assert!(text.contains("Playing: Song"));
        assert!(text.contains("vol 80%"));
    }
}
