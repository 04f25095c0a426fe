use std::cell::Cell;
use std::time::Duration;

use color_eyre::Result;
use crossbeam_channel::Sender;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};

use super::utils::VerticalScroll;
use super::{Component, ComponentCommand, TimerCard, Widget, WidgetRef};
use crate::config::KeyConfig;
use crate::dashboard::{CARD_HEIGHT, CARD_WIDTH, Dashboard, Preset};
use crate::event::{EventState, Key};

pub enum Command {
    Status(String),
    NewTimer,
    EditTimer {
        id: String,
        title: String,
        total_seconds: u64,
    },
}

/// The timer dashboard: a grid of cards with a keyboard cursor.
pub struct TimerGridComponent {
    dashboard: Dashboard,
    pub focused: bool,
    // Last rendered geometry, used to turn up/down into whole rows.
    width: Cell<u16>,
    columns: Cell<u16>,
    scroll: VerticalScroll,
    key_config: KeyConfig,
    app_cmd_tx: Sender<ComponentCommand>,
}

impl TimerGridComponent {
    pub fn new(
        dashboard: Dashboard,
        key_config: KeyConfig,
        app_cmd_tx: Sender<ComponentCommand>,
    ) -> Self {
        Self {
            dashboard,
            focused: true,
            width: Cell::new(0),
            columns: Cell::new(1),
            scroll: VerticalScroll::new(),
            key_config,
            app_cmd_tx,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    pub fn tick(&mut self, dt: Duration) -> Vec<String> {
        self.dashboard.tick(dt)
    }

    fn add_preset(&mut self, preset: Preset) -> Result<()> {
        let title = self.dashboard.add_preset(preset).title.clone();
        self.status(format!("Added {title}"))
    }

    fn delete_selected(&mut self) -> Result<()> {
        if let Some(timer) = self.dashboard.delete_selected() {
            self.status(format!("Deleted {}", timer.title))?;
        }
        Ok(())
    }

    fn edit_selected(&self) -> Result<()> {
        let Some(timer) = self.dashboard.selected_timer() else {
            return Ok(());
        };
        self.send_command(Command::EditTimer {
            id: timer.id.clone(),
            title: timer.title.clone(),
            total_seconds: timer.total_seconds,
        })
    }

    fn row_step(&self) -> isize {
        self.columns.get().max(1) as isize
    }

    fn status(&self, message: String) -> Result<()> {
        self.send_command(Command::Status(message))
    }

    fn send_command(&self, cmd: Command) -> Result<()> {
        self.app_cmd_tx.send(ComponentCommand::TimerGrid(cmd))?;
        Ok(())
    }
}

impl WidgetRef for TimerGridComponent {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::LightCyan)
        } else {
            Style::default()
        };
        let area = {
            let border = Block::bordered()
                .title(" Timers ")
                .border_style(border_style);
            let a = border.inner(area);
            border.render(area, buf);
            a
        };

        self.width.set(area.width);

        if self.dashboard.is_empty() {
            Paragraph::new(vec![
                Line::raw(""),
                Line::raw("No timers yet."),
                Line::raw("Press 1, 2 or 3 for a preset, c for a custom timer, w for a stopwatch."),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
            return;
        }

        let columns = self.dashboard.columns_for_width(area.width).max(1);
        self.columns.set(columns);

        let card_width = (area.width / columns).clamp(1, CARD_WIDTH);
        let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
        let total_rows = self.dashboard.len().div_ceil(usize::from(columns));
        let selected_row = self.dashboard.selected_index().unwrap_or(0) / usize::from(columns);
        let first_row = self.scroll.update(visible_rows, selected_row, total_rows);

        let positions = self.dashboard.positions(area.width);
        for (i, (timer, (row, column))) in self
            .dashboard
            .timers()
            .iter()
            .zip(positions)
            .enumerate()
        {
            let row = usize::from(row);
            if row < first_row || row >= first_row + visible_rows {
                continue;
            }

            let card = Rect::new(
                area.x + column * card_width,
                area.y + ((row - first_row) as u16) * CARD_HEIGHT,
                card_width,
                CARD_HEIGHT,
            )
            .intersection(area);
            if card.is_empty() {
                continue;
            }

            let selected = self.focused && self.dashboard.selected_index() == Some(i);
            TimerCard::new(timer, selected).render(card, buf);
        }
    }
}

impl Component for TimerGridComponent {
    fn event(&mut self, key: Key) -> Result<EventState> {
        let keys = self.key_config.clone();

        if keys.is_left(key) {
            self.dashboard.select_by(-1);
        } else if keys.is_right(key) {
            self.dashboard.select_by(1);
        } else if keys.is_up(key) {
            self.dashboard.select_by(-self.row_step());
        } else if keys.is_down(key) {
            self.dashboard.select_by(self.row_step());
        } else if key == keys.toggle_timer {
            self.dashboard.update_selected(|t| t.toggle());
        } else if key == keys.reset_timer {
            self.dashboard.update_selected(|t| t.reset());
        } else if key == keys.delete_timer {
            self.delete_selected()?;
        } else if key == keys.edit_timer {
            self.edit_selected()?;
        } else if key == keys.add_one_minute {
            self.add_preset(Preset::OneMinute)?;
        } else if key == keys.add_three_minutes {
            self.add_preset(Preset::ThreeMinutes)?;
        } else if key == keys.add_one_hour {
            self.add_preset(Preset::OneHour)?;
        } else if key == keys.add_custom_timer {
            self.send_command(Command::NewTimer)?;
        } else if key == keys.add_stopwatch {
            self.dashboard.add_stopwatch("Stopwatch");
            self.status("Added Stopwatch".to_string())?;
        } else if key == keys.move_card_left {
            self.dashboard.move_selected(-1);
        } else if key == keys.move_card_right {
            self.dashboard.move_selected(1);
        } else if key == keys.more_columns {
            self.dashboard.adjust_columns(1, self.width.get());
        } else if key == keys.fewer_columns {
            self.dashboard.adjust_columns(-1, self.width.get());
        } else {
            return Ok(EventState::NotConsumed);
        }

        Ok(EventState::Consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LayoutState, TimerState};
    use crossbeam_channel::Receiver;

    fn grid(timers: usize) -> (TimerGridComponent, Receiver<ComponentCommand>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut dashboard = Dashboard::from_layout(LayoutState::default());
        for i in 0..timers {
            dashboard.add_countdown(&format!("T{i}"), 60);
        }
        (TimerGridComponent::new(dashboard, KeyConfig::default(), tx), rx)
    }

    fn render(grid: &TimerGridComponent, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        grid.render_ref(area, &mut buf);
        buf
    }

    #[test]
    fn presets_add_cards_and_report() {
        let (mut grid, rx) = grid(0);
        grid.event(Key::Char('2')).unwrap();
        assert_eq!(grid.dashboard().len(), 1);
        assert_eq!(grid.dashboard().timers()[0].total_seconds, 180);
        assert!(matches!(
            rx.try_recv(),
            Ok(ComponentCommand::TimerGrid(Command::Status(_)))
        ));
    }

    #[test]
    fn space_toggles_selected_timer() {
        let (mut grid, _rx) = grid(2);
        grid.event(Key::Char(' ')).unwrap();
        let selected = grid.dashboard().selected_timer().unwrap();
        assert_eq!(selected.state, TimerState::Running);
        grid.event(Key::Char(' ')).unwrap();
        let selected = grid.dashboard().selected_timer().unwrap();
        assert_eq!(selected.state, TimerState::Paused);
    }

    #[test]
    fn up_down_move_by_rendered_row() {
        let (mut grid, _rx) = grid(6);
        // 92 wide minus borders fits three 30-wide cards.
        render(&grid, 92, 30);
        grid.dashboard_mut().select_by(-100);
        grid.event(Key::Down).unwrap();
        assert_eq!(grid.dashboard().selected_index(), Some(3));
        grid.event(Key::Up).unwrap();
        assert_eq!(grid.dashboard().selected_index(), Some(0));
    }

    #[test]
    fn edit_sends_selected_timer() {
        let (mut grid, rx) = grid(1);
        grid.event(Key::Char('e')).unwrap();
        match rx.try_recv() {
            Ok(ComponentCommand::TimerGrid(Command::EditTimer {
                title,
                total_seconds,
                ..
            })) => {
                assert_eq!(title, "T0");
                assert_eq!(total_seconds, 60);
            }
            _ => panic!("expected an edit request"),
        }
    }

    #[test]
    fn delete_removes_selected() {
        let (mut grid, _rx) = grid(2);
        grid.event(Key::Char('d')).unwrap();
        assert_eq!(grid.dashboard().len(), 1);
    }

    #[test]
    fn unknown_keys_are_not_consumed() {
        let (mut grid, _rx) = grid(1);
        assert!(!grid.event(Key::Char('q')).unwrap().is_consumed());
    }

    #[test]
    fn renders_hint_when_empty_and_cards_otherwise() {
        let (grid_empty, _rx) = grid(0);
        let text: String = render(&grid_empty, 80, 20)
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("No timers yet."));

        let (grid, _rx) = grid(2);
        let text: String = render(&grid, 80, 20)
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("T0"));
        assert!(text.contains("T1"));
    }
}
