//! The dashboard grid: the ordered set of timers, the grid geometry and the
//! card selection. Every mutation marks the dashboard dirty so the app can
//! schedule a layout save.

use std::collections::HashSet;
use std::time::Duration;

use crate::models::{GridGeometry, LAYOUT_VERSION, LayoutState, Timer};

/// Terminal cells taken by one timer card.
pub const CARD_WIDTH: u16 = 30;
pub const CARD_HEIGHT: u16 = 9;
pub const MAX_COLUMNS: u16 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    OneMinute,
    ThreeMinutes,
    OneHour,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::OneMinute, Preset::ThreeMinutes, Preset::OneHour];

    pub fn title(&self) -> &'static str {
        match self {
            Preset::OneMinute => "1 min",
            Preset::ThreeMinutes => "3 min",
            Preset::OneHour => "1 hour",
        }
    }

    pub fn seconds(&self) -> u64 {
        match self {
            Preset::OneMinute => 60,
            Preset::ThreeMinutes => 180,
            Preset::OneHour => 3600,
        }
    }
}

#[derive(Debug, Default)]
pub struct Dashboard {
    timers: Vec<Timer>,
    grid: GridGeometry,
    selected: usize,
    dirty: bool,
}

impl Dashboard {
    pub fn from_layout(layout: LayoutState) -> Self {
        let mut seen = HashSet::new();
        let timers = layout
            .timers
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();

        let grid = GridGeometry {
            columns: layout.grid.columns.min(MAX_COLUMNS),
        };

        Dashboard {
            timers,
            grid,
            selected: 0,
            dirty: false,
        }
    }

    pub fn to_layout(&self) -> LayoutState {
        LayoutState {
            version: LAYOUT_VERSION,
            timers: self.timers.clone(),
            grid: self.grid,
        }
    }

    /// Adds the three preset timers when the dashboard is empty. Returns
    /// whether anything was added.
    pub fn seed_defaults(&mut self) -> bool {
        if !self.timers.is_empty() {
            return false;
        }
        for preset in Preset::ALL {
            self.add_preset(preset);
        }
        true
    }

    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.timers.is_empty()).then_some(self.selected)
    }

    pub fn selected_timer(&self) -> Option<&Timer> {
        self.timers.get(self.selected)
    }

    /// Adds a timer. Ids are unique; a duplicate is rejected.
    pub fn add_timer(&mut self, timer: Timer) -> bool {
        if self.timers.iter().any(|t| t.id == timer.id) {
            return false;
        }
        tracing::debug!("Adding timer {} ({})", timer.title, timer.id);
        self.timers.push(timer);
        self.selected = self.timers.len() - 1;
        self.dirty = true;
        true
    }

    pub fn add_countdown(&mut self, title: &str, total_seconds: u64) -> &Timer {
        let title = match title.trim() {
            "" => "Timer",
            t => t,
        };
        self.push(Timer::countdown(title, total_seconds))
    }

    pub fn add_stopwatch(&mut self, title: &str) -> &Timer {
        let title = match title.trim() {
            "" => "Stopwatch",
            t => t,
        };
        self.push(Timer::stopwatch(title))
    }

    pub fn add_preset(&mut self, preset: Preset) -> &Timer {
        self.push(Timer::countdown(preset.title(), preset.seconds()))
    }

    fn push(&mut self, timer: Timer) -> &Timer {
        self.add_timer(timer);
        &self.timers[self.timers.len() - 1]
    }

    pub fn delete(&mut self, id: &str) -> Option<Timer> {
        let index = self.timers.iter().position(|t| t.id == id)?;
        let timer = self.timers.remove(index);
        if self.selected >= self.timers.len() {
            self.selected = self.timers.len().saturating_sub(1);
        }
        self.dirty = true;
        Some(timer)
    }

    pub fn delete_selected(&mut self) -> Option<Timer> {
        let id = self.selected_timer()?.id.clone();
        self.delete(&id)
    }

    /// Applies `f` to the selected timer and marks the dashboard dirty.
    pub fn update_selected<F>(&mut self, f: F) -> Option<&Timer>
    where
        F: FnOnce(&mut Timer),
    {
        let timer = self.timers.get_mut(self.selected)?;
        f(timer);
        self.dirty = true;
        Some(timer)
    }

    pub fn update<F>(&mut self, id: &str, f: F) -> Option<&Timer>
    where
        F: FnOnce(&mut Timer),
    {
        let timer = self.timers.iter_mut().find(|t| t.id == id)?;
        f(timer);
        self.dirty = true;
        Some(timer)
    }

    /// Moves the selection by `delta` cards, clamped to the grid.
    pub fn select_by(&mut self, delta: isize) {
        if self.timers.is_empty() {
            return;
        }
        let last = self.timers.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    /// Moves the selected card by `delta` positions in the grid order.
    pub fn move_selected(&mut self, delta: isize) -> bool {
        let Some(to) = self.selected.checked_add_signed(delta) else {
            return false;
        };
        if to >= self.timers.len() || self.selected >= self.timers.len() {
            return false;
        }
        let timer = self.timers.remove(self.selected);
        self.timers.insert(to, timer);
        self.selected = to;
        self.dirty = true;
        true
    }

    /// Advances every running timer by `dt`. Returns the titles of
    /// countdowns that finished during this tick.
    pub fn tick(&mut self, dt: Duration) -> Vec<String> {
        let finished = self
            .timers
            .iter_mut()
            .filter_map(|t| t.tick(dt).then(|| t.title.clone()))
            .collect::<Vec<_>>();
        if !finished.is_empty() {
            self.dirty = true;
        }
        finished
    }

    pub fn any_running(&self) -> bool {
        self.timers.iter().any(Timer::is_running)
    }

    /// Columns shown for a grid `width` cells wide.
    pub fn columns_for_width(&self, width: u16) -> u16 {
        if self.grid.columns > 0 {
            self.grid.columns
        } else {
            (width / CARD_WIDTH).clamp(1, MAX_COLUMNS)
        }
    }

    /// `(row, column)` of every timer, in order.
    pub fn positions(&self, width: u16) -> Vec<(u16, u16)> {
        let columns = usize::from(self.columns_for_width(width));
        (0..self.timers.len())
            .map(|i| ((i / columns) as u16, (i % columns) as u16))
            .collect()
    }

    /// Changes the fixed column count; `0` fits the width.
    pub fn set_columns(&mut self, columns: u16) {
        let columns = columns.min(MAX_COLUMNS);
        if self.grid.columns != columns {
            self.grid.columns = columns;
            self.dirty = true;
        }
    }

    /// Steps the column count from what is currently visible at `width`.
    pub fn adjust_columns(&mut self, delta: i16, width: u16) {
        let current = self.columns_for_width(width);
        let next = current.saturating_add_signed(delta).clamp(1, MAX_COLUMNS);
        self.set_columns(next);
    }

    /// Returns and clears the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimerState;

    fn seeded() -> Dashboard {
        let mut d = Dashboard::default();
        d.seed_defaults();
        d.take_dirty();
        d
    }

    #[test]
    fn seeds_presets_only_when_empty() {
        let mut d = Dashboard::default();
        assert!(d.seed_defaults());
        let titles = d.timers().iter().map(|t| t.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["1 min", "3 min", "1 hour"]);
        assert!(!d.seed_defaults());
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn add_rejects_duplicate_ids() {
        let mut d = Dashboard::default();
        let timer = Timer::countdown("a", 10);
        assert!(d.add_timer(timer.clone()));
        assert!(!d.add_timer(timer));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn blank_titles_get_defaults() {
        let mut d = Dashboard::default();
        assert_eq!(d.add_countdown("  ", 5).title, "Timer");
        assert_eq!(d.add_stopwatch("").title, "Stopwatch");
    }

    #[test]
    fn layout_round_trip_preserves_order_and_grid() {
        let mut d = seeded();
        d.set_columns(2);
        d.update_selected(Timer::start);
        let layout = d.to_layout();

        let mut restored = Dashboard::from_layout(layout.clone());
        assert_eq!(restored.to_layout(), layout);
        assert!(!restored.take_dirty());
    }

    #[test]
    fn from_layout_drops_duplicate_ids() {
        let timer = Timer::countdown("dup", 10);
        let layout = LayoutState {
            timers: vec![timer.clone(), timer],
            ..LayoutState::default()
        };
        assert_eq!(Dashboard::from_layout(layout).len(), 1);
    }

    #[test]
    fn delete_clamps_selection() {
        let mut d = seeded();
        d.select_by(10);
        assert_eq!(d.selected_index(), Some(2));
        d.delete_selected();
        assert_eq!(d.selected_index(), Some(1));
        assert!(d.take_dirty());
        d.delete_selected();
        d.delete_selected();
        assert_eq!(d.selected_index(), None);
        assert!(d.delete_selected().is_none());
    }

    #[test]
    fn tick_reports_finished_countdowns() {
        let mut d = Dashboard::default();
        let id = d.add_countdown("short", 2).id.clone();
        d.add_countdown("long", 100);
        d.take_dirty();

        for timer_id in d.timers().iter().map(|t| t.id.clone()).collect::<Vec<_>>() {
            d.update(&timer_id, Timer::start);
        }
        d.take_dirty();

        assert!(d.tick(Duration::from_secs(1)).is_empty());
        assert!(!d.take_dirty());
        assert_eq!(d.tick(Duration::from_secs(1)), vec!["short".to_string()]);
        assert!(d.take_dirty());
        let short = d.timers().iter().find(|t| t.id == id).unwrap();
        assert_eq!(short.state, TimerState::Stopped);
        assert!(d.any_running());
    }

    #[test]
    fn move_selected_reorders_cards() {
        let mut d = seeded();
        d.select_by(-10);
        assert!(d.move_selected(2));
        let titles = d.timers().iter().map(|t| t.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["3 min", "1 hour", "1 min"]);
        assert_eq!(d.selected_timer().unwrap().title, "1 min");
        assert!(!d.move_selected(1));
        assert!(!d.move_selected(-3));
    }

    #[test]
    fn positions_follow_columns() {
        let mut d = seeded();
        d.add_preset(Preset::OneMinute);

        // Fit to width: 65 cells hold two 30-cell cards.
        assert_eq!(d.columns_for_width(65), 2);
        assert_eq!(d.positions(65), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);

        d.set_columns(3);
        assert_eq!(d.positions(10), vec![(0, 0), (0, 1), (0, 2), (1, 0)]);
    }

    #[test]
    fn narrow_width_still_shows_one_column() {
        let d = seeded();
        assert_eq!(d.columns_for_width(5), 1);
    }

    #[test]
    fn loaded_column_count_is_clamped() {
        let layout = LayoutState {
            grid: GridGeometry { columns: 60000 },
            ..seeded().to_layout()
        };
        let d = Dashboard::from_layout(layout);
        assert_eq!(d.to_layout().grid.columns, MAX_COLUMNS);
        assert!(d.positions(90).iter().all(|&(_, col)| col < MAX_COLUMNS));
    }

    #[test]
    fn adjust_columns_is_clamped() {
        let mut d = seeded();
        d.adjust_columns(-5, 90);
        assert_eq!(d.to_layout().grid.columns, 1);
        d.adjust_columns(100, 90);
        assert_eq!(d.to_layout().grid.columns, MAX_COLUMNS);
    }
}
