use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::format_hms;

/// Longest duration a timer accepts, `99:59:59`.
pub const MAX_TOTAL_SECONDS: u64 = 99 * 3600 + 59 * 60 + 59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    #[default]
    Countdown,
    Stopwatch,
}

/// `Stopped -> Running -> Paused -> Running -> Stopped`. `reset` returns to
/// `Stopped` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl TimerState {
    pub fn label(&self) -> &'static str {
        match self {
            TimerState::Stopped => "stopped",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
        }
    }
}

/// One timer card. Elapsed time is kept in milliseconds so that ticks driven
/// by wall-clock deltas accumulate without drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub id: String,
    pub title: String,
    pub mode: TimerMode,
    pub total_seconds: u64,
    pub elapsed_ms: u64,
    pub state: TimerState,
}

impl Timer {
    pub fn new(title: impl Into<String>, mode: TimerMode, total_seconds: u64) -> Self {
        Timer {
            id: new_timer_id(),
            title: title.into(),
            mode,
            total_seconds: total_seconds.max(1),
            elapsed_ms: 0,
            state: TimerState::Stopped,
        }
    }

    pub fn countdown(title: impl Into<String>, total_seconds: u64) -> Self {
        Self::new(title, TimerMode::Countdown, total_seconds)
    }

    pub fn stopwatch(title: impl Into<String>) -> Self {
        Self::new(title, TimerMode::Stopwatch, 1)
    }

    fn total_ms(&self) -> u64 {
        self.total_seconds.saturating_mul(1000)
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.mode == TimerMode::Countdown && self.elapsed_ms >= self.total_ms()
    }

    /// Whole seconds left, rounded up so a fresh 60 s timer reads 01:00.
    pub fn remaining_seconds(&self) -> u64 {
        self.total_ms().saturating_sub(self.elapsed_ms).div_ceil(1000)
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_ms / 1000
    }

    /// Seconds shown on the card: remaining for a countdown, elapsed for a
    /// stopwatch.
    pub fn display_seconds(&self) -> u64 {
        match self.mode {
            TimerMode::Countdown => self.remaining_seconds(),
            TimerMode::Stopwatch => self.elapsed_seconds(),
        }
    }

    pub fn display_time(&self) -> String {
        format_hms(self.display_seconds())
    }

    /// Fraction of the ring to fill, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        match self.mode {
            TimerMode::Countdown => {
                (self.elapsed_ms as f64 / self.total_ms() as f64).clamp(0.0, 1.0)
            }
            TimerMode::Stopwatch => (self.elapsed_ms % 60_000) as f64 / 60_000.0,
        }
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        if self.is_finished() {
            self.elapsed_ms = 0;
        }
        self.state = TimerState::Running;
    }

    pub fn pause(&mut self) {
        if self.is_running() {
            self.state = TimerState::Paused;
        }
    }

    pub fn toggle(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
        self.state = TimerState::Stopped;
    }

    pub fn set_duration(&mut self, total_seconds: u64) {
        self.total_seconds = total_seconds.max(1);
        self.reset();
    }

    /// Advances a running timer by `dt`. Returns `true` when a countdown
    /// reached zero during this tick.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.is_running() {
            return false;
        }

        let dt_ms = u64::try_from(dt.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);

        if self.mode == TimerMode::Countdown && self.elapsed_ms >= self.total_ms() {
            self.elapsed_ms = self.total_ms();
            self.state = TimerState::Stopped;
            return true;
        }

        false
    }
}

pub fn new_timer_id() -> String {
    Uuid::new_v4().simple().to_string()
}
