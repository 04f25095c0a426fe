use std::time::Duration;

use color_eyre::Result;
use crossbeam_channel::Sender;
use crossterm::event;

use crate::event::{Event, Key};

/// Polls the terminal for key presses and emits a `Tick` after every poll.
pub fn spawn_event_emitter(event_tx: Sender<Event>, tickrate: Duration) -> Result<()> {
    _ = std::thread::spawn(move || -> Result<()> {
        loop {
            if event::poll(tickrate)? {
                if let event::Event::Key(key) = event::read()? {
                    if key.kind == event::KeyEventKind::Press {
                        event_tx.send(Event::Input(Key::from(key)))?;
                    }
                }
            }

            event_tx.send(Event::Tick)?;
        }
    });

    Ok(())
}

/// `HH:MM:SS`, used on the timer cards.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// `MM:SS`, or `HH:MM:SS` once an hour is reached. Zero reads `00:00`.
pub fn format_duration_short(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Parses a timer duration typed by the user.
///
/// Accepts `SS`, `MM:SS`, `HH:MM:SS` and unit forms like `1h30m`, `90s` or
/// `2m 5s`. Returns `None` for anything else.
pub fn parse_duration(input: &str) -> Option<u64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.contains(':') {
        let parts = input
            .split(':')
            .map(|p| p.trim().parse::<u64>().ok())
            .collect::<Option<Vec<u64>>>()?;
        if !(2..=3).contains(&parts.len()) {
            return None;
        }
        return parts
            .iter()
            .try_fold(0u64, |acc, &part| acc.checked_mul(60)?.checked_add(part));
    }

    if let Ok(seconds) = input.parse::<u64>() {
        return Some(seconds);
    }

    let mut total = 0u64;
    let mut digits = String::new();
    let mut saw_unit = false;
    for c in input.chars() {
        match c {
            '0'..='9' => digits.push(c),
            'h' | 'm' | 's' => {
                let value = digits.parse::<u64>().ok()?;
                digits.clear();
                saw_unit = true;
                let unit = match c {
                    'h' => 3600,
                    'm' => 60,
                    _ => 1,
                };
                total = total.checked_add(value.checked_mul(unit)?)?;
            }
            c if c.is_whitespace() => {}
            _ => return None,
        }
    }

    if !digits.is_empty() || !saw_unit {
        return None;
    }

    Some(total)
}
