use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use crate::event::Key;

/// A single line editor. The cursor is a char index.
#[derive(Debug, Default, Clone)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        TextInput { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Applies an editing key. Returns `false` for keys it does not edit
    /// with.
    pub fn handle(&mut self, key: Key) -> bool {
        let len = self.value.chars().count();
        match key {
            Key::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            Key::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
            }
            Key::Delete if self.cursor < len => {
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
            }
            Key::Left => self.cursor = self.cursor.saturating_sub(1),
            Key::Right => self.cursor = (self.cursor + 1).min(len),
            Key::Home => self.cursor = 0,
            Key::End => self.cursor = len,
            Key::Ctrl('u') => self.clear(),
            Key::Backspace | Key::Delete => {}
            _ => return false,
        }
        true
    }

    /// Renders the value on one line, with the cursor cell reversed when
    /// `focused`.
    pub fn render(&self, area: Rect, buf: &mut Buffer, focused: bool) {
        let at = self.byte_index(self.cursor);
        let (before, rest) = self.value.split_at(at);
        let mut rest_chars = rest.chars();
        let under_cursor = rest_chars.next().map(String::from).unwrap_or_else(|| " ".into());
        let after = rest_chars.as_str();

        let cursor_style = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(before),
            Span::styled(under_cursor, cursor_style),
            Span::raw(after),
        ])
        .render(area, buf);
    }
}
