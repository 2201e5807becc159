//! Single-line text input with a cursor

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::tui::ui::{Styles, Theme};

/// What a key press did to an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The text changed
    Changed,
    /// Only the cursor moved
    Moved,
    /// The key is not an editing key
    Ignored,
}

/// Editable text buffer. The cursor position counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct InputField {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub is_focused: bool,
    pub cursor_position: usize,
}

impl InputField {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    /// Replace the text and put the cursor at the end
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor_position = self.value.chars().count();
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor_position)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index();
        self.value.insert(index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.byte_index();
            self.value.remove(index);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.char_count() {
            let index = self.byte_index();
            self.value.remove(index);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.char_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Display width of the text before the cursor
    pub fn cursor_column(&self) -> u16 {
        self.value[..self.byte_index()].width() as u16
    }

    /// Apply an editing key. Characters accepted only if `accept` allows them.
    pub fn handle_key(&mut self, key: KeyEvent, accept: impl Fn(char) -> bool) -> InputOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return InputOutcome::Ignored;
        }

        match key.code {
            KeyCode::Char(c) if accept(c) => {
                self.insert_char(c);
                InputOutcome::Changed
            }
            KeyCode::Backspace if self.cursor_position > 0 => {
                self.delete_char();
                InputOutcome::Changed
            }
            KeyCode::Delete if self.cursor_position < self.char_count() => {
                self.delete_char_forward();
                InputOutcome::Changed
            }
            KeyCode::Left => {
                self.move_cursor_left();
                InputOutcome::Moved
            }
            KeyCode::Right => {
                self.move_cursor_right();
                InputOutcome::Moved
            }
            KeyCode::Home => {
                self.move_cursor_to_start();
                InputOutcome::Moved
            }
            KeyCode::End => {
                self.move_cursor_to_end();
                InputOutcome::Moved
            }
            _ => InputOutcome::Ignored,
        }
    }

    /// Render the input field as a bordered box
    pub fn render(&self, f: &mut Frame, area: Rect, theme: Theme) {
        let display_text = if self.value.is_empty() && !self.placeholder.is_empty() {
            &self.placeholder
        } else {
            &self.value
        };

        let style = if self.is_focused {
            Styles::active_border(theme)
        } else {
            Styles::inactive_border()
        };

        let block = Block::default()
            .title(self.label.as_str())
            .borders(Borders::ALL)
            .border_style(style);

        let input_style = if self.value.is_empty() && !self.placeholder.is_empty() {
            Styles::inactive()
        } else {
            Styles::base(theme)
        };

        let paragraph = Paragraph::new(display_text.to_string())
            .style(input_style)
            .block(block);

        f.render_widget(paragraph, area);

        // Render cursor if focused
        if self.is_focused {
            let cursor_x = area.x + 1 + self.cursor_column();
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}
