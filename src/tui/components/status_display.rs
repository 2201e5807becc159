//! Status display component for notices and errors

use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::ui::Styles;

/// Types of status messages
#[derive(Debug, Clone, PartialEq)]
pub enum StatusType {
    Info,
    Success,
    Error,
}

/// Status message with type and content
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub status_type: StatusType,
    pub shown_at: Instant,
    /// Hide automatically after this long
    pub auto_clear: Option<Duration>,
}

impl StatusMessage {
    pub fn new(message: String, status_type: StatusType) -> Self {
        Self {
            message,
            status_type,
            shown_at: Instant::now(),
            auto_clear: None,
        }
    }

    pub fn info(message: String) -> Self {
        Self::new(message, StatusType::Info)
    }

    pub fn success(message: String) -> Self {
        Self::new(message, StatusType::Success)
    }

    pub fn error(message: String) -> Self {
        Self::new(message, StatusType::Error)
    }

    pub fn with_auto_clear(mut self, timeout: Duration) -> Self {
        self.auto_clear = Some(timeout);
        self
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.auto_clear
            .map_or(false, |timeout| now.saturating_duration_since(self.shown_at) >= timeout)
    }
}

/// Status display component
pub struct StatusDisplay {
    pub current_message: Option<StatusMessage>,
    pub message_history: Vec<StatusMessage>,
    pub max_history: usize,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self {
            current_message: None,
            message_history: Vec::new(),
            max_history: 100,
        }
    }
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set current status message
    pub fn set_message(&mut self, message: StatusMessage) {
        self.archive_current();
        self.current_message = Some(message);
    }

    pub fn set_info(&mut self, message: String) {
        self.set_message(StatusMessage::info(message));
    }

    /// Success notice that hides itself after `timeout`
    pub fn set_success(&mut self, message: String, timeout: Duration) {
        self.set_message(StatusMessage::success(message).with_auto_clear(timeout));
    }

    pub fn set_error(&mut self, message: String) {
        self.set_message(StatusMessage::error(message));
    }

    /// Clear current message
    pub fn clear(&mut self) {
        self.archive_current();
    }

    fn archive_current(&mut self) {
        if let Some(current) = self.current_message.take() {
            self.message_history.push(current);

            // Trim history if needed
            if self.message_history.len() > self.max_history {
                self.message_history.remove(0);
            }
        }
    }

    pub fn get_current(&self) -> Option<&StatusMessage> {
        self.current_message.as_ref()
    }

    /// Check if the current message has outlived its timeout
    pub fn should_auto_clear(&self, now: Instant) -> bool {
        self.current_message
            .as_ref()
            .map_or(false, |message| message.is_expired(now))
    }

    /// Render the status bar; `fallback` is shown when there is no message
    pub fn render(&self, f: &mut Frame, area: Rect, fallback: &str) {
        let (content, style) = match &self.current_message {
            Some(message) => (
                Self::format_message(message),
                match message.status_type {
                    StatusType::Info => Styles::info(),
                    StatusType::Success => Styles::success(),
                    StatusType::Error => Styles::error(),
                },
            ),
            None => (fallback.to_string(), Styles::inactive()),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::inactive_border());

        let paragraph = Paragraph::new(content).style(style).block(block);

        f.render_widget(paragraph, area);
    }

    fn format_message(message: &StatusMessage) -> String {
        let prefix = match message.status_type {
            StatusType::Info => "ℹ",
            StatusType::Success => "✓",
            StatusType::Error => "✗",
        };
        format!("{} {}", prefix, message.message)
    }
}
