//! Read-only view of a persisted submission

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::warn;

use crate::models::{FormSubmission, SubmissionId};
use crate::storage::{self, KeyValueStore};
use crate::tui::{
    app::Route,
    components::{render_field, RenderContext},
    traits::{Screen, ScreenAction},
    ui::{Styles, Theme},
};

/// Submission viewer screen state
pub struct ViewerScreen {
    pub requested: Option<SubmissionId>,
    pub record: Option<FormSubmission>,
    pub scroll_offset: u16,
}

impl Default for ViewerScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerScreen {
    pub fn new() -> Self {
        Self {
            requested: None,
            record: None,
            scroll_offset: 0,
        }
    }

    /// Look up submission `id`; a missing record leaves the screen in its not-found state
    pub async fn load(&mut self, id: SubmissionId, store: &dyn KeyValueStore) -> Result<()> {
        self.requested = Some(id);
        self.scroll_offset = 0;
        self.record = storage::find_record(store, id).await?;
        if self.record.is_none() {
            warn!("Submission {} not found", id);
        }
        Ok(())
    }

    /// Lines for every field of the record, rendered read-only with its stored value
    pub fn body_lines(record: &FormSubmission, theme: Theme) -> Vec<Line<'static>> {
        let ctx = RenderContext {
            theme,
            focused: false,
            cursor: 0,
            draft: None,
            text_cursor: None,
        };

        let mut lines = Vec::new();
        for field in &record.fields {
            if let Some(view) = render_field(field, record.value_for(field.id), false, &ctx) {
                lines.extend(view.lines);
                lines.push(Line::from(""));
            }
        }
        lines
    }
}

impl Screen for ViewerScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Record header
                Constraint::Min(0),    // Fields
                Constraint::Length(3), // Instructions
            ])
            .split(area);

        let Some(record) = &self.record else {
            let missing = Paragraph::new(format!(
                "Submission {} was not found.",
                self.requested.map_or_else(|| "?".to_string(), |id| id.to_string())
            ))
            .style(Styles::error())
            .block(Block::default().title("Submission").borders(Borders::ALL));
            f.render_widget(missing, chunks[0].union(chunks[1]));
            let back = Paragraph::new("Esc/b: Back to Dashboard")
                .style(Styles::info())
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(back, chunks[2]);
            return;
        };

        let header = Paragraph::new(vec![
            Line::from(Span::styled(record.title.clone(), Styles::title(theme))),
            Line::from(Span::styled(
                format!(
                    "Submitted {} │ id {} │ {}/{} answered",
                    record
                        .timestamp
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M:%S"),
                    record.id,
                    record.answered_count(),
                    record.fields.iter().filter(|f| f.field_type.is_interactive()).count(),
                ),
                Styles::inactive(),
            )),
        ])
        .style(Styles::base(theme))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(header, chunks[0]);

        let lines = Self::body_lines(record, theme);
        let body = Paragraph::new(lines)
            .style(Styles::base(theme))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll_offset, 0))
            .block(Block::default().title("Fields").borders(Borders::ALL));
        f.render_widget(body, chunks[1]);

        let instructions = Paragraph::new(
            "↑/↓: Scroll | PgUp/PgDn: Page | t: Use as template | Esc/b: Back to Dashboard",
        )
        .style(Styles::info())
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(instructions, chunks[2]);
    }

    async fn handle_key_event(
        &mut self,
        key: KeyEvent,
        store: &dyn KeyValueStore,
    ) -> Result<ScreenAction> {
        match key.code {
            KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            KeyCode::Down => self.scroll_offset = self.scroll_offset.saturating_add(1),
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_sub(10),
            KeyCode::PageDown => self.scroll_offset = self.scroll_offset.saturating_add(10),
            KeyCode::Home => self.scroll_offset = 0,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                return Ok(ScreenAction::NavigateTo(Route::Dashboard));
            }
            KeyCode::Char('q') => return Ok(ScreenAction::Quit),
            KeyCode::Char('t') => {
                if let Some(record) = &self.record {
                    storage::save_template(store, &record.fields).await?;
                    return Ok(ScreenAction::NavigateTo(Route::Builder));
                }
            }
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    fn route(&self) -> Route {
        match self.requested {
            Some(id) => Route::View(id),
            None => Route::Dashboard,
        }
    }

    fn help(&self) -> &'static str {
        "Submission Viewer:\n\
        ↑/↓ - Scroll\n\
        Page Up/Down - Page scroll\n\
        Home - Top\n\
        t - Start a new form from these fields\n\
        Esc / b - Back to dashboard\n\
        q - Quit"
    }
}
