//! Dashboard screen listing recent submissions

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::info;

use crate::models::FormSubmission;
use crate::storage::{self, KeyValueStore};
use crate::tui::{
    app::Route,
    components::ListView,
    traits::{Navigable, Screen, ScreenAction},
    ui::{truncate, Styles, Theme},
};

/// Dashboard screen state
pub struct DashboardScreen {
    pub records: ListView<FormSubmission>,
}

impl Default for DashboardScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            records: ListView::new(Vec::new(), "Recent Forms"),
        }
    }

    /// Reload the record list from the store
    pub async fn refresh(&mut self, store: &dyn KeyValueStore) -> Result<()> {
        let records = storage::load_records(store).await?;
        self.records.set_items(records);
        Ok(())
    }

    fn format_record(record: &FormSubmission) -> Line<'static> {
        let answerable = record
            .fields
            .iter()
            .filter(|f| f.field_type.is_interactive())
            .count();
        let when = record
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S");

        Line::from(vec![
            Span::styled(format!("{} │ ", when), Styles::inactive()),
            Span::raw(format!("{:<30}", truncate(&record.title, 30))),
            Span::styled(
                format!(
                    " │ {} fields, {}/{} answered",
                    record.fields.len(),
                    record.answered_count(),
                    answerable
                ),
                Styles::info(),
            ),
        ])
    }
}

impl Screen for DashboardScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(0),    // Records
                Constraint::Length(3), // Instructions
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("Form Builder Dashboard", Styles::title(theme)),
            Span::styled(
                format!("   F2: {}", theme.toggle_label()),
                Styles::inactive(),
            ),
        ]))
        .style(Styles::base(theme))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        if self.records.is_empty() {
            let empty = Paragraph::new("No saved forms yet. Press 'n' to build one.")
                .style(Styles::inactive())
                .block(Block::default().title("Recent Forms").borders(Borders::ALL));
            f.render_widget(empty, chunks[1]);
        } else {
            self.records
                .render(f, chunks[1], theme, Self::format_record);
        }

        let instructions = Paragraph::new(
            "↑/↓: Navigate | Enter: View | n: New form | t: Use as template | r: Refresh | D: Clear all | q: Quit",
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
            KeyCode::Up => self.records.navigate_up(),
            KeyCode::Down => self.records.navigate_down(),
            KeyCode::Home => self.records.navigate_to_first(),
            KeyCode::End => self.records.navigate_to_last(),
            KeyCode::Enter => {
                if let Some(record) = self.records.selected() {
                    return Ok(ScreenAction::NavigateTo(Route::View(record.id)));
                }
            }
            KeyCode::Char('n') => return Ok(ScreenAction::NavigateTo(Route::Builder)),
            KeyCode::Char('q') => return Ok(ScreenAction::Quit),
            KeyCode::Char('t') => {
                if let Some(record) = self.records.selected() {
                    storage::save_template(store, &record.fields).await?;
                    return Ok(ScreenAction::NavigateTo(Route::Builder));
                }
            }
            KeyCode::Char('r') => {
                self.refresh(store).await?;
                return Ok(ScreenAction::SetStatus(format!(
                    "Loaded {} saved forms",
                    self.records.len()
                )));
            }
            KeyCode::Char('D') => {
                storage::clear_records(store).await?;
                self.refresh(store).await?;
                info!("Cleared all saved forms");
                return Ok(ScreenAction::SetStatus("Cleared all saved forms".to_string()));
            }
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    fn route(&self) -> Route {
        Route::Dashboard
    }

    fn help(&self) -> &'static str {
        "Dashboard:\n\
        ↑/↓ - Navigate saved forms\n\
        Enter - View submission\n\
        n - Build a new form\n\
        t - Start a new form from the selected form's fields\n\
        r - Reload from storage\n\
        D - Clear all saved forms\n\
        q - Quit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormBuilder;
    use crate::models::FieldType;
    use crate::storage::{prepend_record, take_template, MemoryStore};
    use chrono::{TimeZone, Utc};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        for millis in [1_000, 2_000] {
            let mut form = FormBuilder::new();
            form.add_field(FieldType::Text);
            let record = form
                .submit(Utc.timestamp_millis_opt(millis).unwrap())
                .unwrap();
            prepend_record(&store, &record).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_enter_opens_newest_record() {
        let store = seeded_store().await;
        let mut screen = DashboardScreen::new();
        screen.refresh(&store).await.unwrap();

        let action = screen.handle_key_event(key(KeyCode::Enter), &store).await.unwrap();
        assert_eq!(action, ScreenAction::NavigateTo(Route::View(2_000)));
    }

    #[tokio::test]
    async fn test_q_quits() {
        let store = MemoryStore::new();
        let mut screen = DashboardScreen::new();
        let action = screen
            .handle_key_event(key(KeyCode::Char('q')), &store)
            .await
            .unwrap();
        assert_eq!(action, ScreenAction::Quit);
    }

    #[tokio::test]
    async fn test_template_key_stores_fields() {
        let store = seeded_store().await;
        let mut screen = DashboardScreen::new();
        screen.refresh(&store).await.unwrap();

        let action = screen
            .handle_key_event(key(KeyCode::Char('t')), &store)
            .await
            .unwrap();
        assert_eq!(action, ScreenAction::NavigateTo(Route::Builder));

        let template = take_template(&store).await.unwrap().unwrap();
        assert_eq!(template.len(), 1);
        assert_eq!(template[0].field_type, FieldType::Text);
    }

    #[tokio::test]
    async fn test_clear_empties_list() {
        let store = seeded_store().await;
        let mut screen = DashboardScreen::new();
        screen.refresh(&store).await.unwrap();
        assert_eq!(screen.records.len(), 2);

        screen
            .handle_key_event(key(KeyCode::Char('D')), &store)
            .await
            .unwrap();
        assert!(screen.records.is_empty());
    }
}
