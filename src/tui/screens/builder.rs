//! Form builder screen: field list and editor on the left, live preview on the right

use anyhow::Result;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, warn};

use crate::form::{editor, FormBuilder, Interaction, SubmitOutcome};
use crate::form::input::is_checked;
use crate::models::{Field, FieldId, FieldType};
use crate::storage::KeyValueStore;
use crate::tui::{
    app::Route,
    components::{render_field, InputField, InputOutcome, ListView, RenderContext},
    traits::{Navigable, Screen, ScreenAction},
    ui::{centered_rect, Styles, Theme},
};

pub const BLOCKED_NOTICE: &str = "Please fill all required fields.";

/// Which half of the screen receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Fields,
    Preview,
}

/// What the edit popup is changing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Title,
    Label(FieldId),
    Option(FieldId, usize),
}

#[derive(Debug, Clone)]
struct Editing {
    target: EditTarget,
    input: InputField,
}

/// Builder screen state. Owns the form session; dropping the screen ends the session.
pub struct BuilderScreen {
    pub form: FormBuilder,
    pub pane: Pane,
    pub field_state: ListState,
    /// Option highlighted in the field list for rename/remove
    pub option_cursor: usize,
    editing: Option<Editing>,
    palette: Option<ListView<FieldType>>,

    // Live preview state
    pub preview_focus: Option<FieldId>,
    pub choice_cursor: usize,
    pub draft: InputField,
    pub show_blocked_notice: bool,
}

impl BuilderScreen {
    pub fn new(form: FormBuilder) -> Self {
        let mut field_state = ListState::default();
        if !form.fields().is_empty() {
            field_state.select(Some(0));
        }

        Self {
            form,
            pane: Pane::Fields,
            field_state,
            option_cursor: 0,
            editing: None,
            palette: None,
            preview_focus: None,
            choice_cursor: 0,
            draft: InputField::new("draft"),
            show_blocked_notice: false,
        }
    }

    pub fn selected_field(&self) -> Option<&Field> {
        self.field_state
            .selected()
            .and_then(|i| self.form.fields().get(i))
    }

    fn update_selected(&mut self, edit: impl FnOnce(&mut Field)) {
        if let Some(mut field) = self.selected_field().cloned() {
            edit(&mut field);
            self.form.update_field(field);
        }
    }

    /// Ids of fields that accept input, in display order
    pub fn preview_targets(&self) -> Vec<FieldId> {
        self.form
            .fields()
            .iter()
            .filter(|f| f.field_type.is_interactive())
            .map(|f| f.id)
            .collect()
    }

    fn focused_field(&self) -> Option<&Field> {
        self.preview_focus.and_then(|id| self.form.field(id))
    }

    /// Move preview focus to `id` and load its value into the edit buffers
    pub fn focus_preview(&mut self, id: FieldId) {
        let Some(field) = self.form.field(id) else {
            return;
        };
        let value = self.form.value(id);

        let text = match field.field_type {
            FieldType::Text | FieldType::Number => {
                value.and_then(|v| v.as_text()).unwrap_or_default().to_string()
            }
            FieldType::Tags => value.map(|v| v.display()).unwrap_or_default(),
            _ => String::new(),
        };
        let selected = value
            .and_then(|v| v.as_text())
            .and_then(|v| field.options.iter().position(|opt| opt == v));
        let cursor = match field.field_type {
            FieldType::Dropdown => selected.map_or(0, |i| i + 1),
            FieldType::MultipleChoice => selected.unwrap_or(0),
            _ => 0,
        };

        self.draft.set_value(&text);
        self.choice_cursor = cursor;
        self.preview_focus = Some(id);
    }

    fn move_preview_focus(&mut self, forward: bool) {
        let targets = self.preview_targets();
        if targets.is_empty() {
            self.preview_focus = None;
            return;
        }

        let current = self
            .preview_focus
            .and_then(|id| targets.iter().position(|t| *t == id));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % targets.len(),
            (Some(0), false) => targets.len() - 1,
            (Some(i), false) => i - 1,
        };
        self.focus_preview(targets[next]);
    }

    fn ensure_preview_focus(&mut self) {
        let valid = self
            .focused_field()
            .map_or(false, |f| f.field_type.is_interactive());
        if !valid {
            self.preview_focus = None;
            self.move_preview_focus(true);
        }
    }

    /// Rows the choice cursor can move between for `field`
    fn choice_rows(&self, field: &Field) -> usize {
        render_field(field, self.form.value(field.id), false, &RenderContext::default())
            .and_then(|view| view.control)
            .map_or(0, |control| control.option_rows())
    }

    async fn submit(&mut self, store: &dyn KeyValueStore) -> Result<ScreenAction> {
        match self.form.submit_and_persist(store, Utc::now()).await? {
            SubmitOutcome::Blocked(err) => {
                self.show_blocked_notice = true;
                if let Some(first) = err.missing.iter().next() {
                    self.pane = Pane::Preview;
                    self.focus_preview(*first);
                }
                Ok(ScreenAction::SetError(err.to_string()))
            }
            SubmitOutcome::Persisted(record) => Ok(ScreenAction::Submitted(record.id)),
        }
    }

    fn start_editing(&mut self, target: EditTarget) {
        let (label, value) = match target {
            EditTarget::Title => ("Form Title", self.form.title().to_string()),
            EditTarget::Label(id) => match self.form.field(id) {
                Some(field) => ("Field Label", field.label.clone()),
                None => return,
            },
            EditTarget::Option(id, index) => {
                match self.form.field(id).and_then(|f| f.options.get(index)) {
                    Some(option) => ("Option", option.clone()),
                    None => return,
                }
            }
        };

        let mut input = InputField::new(label).with_value(&value);
        input.set_focus(true);
        self.editing = Some(Editing { target, input });
    }

    fn commit_edit(&mut self, editing: Editing) {
        let text = editing.input.value;
        match editing.target {
            EditTarget::Title => self.form.set_title(&text),
            EditTarget::Label(id) => {
                if let Some(mut field) = self.form.field(id).cloned() {
                    editor::set_label(&mut field, &text);
                    self.form.update_field(field);
                }
            }
            EditTarget::Option(id, index) => {
                if let Some(mut field) = self.form.field(id).cloned() {
                    editor::rename_option(&mut field, index, &text);
                    self.form.update_field(field);
                }
            }
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if let Some(editing) = self.editing.take() {
                    self.commit_edit(editing);
                }
            }
            KeyCode::Esc => self.editing = None,
            _ => {
                if let Some(editing) = self.editing.as_mut() {
                    editing.input.handle_key(key, |_| true);
                }
            }
        }
    }

    fn handle_palette_key(&mut self, key: KeyEvent) -> ScreenAction {
        let Some(palette) = self.palette.as_mut() else {
            return ScreenAction::None;
        };

        match key.code {
            KeyCode::Up => palette.navigate_up(),
            KeyCode::Down => palette.navigate_down(),
            KeyCode::Enter => {
                let chosen = palette.selected().cloned();
                self.palette = None;
                if let Some(field_type) = chosen {
                    let id = self.form.add_field(field_type);
                    self.field_state.select(Some(self.form.fields().len() - 1));
                    self.option_cursor = 0;
                    return ScreenAction::SetStatus(format!("Added field #{}", id));
                }
            }
            KeyCode::Esc => self.palette = None,
            _ => {}
        }
        ScreenAction::None
    }

    fn select_field(&mut self, forward: bool) {
        let count = self.form.fields().len();
        if count == 0 {
            return;
        }
        let next = match (self.field_state.selected(), forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % count,
            (Some(0), false) => count - 1,
            (Some(i), false) => i - 1,
        };
        self.field_state.select(Some(next));
        self.option_cursor = 0;
    }

    fn handle_fields_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Up => self.select_field(false),
            KeyCode::Down => self.select_field(true),
            KeyCode::Char('a') | KeyCode::Insert => {
                self.palette = Some(ListView::new(FieldType::all(), "Add Field"));
            }
            KeyCode::Char('t') => self.start_editing(EditTarget::Title),
            KeyCode::Char('q') => return ScreenAction::Quit,
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.selected_field().map(|f| f.id) {
                    self.start_editing(EditTarget::Label(id));
                }
            }
            KeyCode::Char('r') => self.update_selected(editor::toggle_required),
            KeyCode::Char('+') => {
                let mut added = None;
                self.update_selected(|field| added = editor::add_option(field));
                if let Some(index) = added {
                    self.option_cursor = index;
                }
            }
            KeyCode::Char('-') => {
                let index = self.option_cursor;
                self.update_selected(|field| {
                    editor::remove_option(field, index);
                });
                let remaining = self.selected_field().map_or(0, |f| f.options.len());
                self.option_cursor = self.option_cursor.min(remaining.saturating_sub(1));
            }
            KeyCode::Char('[') => self.option_cursor = self.option_cursor.saturating_sub(1),
            KeyCode::Char(']') => {
                let count = self.selected_field().map_or(0, |f| f.options.len());
                if self.option_cursor + 1 < count {
                    self.option_cursor += 1;
                }
            }
            KeyCode::Char('o') => {
                if let Some(id) = self.selected_field().map(|f| f.id) {
                    self.start_editing(EditTarget::Option(id, self.option_cursor));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_field().map(|f| f.id) {
                    self.form.delete_field(id);
                    if self.preview_focus == Some(id) {
                        self.preview_focus = None;
                    }
                    let count = self.form.fields().len();
                    let selected = self.field_state.selected().unwrap_or(0);
                    self.field_state
                        .select(if count == 0 { None } else { Some(selected.min(count - 1)) });
                    return ScreenAction::SetStatus(format!("Deleted field #{}", id));
                }
            }
            KeyCode::Char('K') | KeyCode::Char('J') => {
                let delta = if key.code == KeyCode::Char('K') { -1 } else { 1 };
                if let (Some(id), Some(index)) =
                    (self.selected_field().map(|f| f.id), self.field_state.selected())
                {
                    if self.form.move_field(id, delta) {
                        self.field_state.select(Some((index as isize + delta) as usize));
                    }
                }
            }
            _ => {}
        }
        ScreenAction::None
    }

    async fn handle_preview_key(
        &mut self,
        key: KeyEvent,
        store: &dyn KeyValueStore,
    ) -> Result<ScreenAction> {
        self.ensure_preview_focus();
        let Some(field) = self.focused_field().cloned() else {
            return Ok(ScreenAction::None);
        };
        let rows = self.choice_rows(&field);

        match (&field.field_type, key.code) {
            (_, KeyCode::Down) if rows > 0 && self.choice_cursor + 1 < rows => {
                self.choice_cursor += 1;
            }
            (_, KeyCode::Up) if rows > 0 && self.choice_cursor > 0 => {
                self.choice_cursor -= 1;
            }
            (_, KeyCode::Down) => self.move_preview_focus(true),
            (_, KeyCode::Up) => self.move_preview_focus(false),
            (FieldType::Checkboxes, KeyCode::Char(' ') | KeyCode::Enter) => {
                if let Some(option) = field.options.get(self.choice_cursor) {
                    let checked = !is_checked(self.form.value(field.id), option);
                    self.form.interact(
                        field.id,
                        Interaction::Toggle { option: option.clone(), checked },
                    );
                }
            }
            (FieldType::MultipleChoice, KeyCode::Char(' ') | KeyCode::Enter) => {
                if let Some(option) = field.options.get(self.choice_cursor) {
                    self.form.interact(field.id, Interaction::Choose(option.clone()));
                }
            }
            (FieldType::Dropdown, KeyCode::Char(' ') | KeyCode::Enter) => {
                let choice = match self.choice_cursor {
                    0 => None,
                    row => field.options.get(row - 1).cloned(),
                };
                self.form.interact(field.id, Interaction::Select(choice));
            }
            (FieldType::Text | FieldType::Number | FieldType::Tags, KeyCode::Enter) => {
                return self.submit(store).await;
            }
            (FieldType::Text | FieldType::Tags, _) => {
                if self.draft.handle_key(key, |_| true) == InputOutcome::Changed {
                    self.form
                        .interact(field.id, Interaction::Text(self.draft.value.clone()));
                }
            }
            (FieldType::Number, _) => {
                let numeric = |c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E');
                if self.draft.handle_key(key, numeric) == InputOutcome::Changed {
                    self.form
                        .interact(field.id, Interaction::Text(self.draft.value.clone()));
                }
            }
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    fn draw_header(&self, f: &mut Frame, area: Rect, theme: Theme) {
        let header = Line::from(vec![
            Span::styled("Form Builder", Styles::title(theme)),
            Span::styled(
                format!("   F2: {}   Esc: Back to Dashboard", theme.toggle_label()),
                Styles::inactive(),
            ),
        ]);
        let widget = Paragraph::new(header)
            .style(Styles::base(theme))
            .block(Block::default().borders(Borders::ALL).border_style(Styles::inactive_border()));
        f.render_widget(widget, area);
    }

    fn draw_fields(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        InputField::new("Form Title (t)")
            .with_value(self.form.title())
            .render(f, chunks[0], theme);

        let selected = self.field_state.selected();
        let items: Vec<ListItem> = self
            .form
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let mut lines = vec![Line::from(vec![
                    Span::styled(format!("#{:<3} ", field.id), Styles::inactive()),
                    Span::styled(format!("{:<15}", field.field_type.as_str()), Styles::info()),
                    Span::raw(field.label.clone()),
                    Span::styled(
                        if field.required { "  (required)" } else { "" },
                        Styles::warning(),
                    ),
                ])];

                if field.field_type.has_options() {
                    let mut spans = vec![Span::styled("     options: ", Styles::inactive())];
                    for (j, option) in field.options.iter().enumerate() {
                        let style = if Some(i) == selected && j == self.option_cursor {
                            Styles::selected()
                        } else {
                            Styles::base(theme)
                        };
                        spans.push(Span::styled(format!("[{}]", option), style));
                        spans.push(Span::raw(" "));
                    }
                    lines.push(Line::from(spans));
                }
                ListItem::new(lines)
            })
            .collect();

        let border = if self.pane == Pane::Fields {
            Styles::active_border(theme)
        } else {
            Styles::inactive_border()
        };

        if items.is_empty() {
            let empty = Paragraph::new("No fields yet. Press 'a' to add one.")
                .style(Styles::inactive())
                .block(Block::default().title("Fields").borders(Borders::ALL).border_style(border));
            f.render_widget(empty, chunks[1]);
            return;
        }

        let list = List::new(items)
            .style(Styles::base(theme))
            .block(Block::default().title("Fields").borders(Borders::ALL).border_style(border))
            .highlight_style(Styles::title(theme))
            .highlight_symbol("▶ ");
        f.render_stateful_widget(list, chunks[1], &mut self.field_state);
    }

    fn draw_preview(&self, f: &mut Frame, area: Rect, theme: Theme) {
        let data = self.form.submission_data();
        let json = if data.is_empty() {
            None
        } else {
            serde_json::to_string_pretty(data).ok()
        };
        let json_height = json
            .as_ref()
            .map_or(0, |j| (j.lines().count() as u16 + 2).min(12));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(json_height)])
            .split(area);

        let border = if self.pane == Pane::Preview {
            Styles::active_border(theme)
        } else {
            Styles::inactive_border()
        };
        let block = Block::default()
            .title("Live Preview")
            .borders(Borders::ALL)
            .border_style(border)
            .style(Styles::base(theme));
        let inner = block.inner(chunks[0]);
        f.render_widget(block, chunks[0]);

        let focus_active = self.pane == Pane::Preview && self.editing.is_none();
        let mut views = Vec::new();
        for field in self.form.fields() {
            let focused = focus_active && self.preview_focus == Some(field.id);
            let ctx = RenderContext {
                theme,
                focused,
                cursor: self.choice_cursor,
                draft: (focused && field.field_type == FieldType::Tags)
                    .then_some(self.draft.value.as_str()),
                text_cursor: focused.then_some(self.draft.cursor_position),
            };
            let value = self.form.value(field.id);
            if let Some(view) = render_field(field, value, self.form.has_error(field.id), &ctx) {
                views.push((focused, view));
            }
        }

        // Scroll so the focused field's bottom edge stays visible
        let mut offset = 0u16;
        let mut y = 0u16;
        for (focused, view) in &views {
            y += view.height() + 1;
            if *focused && y > inner.height {
                offset = y - inner.height;
            }
        }

        let mut top = 0u16;
        for (_, view) in &views {
            let height = view.height();
            if top >= offset {
                let row = inner.y + (top - offset);
                if row >= inner.bottom() {
                    break;
                }
                let rect = Rect::new(inner.x, row, inner.width, height.min(inner.bottom() - row));
                view.render(f, rect, theme);
            }
            top += height + 1;
        }

        if top >= offset {
            let row = inner.y + (top - offset);
            if row < inner.bottom() {
                let submit = Paragraph::new(Span::styled("[ Submit ]  Ctrl+S", Styles::success()));
                f.render_widget(submit, Rect::new(inner.x, row, inner.width, 1));
            }
        }

        if let Some(json) = json {
            let panel = Paragraph::new(json)
                .style(Styles::base(theme))
                .block(Block::default().title("Submitted Values").borders(Borders::ALL));
            f.render_widget(panel, chunks[1]);
        }
    }

    fn draw_instructions(&self, f: &mut Frame, area: Rect, theme: Theme) {
        let text = match self.pane {
            Pane::Fields => {
                "Tab: Preview | a: Add | e: Label | r: Required | +/-/[/]/o: Options | d: Delete | K/J: Move | Ctrl+S: Submit"
            }
            Pane::Preview => {
                "Tab: Fields | ↑/↓: Move | Space/Enter: Select | Type to fill | Enter in text: Submit | Ctrl+S: Submit"
            }
        };
        let widget = Paragraph::new(text)
            .style(Styles::info())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Styles::inactive_border())
                    .style(Styles::base(theme)),
            );
        f.render_widget(widget, area);
    }

    fn draw_popups(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        if let Some(palette) = self.palette.as_mut() {
            let popup = centered_rect(40, 60, area);
            f.render_widget(Clear, popup);
            palette.render(f, popup, theme, |field_type| {
                Line::from(field_type.as_str().to_string())
            });
        }

        if let Some(editing) = &self.editing {
            let popup = centered_rect(60, 20, area);
            let popup = Rect {
                height: 3.min(area.height),
                ..popup
            };
            f.render_widget(Clear, popup);
            editing.input.render(f, popup, theme);
        }

        if self.show_blocked_notice {
            let popup = centered_rect(50, 20, area);
            f.render_widget(Clear, popup);
            let notice = Paragraph::new(vec![
                Line::from(Span::styled(BLOCKED_NOTICE, Styles::error())),
                Line::from(""),
                Line::from(Span::styled("Press any key to continue", Styles::inactive())),
            ])
            .style(Styles::base(theme))
            .block(
                Block::default()
                    .title("Cannot submit")
                    .borders(Borders::ALL)
                    .border_style(Styles::error()),
            );
            f.render_widget(notice, popup);
        }
    }
}

impl Screen for BuilderScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Panes
                Constraint::Length(4), // Instructions
            ])
            .split(area);

        self.draw_header(f, chunks[0], theme);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        self.draw_fields(f, panes[0], theme);
        self.draw_preview(f, panes[1], theme);
        self.draw_instructions(f, chunks[2], theme);
        self.draw_popups(f, area, theme);
    }

    async fn handle_key_event(
        &mut self,
        key: KeyEvent,
        store: &dyn KeyValueStore,
    ) -> Result<ScreenAction> {
        if self.show_blocked_notice {
            self.show_blocked_notice = false;
            return Ok(ScreenAction::None);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            debug!("Submit requested with {} fields", self.form.fields().len());
            return self.submit(store).await;
        }

        if self.palette.is_some() {
            return Ok(self.handle_palette_key(key));
        }

        if self.editing.is_some() {
            self.handle_editing_key(key);
            return Ok(ScreenAction::None);
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.pane = match self.pane {
                    Pane::Fields => Pane::Preview,
                    Pane::Preview => Pane::Fields,
                };
                if self.pane == Pane::Preview {
                    self.ensure_preview_focus();
                    if self.preview_focus.is_none() {
                        warn!("Preview has no fields that accept input");
                    }
                }
                Ok(ScreenAction::None)
            }
            KeyCode::Esc => Ok(ScreenAction::NavigateTo(Route::Dashboard)),
            _ => match self.pane {
                Pane::Fields => Ok(self.handle_fields_key(key)),
                Pane::Preview => self.handle_preview_key(key, store).await,
            },
        }
    }

    fn route(&self) -> Route {
        Route::Builder
    }

    fn help(&self) -> &'static str {
        "Form Builder:\n\
        Tab - Switch between field list and live preview\n\
        Ctrl+S - Submit the form\n\
        Esc - Back to dashboard (discards this form)\n\n\
        Field list:\n\
        a - Add a field from the palette\n\
        t - Edit form title\n\
        e / Enter - Edit label\n\
        r - Toggle required\n\
        + / - - Add option / remove highlighted option\n\
        [ / ] - Highlight previous / next option\n\
        o - Rename highlighted option\n\
        d / Delete - Delete field\n\
        K / J - Move field up / down\n\
        q - Quit\n\n\
        Live preview:\n\
        ↑/↓ - Move between fields and options\n\
        Space / Enter - Toggle or choose option\n\
        Type - Fill text, number and tag inputs (tags are comma-separated)"
    }

    fn captures_text(&self) -> bool {
        self.editing.is_some() || self.palette.is_some() || self.pane == Pane::Preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use crate::storage::{load_records, MemoryStore};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl_s() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
    }

    async fn press(screen: &mut BuilderScreen, store: &MemoryStore, codes: &[KeyCode]) {
        for code in codes {
            screen.handle_key_event(key(*code), store).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_palette_adds_field() {
        let store = MemoryStore::new();
        let mut screen = BuilderScreen::new(FormBuilder::new());

        press(
            &mut screen,
            &store,
            &[KeyCode::Char('a'), KeyCode::Down, KeyCode::Down, KeyCode::Down, KeyCode::Down, KeyCode::Enter],
        )
        .await;

        assert_eq!(screen.form.fields().len(), 1);
        assert_eq!(screen.form.fields()[0].field_type, FieldType::Text);
        assert_eq!(screen.selected_field().map(|f| f.id), Some(1));
    }

    #[tokio::test]
    async fn test_typing_in_preview_records_value() {
        let store = MemoryStore::new();
        let mut form = FormBuilder::new();
        let tags = form.add_field(FieldType::Tags);
        let mut screen = BuilderScreen::new(form);

        press(&mut screen, &store, &[KeyCode::Tab]).await;
        assert_eq!(screen.preview_focus, Some(tags));

        for c in "a, b ,, c".chars() {
            press(&mut screen, &store, &[KeyCode::Char(c)]).await;
        }
        assert_eq!(
            screen.form.value(tags),
            Some(&FieldValue::List(vec!["a".to_string(), "b".to_string(), "c".to_string()]))
        );
        assert_eq!(screen.draft.value, "a, b ,, c");
    }

    #[tokio::test]
    async fn test_radio_selection_is_exclusive() {
        let store = MemoryStore::new();
        let mut form = FormBuilder::new();
        let id = form.add_field(FieldType::MultipleChoice);
        let mut screen = BuilderScreen::new(form);

        press(
            &mut screen,
            &store,
            &[KeyCode::Tab, KeyCode::Char(' '), KeyCode::Down, KeyCode::Char(' ')],
        )
        .await;
        assert_eq!(screen.form.value(id), Some(&FieldValue::Text("Option 2".to_string())));
    }

    #[tokio::test]
    async fn test_required_field_blocks_and_shows_notice() {
        let store = MemoryStore::new();
        let mut form = FormBuilder::new();
        form.add_field(FieldType::Text);
        let mut screen = BuilderScreen::new(form);

        press(&mut screen, &store, &[KeyCode::Char('r')]).await;
        let action = screen.handle_key_event(ctrl_s(), &store).await.unwrap();

        assert_eq!(action, ScreenAction::SetError(BLOCKED_NOTICE.to_string()));
        assert!(screen.show_blocked_notice);
        assert!(screen.form.has_error(1));
        assert!(load_records(&store).await.unwrap().is_empty());

        // Any key dismisses the notice without acting on it
        press(&mut screen, &store, &[KeyCode::Char('x')]).await;
        assert!(!screen.show_blocked_notice);
        assert!(screen.form.value(1).is_none());
    }

    #[tokio::test]
    async fn test_submit_persists_and_reports_id() {
        let store = MemoryStore::new();
        let mut form = FormBuilder::new();
        form.add_field(FieldType::Number);
        let mut screen = BuilderScreen::new(form);

        press(&mut screen, &store, &[KeyCode::Tab, KeyCode::Char('4'), KeyCode::Char('x'), KeyCode::Char('2')])
            .await;
        let action = screen.handle_key_event(key(KeyCode::Enter), &store).await.unwrap();

        let records = load_records(&store).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(action, ScreenAction::Submitted(records[0].id));
        assert_eq!(records[0].value_for(1), Some(&FieldValue::Text("42".to_string())));
    }

    #[tokio::test]
    async fn test_label_edit_and_option_rename() {
        let store = MemoryStore::new();
        let mut form = FormBuilder::new();
        form.add_field(FieldType::Dropdown);
        let mut screen = BuilderScreen::new(form);

        press(&mut screen, &store, &[KeyCode::Char('e'), KeyCode::End]).await;
        for _ in 0.."Dropdown Label".len() {
            press(&mut screen, &store, &[KeyCode::Backspace]).await;
        }
        for c in "Size".chars() {
            press(&mut screen, &store, &[KeyCode::Char(c)]).await;
        }
        press(&mut screen, &store, &[KeyCode::Enter, KeyCode::Char(']'), KeyCode::Char('o')]).await;
        press(&mut screen, &store, &[KeyCode::Backspace, KeyCode::Char('L'), KeyCode::Enter]).await;

        let field = &screen.form.fields()[0];
        assert_eq!(field.label, "Size");
        assert_eq!(field.options, vec!["Option 1", "Option L"]);
    }

    #[tokio::test]
    async fn test_escape_returns_to_dashboard() {
        let store = MemoryStore::new();
        let mut screen = BuilderScreen::new(FormBuilder::new());
        let action = screen.handle_key_event(key(KeyCode::Esc), &store).await.unwrap();
        assert_eq!(action, ScreenAction::NavigateTo(Route::Dashboard));
    }

    #[tokio::test]
    async fn test_q_quits_from_field_list_only() {
        let store = MemoryStore::new();
        let mut form = FormBuilder::new();
        let text = form.add_field(FieldType::Text);
        let mut screen = BuilderScreen::new(form);

        let action = screen.handle_key_event(key(KeyCode::Char('q')), &store).await.unwrap();
        assert_eq!(action, ScreenAction::Quit);

        press(&mut screen, &store, &[KeyCode::Tab]).await;
        let action = screen.handle_key_event(key(KeyCode::Char('q')), &store).await.unwrap();
        assert_eq!(action, ScreenAction::None);
        assert_eq!(screen.form.value(text), Some(&FieldValue::Text("q".to_string())));
    }
}
