//! Main TUI application state and logic

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, error, info};

use super::components::StatusDisplay;
use super::screens::{BuilderScreen, DashboardScreen, ViewerScreen};
use super::traits::{Screen, ScreenAction};
use super::ui::{centered_rect, Styles, Theme};
use crate::config::Config;
use crate::form::FormBuilder;
use crate::models::SubmissionId;
use crate::storage::{self, KeyValueStore};

pub const SUCCESS_NOTICE: &str = "Form submitted and saved to Dashboard!";

const TICK_RATE: Duration = Duration::from_millis(100);

/// Addressable views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Builder,
    View(SubmissionId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/".to_string(),
            Route::Builder => "/builder".to_string(),
            Route::View(id) => format!("/view/{}", id),
        }
    }
}

/// Main TUI application state
pub struct App {
    pub route: Route,
    pub config: Config,
    pub theme: Theme,
    store: Box<dyn KeyValueStore>,

    // Screen states; the builder only exists while its route is active
    pub dashboard: DashboardScreen,
    pub builder: Option<BuilderScreen>,
    pub viewer: ViewerScreen,

    // Global application state
    pub status: StatusDisplay,
    pub should_quit: bool,
    pub show_help_popup: bool,
}

impl App {
    /// Create a new TUI application and load the dashboard
    pub async fn new(config: Config, store: Box<dyn KeyValueStore>) -> Result<Self> {
        let mut app = Self {
            route: Route::Dashboard,
            theme: config.theme,
            config,
            store,
            dashboard: DashboardScreen::new(),
            builder: None,
            viewer: ViewerScreen::new(),
            status: StatusDisplay::new(),
            should_quit: false,
            show_help_popup: false,
        };

        app.dashboard.refresh(app.store.as_ref()).await?;
        app.status
            .set_info(format!("Loaded {} saved forms", app.dashboard.records.len()));
        Ok(app)
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key).await?;
                    }
                }
            }

            if self.status.should_auto_clear(Instant::now()) {
                self.status.clear();
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn current_screen(&self) -> &dyn ScreenInfo {
        match self.route {
            Route::Dashboard => &self.dashboard,
            Route::Builder => match &self.builder {
                Some(builder) => builder,
                None => &self.dashboard,
            },
            Route::View(_) => &self.viewer,
        }
    }

    /// Handle keyboard input events
    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        let captures_text = self.current_screen().captures_text();

        // Global shortcuts
        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return Ok(());
            }
            KeyCode::Char('?') if !captures_text => {
                self.show_help_popup = !self.show_help_popup;
                return Ok(());
            }
            KeyCode::Esc if self.show_help_popup => {
                self.show_help_popup = false;
                return Ok(());
            }
            KeyCode::F(2) => return self.apply_action(ScreenAction::ToggleTheme).await,
            _ => {}
        }

        if self.show_help_popup {
            return Ok(());
        }

        let store = self.store.as_ref();
        let result = match self.route {
            Route::Dashboard => self.dashboard.handle_key_event(key, store).await,
            Route::Builder => match self.builder.as_mut() {
                Some(builder) => builder.handle_key_event(key, store).await,
                None => Ok(ScreenAction::NavigateTo(Route::Dashboard)),
            },
            Route::View(_) => self.viewer.handle_key_event(key, store).await,
        };

        match result {
            Ok(action) => self.apply_action(action).await,
            Err(e) => {
                error!("Key handling failed on {}: {:#}", self.route.path(), e);
                self.status.set_error(e.to_string());
                Ok(())
            }
        }
    }

    async fn apply_action(&mut self, action: ScreenAction) -> Result<()> {
        match action {
            ScreenAction::NavigateTo(route) => self.navigate(route).await?,
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::SetStatus(message) => self.status.set_info(message),
            ScreenAction::SetError(message) => self.status.set_error(message),
            ScreenAction::Submitted(id) => {
                self.navigate(Route::View(id)).await?;
                self.status
                    .set_success(SUCCESS_NOTICE.to_string(), self.config.notice_duration());
            }
            ScreenAction::ToggleTheme => {
                self.theme = self.theme.toggle();
                debug!("Theme switched to {}", self.theme.as_str());
            }
            ScreenAction::None => {}
        }
        Ok(())
    }

    /// Navigate to `route`, loading whatever the target screen needs.
    /// Leaving the builder discards its session.
    pub async fn navigate(&mut self, route: Route) -> Result<()> {
        if route != Route::Builder && self.builder.take().is_some() {
            debug!("Builder session ended");
        }

        let store = self.store.as_ref();
        match route {
            Route::Dashboard => self.dashboard.refresh(store).await?,
            Route::Builder => {
                if self.builder.is_none() {
                    let form = match storage::take_template(store).await? {
                        Some(fields) => {
                            info!("Starting new form from template with {} fields", fields.len());
                            FormBuilder::from_template(fields)
                        }
                        None => FormBuilder::new(),
                    };
                    self.builder = Some(BuilderScreen::new(form));
                }
            }
            Route::View(id) => self.viewer.load(id, store).await?,
        }

        self.status.clear();
        self.route = route;
        info!("Navigated to {}", route.path());
        Ok(())
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();
        f.render_widget(Block::default().style(Styles::base(self.theme)), size);

        // Main layout: status bar at bottom, content area above
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        let theme = self.theme;
        match self.route {
            Route::Dashboard => self.dashboard.draw(f, chunks[0], theme),
            Route::Builder => {
                if let Some(builder) = self.builder.as_mut() {
                    builder.draw(f, chunks[0], theme);
                }
            }
            Route::View(_) => self.viewer.draw(f, chunks[0], theme),
        }

        self.draw_status_bar(f, chunks[1]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let fallback = format!(
            "Form Builder - {} | F1: Help | F2: Theme | q: Quit",
            self.route.path()
        );
        self.status.render(f, area, &fallback);
    }

    /// Draw help popup with context-sensitive shortcuts
    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(80, 70, area);

        f.render_widget(Clear, popup_area);

        let help_popup = Paragraph::new(self.get_context_help())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .border_style(Styles::warning()),
            )
            .style(Styles::base(self.theme));

        f.render_widget(help_popup, popup_area);
    }

    fn get_context_help(&self) -> String {
        let global_help = "Global Shortcuts:\n\
            F1 / ? - Toggle this help\n\
            F2 - Switch between light and dark mode\n\
            q - Quit (outside text inputs and the preview)\n\
            Ctrl+C - Quit\n\n";

        format!("{}{}", global_help, self.current_screen().help())
    }
}

/// Object-safe view of a screen for help text and key routing decisions
trait ScreenInfo {
    fn help(&self) -> &'static str;
    fn captures_text(&self) -> bool;
}

impl<T: Screen> ScreenInfo for T {
    fn help(&self) -> &'static str {
        Screen::help(self)
    }

    fn captures_text(&self) -> bool {
        Screen::captures_text(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldType;
    use crate::storage::{save_template, MemoryStore};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    async fn app() -> App {
        App::new(Config::default(), Box::new(MemoryStore::new()))
            .await
            .unwrap()
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Dashboard.path(), "/");
        assert_eq!(Route::Builder.path(), "/builder");
        assert_eq!(Route::View(17).path(), "/view/17");
    }

    #[tokio::test]
    async fn test_leaving_builder_discards_session() {
        let mut app = app().await;
        app.navigate(Route::Builder).await.unwrap();
        app.builder.as_mut().unwrap().form.add_field(FieldType::Text);

        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.route, Route::Dashboard);
        assert!(app.builder.is_none());

        app.navigate(Route::Builder).await.unwrap();
        assert!(app.builder.as_ref().unwrap().form.fields().is_empty());
    }

    #[tokio::test]
    async fn test_builder_starts_from_template_once() {
        let store = MemoryStore::new();
        let template = vec![crate::models::Field::new(4, FieldType::Number)];
        save_template(&store, &template).await.unwrap();

        let mut app = App::new(Config::default(), Box::new(store)).await.unwrap();
        app.navigate(Route::Builder).await.unwrap();

        let form = &mut app.builder.as_mut().unwrap().form;
        assert_eq!(form.fields().len(), 1);
        assert_eq!(form.add_field(FieldType::Text), 5);

        app.navigate(Route::Dashboard).await.unwrap();
        app.navigate(Route::Builder).await.unwrap();
        assert!(app.builder.as_ref().unwrap().form.fields().is_empty());
    }

    #[tokio::test]
    async fn test_submit_navigates_to_record_with_notice() {
        let mut app = app().await;
        app.navigate(Route::Builder).await.unwrap();
        app.builder.as_mut().unwrap().form.add_field(FieldType::Text);

        app.handle_key_event(ctrl('s')).await.unwrap();

        let Route::View(id) = app.route else {
            panic!("expected record view, got {:?}", app.route);
        };
        assert!(app.builder.is_none());
        assert_eq!(app.viewer.record.as_ref().map(|r| r.id), Some(id));

        let notice = app.status.get_current().unwrap();
        assert_eq!(notice.message, SUCCESS_NOTICE);
        assert_eq!(notice.auto_clear, Some(Duration::from_millis(2000)));
    }

    #[tokio::test]
    async fn test_q_is_typed_inside_preview_inputs() {
        let mut app = app().await;
        app.navigate(Route::Builder).await.unwrap();
        app.builder.as_mut().unwrap().form.add_field(FieldType::Text);

        app.handle_key_event(key(KeyCode::Tab)).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('q'))).await.unwrap();
        assert!(!app.should_quit);

        app.handle_key_event(ctrl('c')).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_q_quits_from_dashboard() {
        let mut app = app().await;
        app.handle_key_event(key(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_theme_toggle() {
        let mut app = app().await;
        assert_eq!(app.theme, Theme::Light);
        app.handle_key_event(key(KeyCode::F(2))).await.unwrap();
        assert_eq!(app.theme, Theme::Dark);
    }
}
