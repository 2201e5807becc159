//! Core traits for the form builder TUI
//!
//! Screens draw themselves and turn key presses into [`ScreenAction`]s; the
//! [`App`](crate::tui::App) applies navigation, notices and theme changes.

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::models::SubmissionId;
use crate::storage::KeyValueStore;
use crate::tui::app::Route;
use crate::tui::ui::Theme;

/// Actions that can be returned from screen event handling
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Navigate to a different screen
    NavigateTo(Route),
    /// Quit the application
    Quit,
    /// Set status message
    SetStatus(String),
    /// Set error message
    SetError(String),
    /// A submission was persisted; show the success notice and open it
    Submitted(SubmissionId),
    /// Switch between light and dark mode
    ToggleTheme,
    /// No action taken
    None,
}

/// Core trait for all TUI screens
pub trait Screen {
    /// Draw the screen content
    fn draw(&mut self, f: &mut Frame, area: Rect, theme: Theme);

    /// Handle keyboard input and return an action for the app
    async fn handle_key_event(
        &mut self,
        key: KeyEvent,
        store: &dyn KeyValueStore,
    ) -> Result<ScreenAction>;

    /// Route this screen is addressed by
    fn route(&self) -> Route;

    /// Shortcut summary for the help popup
    fn help(&self) -> &'static str;

    /// Whether plain character keys go to a text input instead of global shortcuts
    fn captures_text(&self) -> bool {
        false
    }
}

/// Trait for screens with navigable lists
pub trait Navigable {
    /// Move selection up
    fn navigate_up(&mut self);

    /// Move selection down
    fn navigate_down(&mut self);

    /// Get currently selected index
    fn get_selected_index(&self) -> Option<usize>;

    /// Set selected index
    fn set_selected_index(&mut self, index: Option<usize>);

    /// Get total number of items
    fn get_item_count(&self) -> usize;

    /// Navigate to first item
    fn navigate_to_first(&mut self) {
        if self.get_item_count() > 0 {
            self.set_selected_index(Some(0));
        }
    }

    /// Navigate to last item
    fn navigate_to_last(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            self.set_selected_index(Some(count - 1));
        }
    }
}
