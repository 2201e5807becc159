//! Generic selectable list component

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::tui::{
    traits::Navigable,
    ui::{Styles, Theme},
};

/// Generic list view component
pub struct ListView<T> {
    pub items: Vec<T>,
    pub state: ListState,
    pub title: String,
}

impl<T> ListView<T> {
    pub fn new(items: Vec<T>, title: &str) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }

        Self {
            items,
            state,
            title: title.to_string(),
        }
    }

    /// Update items and maintain selection if possible
    pub fn set_items(&mut self, items: Vec<T>) {
        let selected = self.state.selected();
        self.items = items;

        match selected {
            Some(idx) if idx < self.items.len() => self.state.select(Some(idx)),
            _ if !self.items.is_empty() => self.state.select(Some(0)),
            _ => self.state.select(None),
        }
    }

    /// Get currently selected item
    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render the list, formatting each item with `format_item`
    pub fn render<F>(&mut self, f: &mut Frame, area: Rect, theme: Theme, format_item: F)
    where
        F: Fn(&T) -> Line<'static>,
    {
        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| ListItem::new(format_item(item)))
            .collect();

        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_style(Styles::active_border(theme));

        let list = List::new(items)
            .block(block)
            .style(Styles::base(theme))
            .highlight_style(Styles::selected())
            .highlight_symbol("▶ ");

        f.render_stateful_widget(list, area, &mut self.state);
    }
}

impl<T> Navigable for ListView<T> {
    fn navigate_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn navigate_down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        };
        self.state.select(Some(i));
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.state.select(index);
    }

    fn get_item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps() {
        let mut list = ListView::new(vec!["a", "b", "c"], "Letters");
        assert_eq!(list.selected(), Some(&"a"));

        list.navigate_up();
        assert_eq!(list.selected(), Some(&"c"));
        list.navigate_down();
        assert_eq!(list.selected(), Some(&"a"));

        list.navigate_to_last();
        assert_eq!(list.get_selected_index(), Some(2));
    }

    #[test]
    fn test_set_items_keeps_valid_selection() {
        let mut list = ListView::new(vec![1, 2, 3], "Numbers");
        list.set_selected_index(Some(2));

        list.set_items(vec![4, 5]);
        assert_eq!(list.selected(), Some(&4));

        list.set_items(vec![]);
        assert_eq!(list.selected(), None);
        list.navigate_down();
        assert!(list.is_empty());
    }
}
