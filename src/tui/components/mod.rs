//! Reusable UI components for the form builder TUI

pub mod field_renderer;
pub mod input_field;
pub mod list_view;
pub mod status_display;

pub use field_renderer::{render_field, Control, FieldView, RenderContext};
pub use input_field::{InputField, InputOutcome};
pub use list_view::ListView;
pub use status_display::StatusDisplay;
