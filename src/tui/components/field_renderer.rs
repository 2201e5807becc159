//! Field renderer: projects a field definition and its current value to terminal lines
//!
//! Rendering is a pure function of `(field, value, error, context)`. The renderer keeps no
//! state; user interactions are turned into values by [`crate::form::input::apply`] and
//! reported to the owning [`FormBuilder`](crate::form::FormBuilder).

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::form::input::is_checked;
use crate::models::{Field, FieldType, FieldValue};
use crate::tui::ui::{Styles, Theme};

pub const REQUIRED_NOTICE: &str = "This field is required.";
pub const SELECT_PLACEHOLDER: &str = "Select...";
pub const TAGS_PLACEHOLDER: &str = "Comma-separated tags";

const SEPARATOR_WIDTH: usize = 160;
const INPUT_PREFIX: &str = "› ";

/// Interactive control produced for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    TextInput { value: String },
    NumberInput { value: String },
    /// `selected` indexes `options`; `None` is the unselected entry
    Select { options: Vec<String>, selected: Option<usize> },
    Checkboxes { options: Vec<String>, checked: Vec<bool> },
    /// Exclusive choice; `group` is shared by every option of one field
    Radio { group: String, options: Vec<String>, selected: Option<usize> },
    TagInput { text: String },
}

impl Control {
    /// Number of rows the user can move between (dropdown counts its unselected entry)
    pub fn option_rows(&self) -> usize {
        match self {
            Control::Select { options, .. } => options.len() + 1,
            Control::Checkboxes { options, .. } | Control::Radio { options, .. } => options.len(),
            _ => 0,
        }
    }
}

/// Host-supplied presentation context
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext<'a> {
    pub theme: Theme,
    pub focused: bool,
    /// Highlighted option row for choice controls
    pub cursor: usize,
    /// Raw text of a tag input being edited
    pub draft: Option<&'a str>,
    /// Text cursor column (in characters) for focused text inputs
    pub text_cursor: Option<usize>,
}

/// Rendered field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub lines: Vec<Line<'static>>,
    pub control: Option<Control>,
    /// Terminal cursor position `(column, row)` relative to the view's top-left
    pub cursor: Option<(u16, u16)>,
}

impl FieldView {
    fn new(lines: Vec<Line<'static>>, control: Option<Control>) -> Self {
        Self {
            lines,
            control,
            cursor: None,
        }
    }

    pub fn height(&self) -> u16 {
        self.lines.len() as u16
    }

    pub fn has_error_notice(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.spans.iter().any(|span| span.content == REQUIRED_NOTICE))
    }

    /// Lines without styling, joined by newlines
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: Theme) {
        let paragraph = Paragraph::new(self.lines.clone()).style(Styles::base(theme));
        f.render_widget(paragraph, area);

        if let Some((x, y)) = self.cursor {
            if x < area.width && y < area.height {
                f.set_cursor(area.x + x, area.y + y);
            }
        }
    }
}

/// Render `field` with its current `value`. Unrecognized field types render nothing.
pub fn render_field(
    field: &Field,
    value: Option<&FieldValue>,
    error: bool,
    ctx: &RenderContext,
) -> Option<FieldView> {
    let theme = ctx.theme;

    let view = match &field.field_type {
        FieldType::Header => FieldView::new(
            vec![Line::from(Span::styled(
                field.label.to_uppercase(),
                Styles::heading(theme),
            ))],
            None,
        ),
        FieldType::Label => FieldView::new(
            vec![Line::from(Span::styled(field.label.clone(), Styles::bold(theme)))],
            None,
        ),
        FieldType::Paragraph => FieldView::new(
            field
                .label
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Styles::base(theme))))
                .collect(),
            None,
        ),
        FieldType::Linebreak => FieldView::new(
            vec![Line::from(Span::styled(
                "─".repeat(SEPARATOR_WIDTH),
                Styles::inactive(),
            ))],
            None,
        ),
        FieldType::Text => {
            let text = text_of(value);
            text_input(field, &text, None, error, ctx, Control::TextInput { value: text.clone() })
        }
        FieldType::Number => {
            let text = text_of(value);
            text_input(field, &text, None, error, ctx, Control::NumberInput { value: text.clone() })
        }
        FieldType::Tags => {
            let text = match (ctx.draft, value) {
                (Some(draft), _) => draft.to_string(),
                (None, Some(v)) => v.display(),
                (None, None) => String::new(),
            };
            text_input(
                field,
                &text,
                Some(TAGS_PLACEHOLDER),
                error,
                ctx,
                Control::TagInput { text: text.clone() },
            )
        }
        FieldType::Dropdown => dropdown(field, value, error, ctx),
        FieldType::Checkboxes => {
            let checked: Vec<bool> = field
                .options
                .iter()
                .map(|opt| is_checked(value, opt))
                .collect();
            let rows = field
                .options
                .iter()
                .zip(&checked)
                .map(|(opt, on)| (if *on { "[x] " } else { "[ ] " }, opt.as_str()))
                .collect::<Vec<_>>();
            let lines = choice_lines(field, &rows, error, ctx);
            FieldView::new(
                lines,
                Some(Control::Checkboxes {
                    options: field.options.clone(),
                    checked,
                }),
            )
        }
        FieldType::MultipleChoice => {
            let current = value.and_then(FieldValue::as_text);
            let selected = current.and_then(|v| field.options.iter().position(|opt| opt == v));
            let rows = field
                .options
                .iter()
                .enumerate()
                .map(|(i, opt)| (if Some(i) == selected { "(•) " } else { "( ) " }, opt.as_str()))
                .collect::<Vec<_>>();
            let lines = choice_lines(field, &rows, error, ctx);
            FieldView::new(
                lines,
                Some(Control::Radio {
                    group: format!("field-{}", field.id),
                    options: field.options.clone(),
                    selected,
                }),
            )
        }
        FieldType::Other(name) => {
            debug!("No renderer for field type '{}' (field #{})", name, field.id);
            return None;
        }
    };

    Some(view)
}

fn text_of(value: Option<&FieldValue>) -> String {
    value
        .and_then(FieldValue::as_text)
        .unwrap_or_default()
        .to_string()
}

fn label_line(field: &Field, theme: Theme) -> Line<'static> {
    Line::from(Span::styled(field.label.clone(), Styles::base(theme)))
}

fn notice_line() -> Line<'static> {
    Line::from(Span::styled(
        REQUIRED_NOTICE,
        Styles::error().add_modifier(Modifier::ITALIC),
    ))
}

fn control_style(error: bool, ctx: &RenderContext) -> Style {
    if error {
        Styles::error()
    } else if ctx.focused {
        Styles::active_border(ctx.theme)
    } else {
        Styles::inactive_border()
    }
}

fn text_input(
    field: &Field,
    text: &str,
    placeholder: Option<&str>,
    error: bool,
    ctx: &RenderContext,
    control: Control,
) -> FieldView {
    let marker = Span::styled(INPUT_PREFIX, control_style(error, ctx));
    let body = match placeholder {
        Some(placeholder) if text.is_empty() => Span::styled(placeholder.to_string(), Styles::inactive()),
        _ => Span::styled(text.to_string(), Styles::base(ctx.theme)),
    };

    let mut lines = vec![label_line(field, ctx.theme), Line::from(vec![marker, body])];
    if error {
        lines.push(notice_line());
    }

    let mut view = FieldView::new(lines, Some(control));
    if ctx.focused {
        let chars = ctx.text_cursor.unwrap_or_else(|| text.chars().count());
        let before: String = text.chars().take(chars).collect();
        let column = INPUT_PREFIX.width() + before.width();
        view.cursor = Some((column as u16, 1));
    }
    view
}

fn dropdown(field: &Field, value: Option<&FieldValue>, error: bool, ctx: &RenderContext) -> FieldView {
    let current = value.and_then(FieldValue::as_text);
    let selected = current.and_then(|v| field.options.iter().position(|opt| opt == v));
    let shown = selected
        .map(|i| field.options[i].clone())
        .unwrap_or_else(|| SELECT_PLACEHOLDER.to_string());

    let mut lines = vec![
        label_line(field, ctx.theme),
        Line::from(vec![
            Span::styled("▾ ", control_style(error, ctx)),
            Span::styled(shown, Styles::base(ctx.theme)),
        ]),
    ];

    // Expanded list while focused; row 0 is the unselected entry
    if ctx.focused {
        let entries = std::iter::once(SELECT_PLACEHOLDER).chain(field.options.iter().map(String::as_str));
        for (row, entry) in entries.enumerate() {
            let style = if row == ctx.cursor {
                Styles::selected()
            } else {
                Styles::base(ctx.theme)
            };
            let mark = if row > 0 && selected == Some(row - 1) { "• " } else { "  " };
            lines.push(Line::from(Span::styled(format!("  {}{}", mark, entry), style)));
        }
    }

    if error {
        lines.push(notice_line());
    }

    FieldView::new(
        lines,
        Some(Control::Select {
            options: field.options.clone(),
            selected,
        }),
    )
}

fn choice_lines(
    field: &Field,
    rows: &[(&str, &str)],
    error: bool,
    ctx: &RenderContext,
) -> Vec<Line<'static>> {
    let mut lines = vec![label_line(field, ctx.theme)];

    for (i, (marker, option)) in rows.iter().enumerate() {
        let option_style = if ctx.focused && i == ctx.cursor {
            Styles::selected()
        } else {
            Styles::base(ctx.theme)
        };
        lines.push(Line::from(vec![
            Span::styled(marker.to_string(), control_style(error, ctx)),
            Span::styled(option.to_string(), option_style),
        ]));
    }

    if error {
        lines.push(notice_line());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderContext<'static> {
        RenderContext::default()
    }

    #[test]
    fn test_static_fields_have_no_control() {
        for field_type in [
            FieldType::Header,
            FieldType::Label,
            FieldType::Paragraph,
            FieldType::Linebreak,
        ] {
            let field = Field::new(1, field_type).with_options(vec!["ignored".to_string()]);
            let view = render_field(&field, None, true, &ctx()).unwrap();
            assert!(view.control.is_none());
            assert!(!view.has_error_notice());
            assert!(!view.plain_text().contains("ignored"));
        }
    }

    #[test]
    fn test_unknown_type_renders_nothing() {
        let field = Field::new(1, FieldType::Other("signature".to_string()));
        assert!(render_field(&field, None, false, &ctx()).is_none());
    }

    #[test]
    fn test_error_flag_adds_notice() {
        let field = Field::new(1, FieldType::Text);
        let with_error = render_field(&field, None, true, &ctx()).unwrap();
        let without = render_field(&field, None, false, &ctx()).unwrap();

        assert!(with_error.has_error_notice());
        assert!(!without.has_error_notice());
        assert_eq!(with_error.height(), without.height() + 1);
    }

    #[test]
    fn test_rendering_is_pure() {
        let field = Field::new(3, FieldType::Checkboxes);
        let value = FieldValue::List(vec!["Option 2".to_string()]);
        let first = render_field(&field, Some(&value), false, &ctx());
        let second = render_field(&field, Some(&value), false, &ctx());
        assert_eq!(first, second);
    }

    #[test]
    fn test_checkbox_state_follows_value() {
        let field = Field::new(3, FieldType::Checkboxes);
        let value = FieldValue::List(vec!["Option 2".to_string()]);
        let view = render_field(&field, Some(&value), false, &ctx()).unwrap();

        assert_eq!(
            view.control,
            Some(Control::Checkboxes {
                options: vec!["Option 1".to_string(), "Option 2".to_string()],
                checked: vec![false, true],
            })
        );
        assert!(view.plain_text().contains("[x] Option 2"));
    }

    #[test]
    fn test_radio_group_is_scoped_to_field() {
        let field = Field::new(8, FieldType::MultipleChoice)
            .with_options(vec!["X".to_string(), "Y".to_string()]);
        let value = FieldValue::Text("Y".to_string());
        let view = render_field(&field, Some(&value), false, &ctx()).unwrap();

        match &view.control {
            Some(Control::Radio { group, selected, .. }) => {
                assert_eq!(group, "field-8");
                assert_eq!(selected, &Some(1));
            }
            other => panic!("expected radio control, got {:?}", other),
        }
        assert_eq!(view.plain_text().matches("(•)").count(), 1);
    }

    #[test]
    fn test_dropdown_shows_placeholder_until_selected() {
        let field = Field::new(2, FieldType::Dropdown);
        let view = render_field(&field, None, false, &ctx()).unwrap();
        assert!(view.plain_text().contains(SELECT_PLACEHOLDER));

        let focused = RenderContext {
            focused: true,
            ..ctx()
        };
        let view = render_field(&field, None, false, &focused).unwrap();
        assert_eq!(view.control.as_ref().map(Control::option_rows), Some(3));
        assert!(view.plain_text().contains("Option 2"));
    }

    #[test]
    fn test_list_value_in_text_input_shows_empty() {
        let field = Field::new(1, FieldType::Text);
        let value = FieldValue::List(vec!["a".to_string()]);
        let view = render_field(&field, Some(&value), false, &ctx()).unwrap();
        assert_eq!(view.control, Some(Control::TextInput { value: String::new() }));
    }

    #[test]
    fn test_tags_prefer_draft_text() {
        let field = Field::new(1, FieldType::Tags);
        let value = FieldValue::List(vec!["a".to_string(), "b".to_string()]);

        let view = render_field(&field, Some(&value), false, &ctx()).unwrap();
        assert_eq!(view.control, Some(Control::TagInput { text: "a, b".to_string() }));

        let editing = RenderContext {
            focused: true,
            draft: Some("a, b,"),
            ..ctx()
        };
        let view = render_field(&field, Some(&value), false, &editing).unwrap();
        assert_eq!(view.control, Some(Control::TagInput { text: "a, b,".to_string() }));
        assert_eq!(view.cursor, Some((7, 1)));

        let empty = render_field(&field, None, false, &ctx()).unwrap();
        assert!(empty.plain_text().contains(TAGS_PLACEHOLDER));
    }
}
