//! Conversion of user interactions on a rendered field into a new value

use crate::models::{Field, FieldType, FieldValue};

/// A user interaction with a rendered control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// The full text of a text, number or tag input after a keystroke
    Text(String),
    /// Dropdown selection; `None` is the unselected entry
    Select(Option<String>),
    /// Checkbox toggled to `checked`
    Toggle { option: String, checked: bool },
    /// Radio button chosen
    Choose(String),
}

/// Compute the value to report for `interaction` on `field`.
///
/// Returns `None` when the interaction does not apply to the field's variant; non-interactive
/// and unrecognized variants never yield a value. The field itself is never modified.
pub fn apply(
    field: &Field,
    current: Option<&FieldValue>,
    interaction: Interaction,
) -> Option<FieldValue> {
    match (&field.field_type, interaction) {
        (FieldType::Text | FieldType::Number, Interaction::Text(text)) => {
            Some(FieldValue::Text(text))
        }
        (FieldType::Tags, Interaction::Text(raw)) => Some(FieldValue::List(parse_tags(&raw))),
        (FieldType::Dropdown, Interaction::Select(choice)) => {
            Some(FieldValue::Text(choice.unwrap_or_default()))
        }
        (FieldType::Checkboxes, Interaction::Toggle { option, checked }) => {
            // A non-list prior value counts as nothing checked
            let mut items: Vec<String> = current
                .and_then(FieldValue::as_list)
                .map(<[String]>::to_vec)
                .unwrap_or_default();

            if checked {
                if !items.contains(&option) {
                    items.push(option);
                }
            } else {
                items.retain(|item| item != &option);
            }
            Some(FieldValue::List(items))
        }
        (FieldType::MultipleChoice, Interaction::Choose(option)) => Some(FieldValue::Text(option)),
        _ => None,
    }
}

/// Split on commas, trim each piece, drop empty pieces.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `option` is checked in a checkbox value.
pub fn is_checked(current: Option<&FieldValue>, option: &str) -> bool {
    current
        .and_then(FieldValue::as_list)
        .map_or(false, |items| items.iter().any(|item| item == option))
}
