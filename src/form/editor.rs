//! Edits to a single field's own metadata (label, required flag, options)
//!
//! These never change a field's id or type. Callers hand the edited copy back to
//! [`FormBuilder::update_field`](crate::form::FormBuilder::update_field).

use crate::models::Field;

pub fn set_label(field: &mut Field, label: &str) {
    field.label = label.to_string();
}

pub fn toggle_required(field: &mut Field) {
    field.required = !field.required;
}

/// Append "Option N". Returns the new option's index, or `None` for variants without options.
pub fn add_option(field: &mut Field) -> Option<usize> {
    if !field.field_type.has_options() {
        return None;
    }
    field.options.push(format!("Option {}", field.options.len() + 1));
    Some(field.options.len() - 1)
}

pub fn rename_option(field: &mut Field, index: usize, name: &str) -> bool {
    if !field.field_type.has_options() {
        return false;
    }
    match field.options.get_mut(index) {
        Some(option) => {
            *option = name.to_string();
            true
        }
        None => false,
    }
}

pub fn remove_option(field: &mut Field, index: usize) -> bool {
    if !field.field_type.has_options() || index >= field.options.len() {
        return false;
    }
    field.options.remove(index);
    true
}
