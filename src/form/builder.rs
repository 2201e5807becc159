//! Form editing session: field list, entered values, validation and submission

use chrono::{DateTime, SubsecRound, Utc};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};

use crate::errors::{FormError, ValidationError};
use crate::form::input::{self, Interaction};
use crate::models::{Field, FieldId, FieldType, FieldValue, FormSubmission};
use crate::storage::{self, KeyValueStore};

pub const DEFAULT_TITLE: &str = "Untitled Form";

/// Monotonic field id counter owned by one editing session. Ids are never reused.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: FieldId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter that starts after the largest id in `fields`.
    pub fn starting_after(fields: &[Field]) -> Self {
        let next = fields.iter().map(|f| f.id).max().map_or(1, |max| max + 1);
        Self { next }
    }

    pub fn next_id(&mut self) -> FieldId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Result of a submit attempt that reached storage.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Required fields were missing; nothing was written
    Blocked(ValidationError),
    /// The record was saved in front of the existing list
    Persisted(FormSubmission),
}

/// State of one form editing session.
#[derive(Debug, Clone)]
pub struct FormBuilder {
    ids: IdAllocator,
    title: String,
    fields: Vec<Field>,
    submission_data: BTreeMap<FieldId, FieldValue>,
    errors: BTreeSet<FieldId>,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self {
            ids: IdAllocator::new(),
            title: DEFAULT_TITLE.to_string(),
            fields: Vec::new(),
            submission_data: BTreeMap::new(),
            errors: BTreeSet::new(),
        }
    }
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session pre-populated with `fields`. Repeated ids get fresh ones.
    pub fn from_template(fields: Vec<Field>) -> Self {
        let mut ids = IdAllocator::starting_after(&fields);
        let mut seen = HashSet::new();
        let fields = fields
            .into_iter()
            .map(|mut field| {
                if !seen.insert(field.id) {
                    field.id = ids.next_id();
                    seen.insert(field.id);
                }
                field
            })
            .collect::<Vec<_>>();

        debug!("Starting form session from template with {} fields", fields.len());
        Self {
            ids,
            fields,
            ..Self::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Append a new field of `field_type` with default label and options.
    pub fn add_field(&mut self, field_type: FieldType) -> FieldId {
        let id = self.ids.next_id();
        debug!("Adding {} field #{}", field_type.as_str(), id);
        self.fields.push(Field::new(id, field_type));
        id
    }

    /// Replace the field with the same id. Returns false if there is none.
    pub fn update_field(&mut self, updated: Field) -> bool {
        match self.fields.iter_mut().find(|f| f.id == updated.id) {
            Some(field) => {
                *field = updated;
                true
            }
            None => false,
        }
    }

    /// Remove the field with `id`. Its entered value, if any, stays in the submission map.
    pub fn delete_field(&mut self, id: FieldId) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.id != id);
        self.errors.remove(&id);
        self.fields.len() != before
    }

    /// Move the field with `id` one slot up (`-1`) or down (`1`).
    pub fn move_field(&mut self, id: FieldId, delta: isize) -> bool {
        let Some(index) = self.fields.iter().position(|f| f.id == id) else {
            return false;
        };
        let target = index as isize + delta;
        if target < 0 || target >= self.fields.len() as isize {
            return false;
        }
        self.fields.swap(index, target as usize);
        true
    }

    /// Set the entered value for `id`, overwriting any previous one.
    pub fn record_input(&mut self, id: FieldId, value: FieldValue) {
        self.submission_data.insert(id, value);
    }

    /// Run `interaction` against the field's change rules and record the result.
    /// Returns false if the field is missing or the interaction yields no value.
    pub fn interact(&mut self, id: FieldId, interaction: Interaction) -> bool {
        let Some(field) = self.field(id) else {
            return false;
        };

        match input::apply(field, self.submission_data.get(&id), interaction) {
            Some(value) => {
                self.record_input(id, value);
                true
            }
            None => false,
        }
    }

    pub fn value(&self, id: FieldId) -> Option<&FieldValue> {
        self.submission_data.get(&id)
    }

    pub fn submission_data(&self) -> &BTreeMap<FieldId, FieldValue> {
        &self.submission_data
    }

    pub fn errors(&self) -> &BTreeSet<FieldId> {
        &self.errors
    }

    pub fn has_error(&self, id: FieldId) -> bool {
        self.errors.contains(&id)
    }

    /// Check every required interactive field for a non-empty value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: BTreeSet<FieldId> = self
            .fields
            .iter()
            .filter(|f| f.required && f.field_type.is_interactive())
            .filter(|f| self.value(f.id).map_or(true, FieldValue::is_empty))
            .map(|f| f.id)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Validate and build the submission record. On failure the error set is populated
    /// and no record is produced; on success the error set is cleared.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<FormSubmission, ValidationError> {
        if let Err(err) = self.validate() {
            info!("Submission blocked: {} required field(s) empty", err.missing.len());
            self.errors = err.missing.clone();
            return Err(err);
        }

        self.errors.clear();
        let now = now.trunc_subsecs(3);
        Ok(FormSubmission {
            id: now.timestamp_millis(),
            title: self.title.clone(),
            timestamp: now,
            data: self.submission_data.clone(),
            fields: self.fields.clone(),
        })
    }

    /// Submit and, when validation passes, prepend the record to the persisted list.
    pub async fn submit_and_persist<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, FormError> {
        match self.submit(now) {
            Err(err) => Ok(SubmitOutcome::Blocked(err)),
            Ok(record) => {
                storage::prepend_record(store, &record).await?;
                info!("Saved submission {} '{}'", record.id, record.title);
                Ok(SubmitOutcome::Persisted(record))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{load_records, MemoryStore};
    use chrono::TimeZone;

    #[test]
    fn test_add_dropdown_twice_gives_distinct_ids() {
        let mut form = FormBuilder::new();
        let a = form.add_field(FieldType::Dropdown);
        let b = form.add_field(FieldType::Dropdown);

        assert_ne!(a, b);
        for field in form.fields() {
            assert_eq!(field.options, vec!["Option 1", "Option 2"]);
            assert!(!field.required);
        }
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut form = FormBuilder::new();
        let a = form.add_field(FieldType::Text);
        assert!(form.delete_field(a));
        let b = form.add_field(FieldType::Text);
        assert!(b > a);
        assert!(!form.delete_field(a));
    }

    #[test]
    fn test_update_replaces_only_matching_field() {
        let mut form = FormBuilder::new();
        let a = form.add_field(FieldType::Text);
        let b = form.add_field(FieldType::Number);
        form.record_input(b, FieldValue::Text("42".to_string()));

        let renamed = form.field(a).unwrap().clone().with_label("Full name");
        assert!(form.update_field(renamed));
        assert_eq!(form.field(a).unwrap().label, "Full name");
        assert_eq!(form.field(b).unwrap().label, "Number Label");
        assert_eq!(form.value(b), Some(&FieldValue::Text("42".to_string())));

        assert!(!form.update_field(Field::new(99, FieldType::Text)));
        assert_eq!(form.fields().len(), 2);
    }

    #[test]
    fn test_delete_leaves_orphaned_value() {
        let mut form = FormBuilder::new();
        let a = form.add_field(FieldType::Text);
        form.record_input(a, FieldValue::Text("kept".to_string()));
        form.delete_field(a);

        assert!(form.fields().is_empty());
        assert!(form.value(a).is_some());
    }

    #[test]
    fn test_move_field() {
        let mut form = FormBuilder::new();
        let a = form.add_field(FieldType::Header);
        let b = form.add_field(FieldType::Text);

        assert!(form.move_field(b, -1));
        assert_eq!(form.fields()[0].id, b);
        assert!(!form.move_field(b, -1));
        assert!(!form.move_field(a, 1));
    }

    #[test]
    fn test_template_ids_stay_unique() {
        let template = vec![
            Field::new(5, FieldType::Text),
            Field::new(5, FieldType::Number),
            Field::new(2, FieldType::Tags),
        ];
        let mut form = FormBuilder::from_template(template);
        let added = form.add_field(FieldType::Text);

        let ids: BTreeSet<FieldId> = form.fields().iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), 4);
        assert!(added > 5);
        assert_eq!(form.title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_required_text_without_value_blocks_submit() {
        let mut form = FormBuilder::new();
        let id = form.add_field(FieldType::Text);
        let required = form.field(id).unwrap().clone().with_required(true);
        form.update_field(required);

        let err = form.submit(Utc::now()).unwrap_err();
        assert!(err.contains(id));
        assert!(form.has_error(id));
    }

    #[test]
    fn test_empty_list_counts_as_missing() {
        let mut form = FormBuilder::new();
        let id = form.add_field(FieldType::Checkboxes);
        form.update_field(form.field(id).unwrap().clone().with_required(true));
        form.record_input(id, FieldValue::List(vec![]));

        assert!(form.validate().is_err());

        form.interact(
            id,
            Interaction::Toggle { option: "Option 1".to_string(), checked: true },
        );
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_required_static_fields_are_not_validated() {
        let mut form = FormBuilder::new();
        let id = form.add_field(FieldType::Header);
        form.update_field(form.field(id).unwrap().clone().with_required(true));

        assert!(form.validate().is_ok());
        assert!(!form.interact(id, Interaction::Text("x".to_string())));
        assert!(form.value(id).is_none());
    }

    #[test]
    fn test_successful_submit_clears_errors() {
        let mut form = FormBuilder::new();
        let id = form.add_field(FieldType::Text);
        form.update_field(form.field(id).unwrap().clone().with_required(true));
        assert!(form.submit(Utc::now()).is_err());

        form.interact(id, Interaction::Text("Ada".to_string()));
        let now = Utc::now();
        let record = form.submit(now).unwrap();

        assert!(form.errors().is_empty());
        assert_eq!(record.id, now.timestamp_millis());
        assert_eq!(record.title, DEFAULT_TITLE);
        assert_eq!(&record.data, form.submission_data());
        assert_eq!(record.fields, form.fields());
    }

    #[tokio::test]
    async fn test_blocked_submit_persists_nothing() {
        let store = MemoryStore::new();
        let mut form = FormBuilder::new();
        let id = form.add_field(FieldType::Text);
        form.update_field(form.field(id).unwrap().clone().with_required(true));

        let outcome = form.submit_and_persist(&store, Utc::now()).await.unwrap();
        match outcome {
            SubmitOutcome::Blocked(err) => assert!(err.contains(id)),
            other => panic!("expected a blocked submit, got {:?}", other),
        }
        assert!(load_records(&store).await.unwrap().is_empty());
    }

    #[test]
    fn test_record_timestamp_is_truncated_to_millis() {
        let mut form = FormBuilder::new();
        let now = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let record = form.submit(now).unwrap();

        assert_eq!(record.id, 1_700_000_000_123);
        assert_eq!(record.timestamp.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(record.timestamp.timestamp_millis(), record.id);
    }

    #[tokio::test]
    async fn test_unreadable_history_survives_a_submit() {
        let store = MemoryStore::new();
        let raw = r#"[{"id":1,"title":"Old A","timestamp":"2024-01-01T00:00:00.000Z","data":{"1":5},"fields":[]}]"#;
        store.set(storage::RECENT_FORMS_KEY, raw).await.unwrap();

        let mut form = FormBuilder::new();
        form.add_field(FieldType::Text);
        let result = form.submit_and_persist(&store, Utc::now()).await;

        assert!(matches!(result, Err(FormError::Corrupt { .. })));
        assert_eq!(
            store.get(storage::RECENT_FORMS_KEY).await.unwrap().as_deref(),
            Some(raw)
        );
    }

    #[tokio::test]
    async fn test_persisted_record_is_a_snapshot() {
        let store = MemoryStore::new();
        let mut form = FormBuilder::new();
        form.set_title("Signup");
        let name = form.add_field(FieldType::Text);
        form.update_field(form.field(name).unwrap().clone().with_required(true));
        form.interact(name, Interaction::Text("Ada".to_string()));

        let outcome = form.submit_and_persist(&store, Utc::now()).await.unwrap();
        let SubmitOutcome::Persisted(record) = outcome else {
            panic!("expected the record to be persisted");
        };

        // Later edits to the live form must not touch the stored record
        form.update_field(form.field(name).unwrap().clone().with_label("Changed"));
        form.delete_field(name);

        let records = load_records(&store).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], record);
        assert_eq!(records[0].fields[0].label, "Text Label");
        assert_eq!(records[0].title, "Signup");
        assert_eq!(
            records[0].value_for(name),
            Some(&FieldValue::Text("Ada".to_string()))
        );
    }
}
