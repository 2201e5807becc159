use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::FormError;
use crate::models::{Field, FormSubmission, SubmissionId};

/// Key holding the persisted submissions, newest first.
pub const RECENT_FORMS_KEY: &str = "recentForms";

/// Key holding a field list that pre-populates the next new form. Consumed once.
pub const TEMPLATE_KEY: &str = "templateForm";

/// Key-value string store standing in for browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, FormError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), FormError>;

    async fn remove(&self, key: &str) -> Result<(), FormError>;
}

/// SQLite-backed store with a single `kv` table.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(database_path: &str) -> Result<Self, FormError> {
        // Create database if it doesn't exist
        if !Path::new(database_path).exists() {
            std::fs::File::create(database_path)?;
        }

        let database_url = format!("sqlite://{}", database_path);
        let pool = SqlitePool::connect(&database_url).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        debug!("Opened key-value store at {}", database_path);
        Ok(SqliteStore { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, FormError> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), FormError> {
        sqlx::query("INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), FormError> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-process store, lost when dropped.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, FormError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), FormError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), FormError> {
        self.lock().remove(key);
        Ok(())
    }
}

fn to_json<T: serde::Serialize + ?Sized>(key: &str, value: &T) -> Result<String, FormError> {
    serde_json::to_string(value).map_err(|source| FormError::Serialization {
        key: key.to_string(),
        source,
    })
}

/// Load persisted submissions, newest first. Absent or unreadable data yields an empty list.
pub async fn load_records<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Vec<FormSubmission>, FormError> {
    let Some(raw) = store.get(RECENT_FORMS_KEY).await? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(&raw) {
        Ok(records) => Ok(records),
        Err(e) => {
            warn!("Ignoring unreadable '{}' entry: {}", RECENT_FORMS_KEY, e);
            Ok(Vec::new())
        }
    }
}

/// Read the full list, put `record` in front, write the full list back.
/// An unreadable stored list is an error and is left untouched.
pub async fn prepend_record<S: KeyValueStore + ?Sized>(
    store: &S,
    record: &FormSubmission,
) -> Result<(), FormError> {
    let mut records: Vec<FormSubmission> = match store.get(RECENT_FORMS_KEY).await? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| FormError::Corrupt {
            key: RECENT_FORMS_KEY.to_string(),
            source,
        })?,
        None => Vec::new(),
    };
    records.insert(0, record.clone());

    let json = to_json(RECENT_FORMS_KEY, &records)?;
    store.set(RECENT_FORMS_KEY, &json).await?;

    debug!("Persisted submission {} ({} total)", record.id, records.len());
    Ok(())
}

pub async fn find_record<S: KeyValueStore + ?Sized>(
    store: &S,
    id: SubmissionId,
) -> Result<Option<FormSubmission>, FormError> {
    let records = load_records(store).await?;
    Ok(records.into_iter().find(|r| r.id == id))
}

pub async fn clear_records<S: KeyValueStore + ?Sized>(store: &S) -> Result<(), FormError> {
    store.remove(RECENT_FORMS_KEY).await
}

/// Store a field list for the next new form to start from.
pub async fn save_template<S: KeyValueStore + ?Sized>(
    store: &S,
    fields: &[Field],
) -> Result<(), FormError> {
    let json = to_json(TEMPLATE_KEY, fields)?;
    store.set(TEMPLATE_KEY, &json).await
}

/// Read and clear the template key. Malformed templates are dropped.
pub async fn take_template<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Option<Vec<Field>>, FormError> {
    let Some(raw) = store.get(TEMPLATE_KEY).await? else {
        return Ok(None);
    };
    store.remove(TEMPLATE_KEY).await?;

    match serde_json::from_str(&raw) {
        Ok(fields) => Ok(Some(fields)),
        Err(e) => {
            warn!("Discarding unreadable '{}' entry: {}", TEMPLATE_KEY, e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldType, FieldValue};
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn record(id: SubmissionId, title: &str) -> FormSubmission {
        let mut data = BTreeMap::new();
        data.insert(1, FieldValue::Text("Ada".to_string()));
        FormSubmission {
            id,
            title: title.to_string(),
            timestamp: Utc::now(),
            data,
            fields: vec![Field::new(1, FieldType::Text).with_label("Name")],
        }
    }

    #[tokio::test]
    async fn test_prepend_keeps_newest_first() {
        let store = MemoryStore::new();
        prepend_record(&store, &record(1, "first")).await.unwrap();
        prepend_record(&store, &record(2, "second")).await.unwrap();

        let records = load_records(&store).await.unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);

        let found = find_record(&store, 1).await.unwrap().unwrap();
        assert_eq!(found.title, "first");
        assert!(find_record(&store, 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_records_degrade_to_empty() {
        let store = MemoryStore::new();
        store.set(RECENT_FORMS_KEY, "{not json").await.unwrap();
        assert!(load_records(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prepend_refuses_to_overwrite_unreadable_list() {
        let store = MemoryStore::new();
        let raw = r#"[{"id":2,"title":"Old B","timestamp":"2024-01-02T00:00:00.000Z","data":{"1":5},"fields":[]},{"id":1,"title":"Old A","timestamp":"2024-01-01T00:00:00.000Z","data":{},"fields":[]}]"#;
        store.set(RECENT_FORMS_KEY, raw).await.unwrap();

        let err = prepend_record(&store, &record(3, "new")).await.unwrap_err();
        assert!(matches!(err, FormError::Corrupt { ref key, .. } if key == RECENT_FORMS_KEY));
        assert_eq!(store.get(RECENT_FORMS_KEY).await.unwrap().as_deref(), Some(raw));

        // Reading still degrades to an empty list
        assert!(load_records(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_template_is_consumed_once() {
        let store = MemoryStore::new();
        let fields = vec![Field::new(4, FieldType::Dropdown)];
        save_template(&store, &fields).await.unwrap();

        assert_eq!(take_template(&store).await.unwrap(), Some(fields));
        assert_eq!(take_template(&store).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_template_is_cleared() {
        let store = MemoryStore::new();
        store.set(TEMPLATE_KEY, "[{\"id\":").await.unwrap();

        assert_eq!(take_template(&store).await.unwrap(), None);
        assert!(store.get(TEMPLATE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_store_persists_between_connections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("forms.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteStore::new(path).await.unwrap();
            prepend_record(&store, &record(10, "saved")).await.unwrap();
            store.set("scratch", "one").await.unwrap();
            store.set("scratch", "two").await.unwrap();
        }

        let store = SqliteStore::new(path).await.unwrap();
        let records = load_records(&store).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 10);
        assert_eq!(store.get("scratch").await.unwrap().as_deref(), Some("two"));

        clear_records(&store).await.unwrap();
        assert!(load_records(&store).await.unwrap().is_empty());
    }
}
