//! Error types for the form builder

use std::collections::BTreeSet;

use thiserror::Error;

use crate::models::{FieldId, SubmissionId};

/// Required fields left empty at submit time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Please fill all required fields.")]
pub struct ValidationError {
    pub missing: BTreeSet<FieldId>,
}

impl ValidationError {
    pub fn contains(&self, id: FieldId) -> bool {
        self.missing.contains(&id)
    }
}

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Submission {0} not found. Run 'formbuilder list' to see saved submissions")]
    SubmissionNotFound(SubmissionId),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Failed to serialize value for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Stored value for key '{key}' is unreadable, not overwriting it: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
