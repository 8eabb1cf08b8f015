//! Audit fields shared by persisted entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who created and last touched a record, and when.
///
/// Embedded (flattened) into every persisted entity so that the JSON shape
/// carries `created_at`, `updated_at`, `created_by` and `updated_by` at the
/// top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
    /// Email of the actor that created the record.
    pub created_by: String,
    /// Email of the actor that last updated the record.
    pub updated_by: String,
}

impl Audit {
    /// Stamps a freshly created record on behalf of `actor` at `at`.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::Audit;
    /// use chrono::Utc;
    ///
    /// let now = Utc::now();
    /// let audit = Audit::created_by("admin@example.com", now);
    /// assert_eq!(audit.created_by, audit.updated_by);
    /// assert_eq!(audit.created_at, audit.updated_at);
    /// ```
    pub fn created_by(actor: &str, at: DateTime<Utc>) -> Self {
        Self {
            created_at: at,
            updated_at: at,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
        }
    }

    /// Returns a copy touched by `actor` at `at`, keeping the creation fields.
    pub fn touched_by(&self, actor: &str, at: DateTime<Utc>) -> Self {
        Self {
            created_at: self.created_at,
            updated_at: at,
            created_by: self.created_by.clone(),
            updated_by: actor.to_string(),
        }
    }
}
