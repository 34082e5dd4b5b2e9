//! Persisted records and their view models.
//!
//! # Design
//! Records are plain structs. Constraints that the document store would
//! otherwise enforce implicitly live in an explicit `validate` method that the
//! persistence service calls before every write. View models are separate
//! types built with `From`, so internal-only fields never reach the wire.

pub mod todo;
pub mod user;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::filter::Filter;

pub use todo::{Todo, TodoFields, TodoLevel, TodoVm};
pub use user::{User, UserFields, UserRole, UserVm};

/// A field constraint violated by a record about to be written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} {value} already exists")]
    Duplicate { field: &'static str, value: String },
}

/// A record the persistence service can store, filter and validate.
///
/// Records serialize to their stored JSON shape; filters are evaluated against
/// that shape, so field names in a `Filter` use the wire (camelCase) spelling.
pub trait Document: Clone + Serialize + Send + Sync + 'static {
    /// The mutable fields supplied on create and update.
    type Fields: Send;

    /// Model name used for operation ids and documentation tags.
    const MODEL_NAME: &'static str;

    fn id(&self) -> Uuid;

    /// Builds a fresh record from caller-supplied fields.
    fn from_fields(id: Uuid, fields: Self::Fields, now: DateTime<Utc>) -> Self;

    /// Overwrites the mutable fields and refreshes `updatedAt`.
    fn apply(&mut self, fields: Self::Fields, now: DateTime<Utc>);

    fn validate(&self) -> Result<(), ValidationError>;

    /// Stored records must match this filter to accept an update; the rest
    /// are frozen. The store evaluates it inside its write.
    fn updatable() -> Filter {
        Filter::All
    }

    /// Fields whose values must be unique across the collection.
    fn unique_fields(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }
}

pub(crate) fn require_min_chars(
    field: &'static str,
    value: &str,
    min: usize,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }
    if value.chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}
