//! Document store seam.
//!
//! # Design
//! The persistence service talks to storage only through `DocumentStore`, so
//! the driver can be swapped (or replaced with a failing stub in tests).
//! `MemoryStore` keeps documents in insertion order behind a
//! `tokio::sync::RwLock`; the lock is the single serialization point for
//! concurrent writes.
//!
//! Drivers enforce two write-time constraints inside their own critical
//! section, the way a document database does with a unique index and a
//! filtered update:
//! - `insert` and `replace` reject a document whose `unique_fields` collide
//!   with another stored document.
//! - `replace` only overwrites a stored document that still matches the
//!   caller's guard filter.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{filter::Filter, model::Document};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} already exists")]
    DuplicateKey(Uuid),

    #[error("{field} {value} already exists")]
    UniqueViolation { field: &'static str, value: String },

    /// The stored document no longer matches the guard given to `replace`.
    #[error("document {0} does not match the update guard")]
    GuardFailed(Uuid),

    #[error("failed to project document: {0}")]
    Projection(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DocumentStore<T: Document>: Send + Sync {
    async fn insert(&self, doc: T) -> Result<T, StoreError>;

    /// All documents matching `filter`, in insertion order.
    async fn find(&self, filter: &Filter) -> Result<Vec<T>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError>;

    /// Replaces the document with the same id, provided the stored version
    /// matches `guard`. `None` if it does not exist.
    async fn replace(&self, doc: T, guard: &Filter) -> Result<Option<T>, StoreError>;

    /// Removes and returns the document. `None` if it does not exist.
    async fn remove(&self, id: Uuid) -> Result<Option<T>, StoreError>;
}

pub struct MemoryStore<T> {
    docs: RwLock<Vec<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for MemoryStore<T> {
    async fn insert(&self, doc: T) -> Result<T, StoreError> {
        let mut docs = self.docs.write().await;
        if docs.iter().any(|d| d.id() == doc.id()) {
            return Err(StoreError::DuplicateKey(doc.id()));
        }
        check_unique(&docs, &doc)?;
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        let docs = self.docs.read().await;
        if *filter == Filter::All {
            return Ok(docs.clone());
        }
        let mut found = Vec::new();
        for doc in docs.iter() {
            if filter.matches(&serde_json::to_value(doc)?) {
                found.push(doc.clone());
            }
        }
        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|d| d.id() == id).cloned())
    }

    async fn replace(&self, doc: T, guard: &Filter) -> Result<Option<T>, StoreError> {
        let mut docs = self.docs.write().await;
        let Some(index) = docs.iter().position(|d| d.id() == doc.id()) else {
            return Ok(None);
        };
        if !guard.matches(&serde_json::to_value(&docs[index])?) {
            return Err(StoreError::GuardFailed(doc.id()));
        }
        check_unique(&docs, &doc)?;
        docs[index] = doc.clone();
        Ok(Some(doc))
    }

    async fn remove(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let mut docs = self.docs.write().await;
        let Some(index) = docs.iter().position(|d| d.id() == id) else {
            return Ok(None);
        };
        Ok(Some(docs.remove(index)))
    }
}

/// Fails if another document already holds one of `doc`'s unique values.
fn check_unique<T: Document>(docs: &[T], doc: &T) -> Result<(), StoreError> {
    for (field, value) in doc.unique_fields() {
        let taken = docs
            .iter()
            .filter(|other| other.id() != doc.id())
            .any(|other| other.unique_fields().contains(&(field, value.clone())));
        if taken {
            let value = value.as_str().map_or_else(|| value.to_string(), str::to_string);
            return Err(StoreError::UniqueViolation { field, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::{Todo, TodoFields, TodoLevel, User, UserFields, UserRole};

    fn todo(content: &str, level: TodoLevel) -> Todo {
        Todo::from_fields(
            Uuid::new_v4(),
            TodoFields::new(content, Some(level)),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn find_returns_insertion_order() {
        let store = MemoryStore::<Todo>::new();
        for name in ["a", "b", "c"] {
            store.insert(todo(name, TodoLevel::Low)).await.unwrap();
        }

        let all = store.find(&Filter::All).await.unwrap();
        let names: Vec<_> = all.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let store = MemoryStore::<Todo>::new();
        let doc = todo("a", TodoLevel::Low);
        store.insert(doc.clone()).await.unwrap();

        let err = store.insert(doc).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn find_applies_filter() {
        let store = MemoryStore::<Todo>::new();
        store.insert(todo("a", TodoLevel::Low)).await.unwrap();
        store.insert(todo("b", TodoLevel::High)).await.unwrap();

        let high = store.find(&Filter::eq("level", "High")).await.unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].content, "b");
    }

    #[tokio::test]
    async fn replace_and_remove_missing_return_none() {
        let store = MemoryStore::<Todo>::new();
        let doc = todo("a", TodoLevel::Low);

        assert!(store.replace(doc.clone(), &Filter::All).await.unwrap().is_none());
        assert!(store.remove(doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_returns_the_document() {
        let store = MemoryStore::<Todo>::new();
        let doc = store.insert(todo("a", TodoLevel::Low)).await.unwrap();

        let removed = store.remove(doc.id).await.unwrap();
        assert_eq!(removed, Some(doc.clone()));
        assert!(store.find_by_id(doc.id).await.unwrap().is_none());
    }

    fn user(name: &str) -> User {
        User::from_fields(
            Uuid::new_v4(),
            UserFields {
                user: name.to_string(),
                password: "secret1".to_string(),
                role: UserRole::User,
                first_name: None,
                last_name: None,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn insert_enforces_unique_fields() {
        let store = MemoryStore::<User>::new();
        store.insert(user("johndoe")).await.unwrap();

        let err = store.insert(user("johndoe")).await.unwrap_err();

        assert!(matches!(
            err,
            StoreError::UniqueViolation { field: "user", ref value } if value == "johndoe"
        ));
        assert_eq!(store.find(&Filter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replace_enforces_unique_fields_against_other_documents() {
        let store = MemoryStore::<User>::new();
        store.insert(user("johndoe")).await.unwrap();
        let mut other = store.insert(user("janedoe")).await.unwrap();

        // Keeping its own name is fine.
        assert!(store.replace(other.clone(), &Filter::All).await.unwrap().is_some());

        other.user = "johndoe".to_string();
        let err = store.replace(other, &Filter::All).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { field: "user", .. }));
    }

    #[tokio::test]
    async fn replace_only_overwrites_documents_matching_the_guard() {
        let store = MemoryStore::<Todo>::new();
        let mut doc = store.insert(todo("a", TodoLevel::Low)).await.unwrap();
        let open = Filter::eq("isCompleted", false);

        doc.is_completed = true;
        assert!(store.replace(doc.clone(), &open).await.unwrap().is_some());

        doc.content = "changed".to_string();
        let err = store.replace(doc.clone(), &open).await.unwrap_err();
        assert!(matches!(err, StoreError::GuardFailed(id) if id == doc.id));

        let stored = store.find_by_id(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "a");
    }
}
