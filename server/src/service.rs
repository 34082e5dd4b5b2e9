//! Persistence service: create/read/update/delete over a document store.
//!
//! # Design
//! `Service<T>` is generic over any `Document`. It owns its store through a
//! trait object passed in at construction, runs each record's validation
//! before writing, and projects records into view models with `map`/`map_all`.
//! Handlers never reach the store directly.
//!
//! Unique fields and the frozen-record rule are enforced by the store inside
//! its write, so concurrent requests cannot both pass a check and then both
//! write. The service translates those store refusals back into domain errors.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    filter::Filter,
    model::{Document, Todo, User, ValidationError},
    store::{DocumentStore, MemoryStore, StoreError},
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} Not found")]
    NotFound(Uuid),

    /// The record no longer accepts updates.
    #[error("{0} can no longer be modified")]
    Frozen(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type TodoService = Service<Todo>;
pub type UserService = Service<User>;

pub struct Service<T: Document> {
    store: Arc<dyn DocumentStore<T>>,
}

impl<T: Document> Service<T> {
    pub fn new(store: Arc<dyn DocumentStore<T>>) -> Self {
        Self { store }
    }

    /// A service backed by a fresh `MemoryStore`.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn create(&self, fields: T::Fields) -> Result<T, ServiceError> {
        let doc = T::from_fields(Uuid::new_v4(), fields, Utc::now());
        doc.validate()?;
        self.store.insert(doc).await.map_err(write_error)
    }

    pub async fn find_all(&self, filter: &Filter) -> Result<Vec<T>, ServiceError> {
        Ok(self.store.find(filter).await?)
    }

    /// `Ok(None)` when nothing has this id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, ServiceError> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn update(&self, id: Uuid, fields: T::Fields) -> Result<T, ServiceError> {
        let mut doc = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;
        let guard = T::updatable();
        if !guard.matches(&serde_json::to_value(&doc).map_err(StoreError::from)?) {
            return Err(ServiceError::Frozen(id));
        }
        doc.apply(fields, Utc::now());
        doc.validate()?;
        self.store
            .replace(doc, &guard)
            .await
            .map_err(write_error)?
            .ok_or(ServiceError::NotFound(id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<T, ServiceError> {
        self.store
            .remove(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn map<V: From<T>>(&self, doc: T) -> V {
        V::from(doc)
    }

    pub fn map_all<V: From<T>>(&self, docs: Vec<T>) -> Vec<V> {
        docs.into_iter().map(V::from).collect()
    }
}

fn write_error(err: StoreError) -> ServiceError {
    match err {
        StoreError::UniqueViolation { field, value } => {
            ValidationError::Duplicate { field, value }.into()
        }
        StoreError::GuardFailed(id) => ServiceError::Frozen(id),
        other => other.into(),
    }
}

impl Service<User> {
    pub async fn find_by_username(&self, user: &str) -> Result<Option<User>, ServiceError> {
        let mut found = self.store.find(&Filter::eq("user", user)).await?;
        Ok(found.pop())
    }
}
