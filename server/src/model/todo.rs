use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Document, ValidationError};
use crate::filter::Filter;

/// Priority of a todo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TodoLevel {
    Low,
    #[default]
    Normal,
    High,
}

impl TodoLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            TodoLevel::Low => "Low",
            TodoLevel::Normal => "Normal",
            TodoLevel::High => "High",
        }
    }
}

/// A stored todo record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub content: String,
    pub level: TodoLevel,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-controlled part of a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoFields {
    pub content: String,
    pub level: TodoLevel,
    pub is_completed: bool,
}

impl TodoFields {
    /// Fields for a brand-new todo: level defaults to `Normal`, never completed.
    pub fn new(content: impl Into<String>, level: Option<TodoLevel>) -> Self {
        Self {
            content: content.into(),
            level: level.unwrap_or_default(),
            is_completed: false,
        }
    }
}

impl Document for Todo {
    type Fields = TodoFields;

    const MODEL_NAME: &'static str = "Todo";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_fields(id: Uuid, fields: TodoFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            content: fields.content,
            level: fields.level,
            is_completed: fields.is_completed,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, fields: TodoFields, now: DateTime<Utc>) {
        self.content = fields.content;
        self.level = fields.level;
        self.is_completed = fields.is_completed;
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::Required { field: "content" });
        }
        Ok(())
    }

    /// A completed todo is frozen.
    fn updatable() -> Filter {
        Filter::eq("isCompleted", false)
    }
}

/// Todo as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoVm {
    pub id: Uuid,
    pub content: String,
    pub level: TodoLevel,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for TodoVm {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            content: todo.content,
            level: todo.level,
            is_completed: todo.is_completed,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(content: &str) -> Todo {
        Todo::from_fields(Uuid::new_v4(), TodoFields::new(content, None), Utc::now())
    }

    #[test]
    fn new_fields_default_to_normal_and_open() {
        let fields = TodoFields::new("buy milk", None);
        assert_eq!(fields.level, TodoLevel::Normal);
        assert!(!fields.is_completed);
    }

    #[test]
    fn blank_content_fails_validation() {
        assert_eq!(
            todo("   ").validate(),
            Err(ValidationError::Required { field: "content" })
        );
        assert!(todo("buy milk").validate().is_ok());
    }

    #[test]
    fn apply_keeps_identity_and_creation_time() {
        let mut record = todo("buy milk");
        let (id, created_at) = (record.id, record.created_at);
        let later = created_at + chrono::Duration::seconds(5);

        record.apply(
            TodoFields {
                content: "buy bread".to_string(),
                level: TodoLevel::High,
                is_completed: true,
            },
            later,
        );

        assert_eq!(record.id, id);
        assert_eq!(record.created_at, created_at);
        assert_eq!(record.updated_at, later);
        assert_eq!(record.content, "buy bread");
        assert!(record.is_completed);
    }

    #[test]
    fn todo_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(todo("Test")).unwrap();
        assert_eq!(json["content"], "Test");
        assert_eq!(json["level"], "Normal");
        assert_eq!(json["isCompleted"], false);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn only_open_todos_are_updatable() {
        let mut record = todo("buy milk");
        let guard = Todo::updatable();
        assert!(guard.matches(&serde_json::to_value(&record).unwrap()));

        record.is_completed = true;
        assert!(!guard.matches(&serde_json::to_value(&record).unwrap()));
    }
}
