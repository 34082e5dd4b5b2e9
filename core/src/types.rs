//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the server's view models but are defined independently
//! so the client does not link axum. The live-server integration test catches
//! schema drift between the two crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
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

/// A todo as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub content: String,
    pub level: TodoLevel,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a todo. The server defaults `level` to
/// `Normal` when it is omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<TodoLevel>,
}

/// Request payload for replacing a todo. Every mutable field is sent; a
/// completed todo can no longer be updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub id: Uuid,
    pub content: String,
    pub level: TodoLevel,
    pub is_completed: bool,
}

impl From<&Todo> for UpdateTodo {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            content: todo.content.clone(),
            level: todo.level,
            is_completed: todo.is_completed,
        }
    }
}

/// Filters for listing todos. Empty `levels` means any level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoQuery {
    pub levels: Vec<TodoLevel>,
    pub is_completed: Option<bool>,
}

impl TodoQuery {
    /// Query string including the leading `?`, or empty when unfiltered.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<String> = self
            .levels
            .iter()
            .map(|level| format!("level={}", level.as_str()))
            .collect();
        if let Some(done) = self.is_completed {
            pairs.push(format!("isCompleted={done}"));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

/// Request payload for registering a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub user: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// A user as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub user: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
}

/// Error body sent by the server with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiException {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}
