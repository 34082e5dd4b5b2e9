use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{require_min_chars, Document, ValidationError};

pub const MIN_USER_LEN: usize = 6;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::User => "User",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            _ => Err(s.to_string()),
        }
    }
}

/// A stored user record. `password` is kept as supplied; hashing belongs to
/// the authentication strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub user: String,
    pub password: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// First and last name joined by a single space. Absent parts are
    /// rendered empty, so the separator is always present.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserFields {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Document for User {
    type Fields = UserFields;

    const MODEL_NAME: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_fields(id: Uuid, fields: UserFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user: fields.user,
            password: fields.password,
            role: fields.role,
            first_name: fields.first_name,
            last_name: fields.last_name,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, fields: UserFields, now: DateTime<Utc>) {
        self.user = fields.user;
        self.password = fields.password;
        self.role = fields.role;
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_min_chars("user", &self.user, MIN_USER_LEN)?;
        require_min_chars("password", &self.password, MIN_PASSWORD_LEN)
    }

    fn unique_fields(&self) -> Vec<(&'static str, Value)> {
        vec![("user", Value::from(self.user.as_str()))]
    }
}

/// User as returned by the API. Never carries the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserVm {
    pub id: Uuid,
    pub user: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserVm {
    fn from(user: User) -> Self {
        let full_name = user.full_name();
        Self {
            id: user.id,
            user: user.user,
            role: user.role,
            first_name: user.first_name,
            last_name: user.last_name,
            full_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
