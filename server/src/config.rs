//! Server configuration read from the environment.

use std::env;

use thiserror::Error;

use crate::{
    auth::{Principal, StaticTokens},
    model::UserRole,
    observability::LogFormat,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a valid port number, got {0:?}")]
    InvalidPort(String),

    #[error("LOG_FORMAT must be json or pretty, got {0:?}")]
    InvalidLogFormat(String),

    #[error("AUTH_TOKENS entry {0:?} is not of the form token=Role")]
    InvalidToken(String),

    #[error("unknown role {0:?} in AUTH_TOKENS")]
    UnknownRole(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    /// Bearer tokens accepted by the role gate.
    pub tokens: StaticTokens,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 3000,
        };
        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidLogFormat)?,
            None => LogFormat::default(),
        };
        let tokens = match lookup("AUTH_TOKENS") {
            Some(raw) => parse_tokens(&raw)?,
            None => StaticTokens::new(),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            log_format,
            tokens,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses `token=Role,token=Role`. Principals are named `token-1`, `token-2`,
/// ... in the order listed.
pub fn parse_tokens(raw: &str) -> Result<StaticTokens, ConfigError> {
    let mut tokens = StaticTokens::new();
    for (index, entry) in raw.split(',').map(str::trim).filter(|e| !e.is_empty()).enumerate() {
        let Some((token, role)) = entry.split_once('=') else {
            return Err(ConfigError::InvalidToken(entry.to_string()));
        };
        let token = token.trim();
        if token.is_empty() {
            return Err(ConfigError::InvalidToken(entry.to_string()));
        }
        let role: UserRole = role.parse().map_err(ConfigError::UnknownRole)?;
        tokens = tokens.with_token(
            token,
            Principal {
                name: format!("token-{}", index + 1),
                role,
            },
        );
    }
    Ok(tokens)
}
