//! Role gate evaluated before a handler runs.
//!
//! Credentials arrive as `Authorization: Bearer <token>` and are resolved to a
//! [`Principal`] by a [`CredentialResolver`], the pluggable authentication
//! strategy. The gate fails closed: no usable credential is 401, a role
//! outside the route's set is 403, and in both cases the handler never runs.
//!
//! ```rust,ignore
//! let gate = RoleGate::new(resolver, &[UserRole::Admin]);
//! post(create).route_layer(from_fn_with_state(gate, require_role))
//! ```

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, model::UserRole};

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub role: UserRole,
}

/// Authentication strategy: turns a bearer token into a principal.
pub trait CredentialResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<Principal>;
}

/// Fixed token table, loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    tokens: HashMap<String, Principal>,
}

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl CredentialResolver for StaticTokens {
    fn resolve(&self, token: &str) -> Option<Principal> {
        self.tokens.get(token).cloned()
    }
}

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No credential required.
    Public,
    Roles(&'static [UserRole]),
}

impl Access {
    pub const ADMIN: Access = Access::Roles(&[UserRole::Admin]);
    pub const ANY_ROLE: Access = Access::Roles(&[UserRole::Admin, UserRole::User]);

    pub fn roles(self) -> &'static [UserRole] {
        match self {
            Access::Public => &[],
            Access::Roles(roles) => roles,
        }
    }
}

#[derive(Clone)]
pub struct RoleGate {
    resolver: Arc<dyn CredentialResolver>,
    allowed: &'static [UserRole],
}

impl RoleGate {
    pub fn new(resolver: Arc<dyn CredentialResolver>, allowed: &'static [UserRole]) -> Self {
        Self { resolver, allowed }
    }

    pub fn authorize(&self, headers: &HeaderMap) -> Result<Principal, AppError> {
        let Some(token) = bearer_token(headers) else {
            return Err(AppError::Unauthorized("Missing bearer token".to_string()));
        };
        let Some(principal) = self.resolver.resolve(token) else {
            tracing::warn!("rejected unknown bearer token");
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        };
        if !self.allowed.contains(&principal.role) {
            tracing::warn!(principal = %principal.name, role = principal.role.as_str(), "role not permitted");
            return Err(AppError::Forbidden(format!(
                "Role {} is not permitted",
                principal.role.as_str()
            )));
        }
        Ok(principal)
    }
}

/// Middleware form of [`RoleGate::authorize`]. The principal is placed in the
/// request extensions for the handler.
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.authorize(request.headers()) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
