use std::sync::Arc;

use crate::{
    auth::CredentialResolver,
    service::{TodoService, UserService},
};

/// Collaborators shared by every handler, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<TodoService>,
    pub users: Arc<UserService>,
    pub credentials: Arc<dyn CredentialResolver>,
}

impl AppState {
    pub fn new(
        todos: TodoService,
        users: UserService,
        credentials: Arc<dyn CredentialResolver>,
    ) -> Self {
        Self {
            todos: Arc::new(todos),
            users: Arc::new(users),
            credentials,
        }
    }

    /// State backed by empty in-memory stores.
    pub fn in_memory(credentials: Arc<dyn CredentialResolver>) -> Self {
        Self::new(TodoService::in_memory(), UserService::in_memory(), credentials)
    }
}
