//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds the base URL and an optional bearer token and carries
//! no state between calls. Each operation is split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; the caller executes the round-trip in between.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ApiException, CreateTodo, RegisterUser, Todo, TodoQuery, UpdateTodo, User};

#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    token: Option<String>,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn build_list_todos(&self, query: &TodoQuery) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/todos{}", query.to_query_string()))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Post, "/todos").with_json(to_json(input)?))
    }

    pub fn build_update_todo(&self, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Put, "/todos").with_json(to_json(input)?))
    }

    pub fn build_delete_todo(&self, id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/todos/{id}"))
    }

    pub fn build_register_user(&self, input: &RegisterUser) -> Result<HttpRequest, ApiError> {
        Ok(self.request(HttpMethod::Post, "/users").with_json(to_json(input)?))
    }

    pub fn build_list_users(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/users")
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse(response, 200)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse(response, 201)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse(response, 200)
    }

    /// The server answers a delete with the removed todo.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse(response, 200)
    }

    pub fn parse_register_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse(response, 201)
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        parse(response, 200)
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let req = HttpRequest::new(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => req.with_header("authorization", format!("Bearer {token}")),
            None => req,
        }
    }
}

fn to_json<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn parse<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(&response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant,
/// using the server's error message when the body carries one.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let message = serde_json::from_str::<ApiException>(&response.body)
        .map(|e| e.message)
        .unwrap_or_else(|_| response.body.clone());
    Err(match response.status {
        400 => ApiError::BadRequest(message),
        401 => ApiError::Unauthorized(message),
        403 => ApiError::Forbidden(message),
        404 => ApiError::NotFound(message),
        status => ApiError::HttpError {
            status,
            body: response.body.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoLevel;

    const TODO_JSON: &str = r#"{"id":"00000000-0000-0000-0000-000000000001","content":"Test","level":"Normal","isCompleted":false,"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000").with_token("secret")
    }

    fn error_body(status: u16, message: &str) -> String {
        format!(r#"{{"statusCode":{status},"error":"x","message":"{message}","timestamp":"2024-01-01T00:00:00Z"}}"#)
    }

    #[test]
    fn requests_carry_the_bearer_token() {
        let req = client().build_delete_todo(Uuid::nil());
        assert_eq!(req.header("Authorization"), Some("Bearer secret"));
    }

    #[test]
    fn requests_without_token_have_no_authorization_header() {
        let req = TodoClient::new("http://localhost:3000").build_list_users();
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn build_list_todos_encodes_filters() {
        let c = client();
        assert_eq!(
            c.build_list_todos(&TodoQuery::default()).url,
            "http://localhost:3000/todos"
        );

        let query = TodoQuery {
            levels: vec![TodoLevel::Low, TodoLevel::High],
            is_completed: Some(true),
        };
        let req = c.build_list_todos(&query);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/todos?level=Low&level=High&isCompleted=true"
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_todo_omits_absent_level() {
        let input = CreateTodo {
            content: "Buy milk".to_string(),
            level: None,
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/todos");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["content"], "Buy milk");
        assert!(body.get("level").is_none());
    }

    #[test]
    fn build_update_todo_sends_full_record() {
        let input = UpdateTodo {
            id: Uuid::nil(),
            content: "Updated".to_string(),
            level: TodoLevel::High,
            is_completed: true,
        };
        let req = client().build_update_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/todos");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(body["level"], "High");
        assert_eq!(body["isCompleted"], true);
    }

    #[test]
    fn build_delete_todo_targets_the_id() {
        let req = client().build_delete_todo(Uuid::nil());
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(
            req.url,
            "http://localhost:3000/todos/00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn parse_list_todos_success() {
        let todos = client()
            .parse_list_todos(HttpResponse::new(200, format!("[{TODO_JSON}]")))
            .unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].content, "Test");
        assert_eq!(todos[0].level, TodoLevel::Normal);
    }

    #[test]
    fn parse_create_todo_expects_201() {
        let todo = client()
            .parse_create_todo(HttpResponse::new(201, TODO_JSON))
            .unwrap();
        assert_eq!(todo.content, "Test");

        let err = client()
            .parse_create_todo(HttpResponse::new(200, TODO_JSON))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 200, .. }));
    }

    #[test]
    fn parse_delete_todo_returns_removed_todo() {
        let todo = client()
            .parse_delete_todo(HttpResponse::new(200, TODO_JSON))
            .unwrap();
        assert!(!todo.is_completed);
    }

    #[test]
    fn error_statuses_carry_server_message() {
        let c = client();

        let err = c
            .parse_update_todo(HttpResponse::new(400, error_body(400, "Already completed")))
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Already completed"));

        let err = c
            .parse_delete_todo(HttpResponse::new(404, error_body(404, "gone")))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "gone"));

        let err = c
            .parse_list_users(HttpResponse::new(403, error_body(403, "nope")))
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = c
            .parse_list_todos(HttpResponse::new(401, "plain text"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "plain text"));
    }

    #[test]
    fn parse_unexpected_status_keeps_raw_body() {
        let err = client()
            .parse_create_todo(HttpResponse::new(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, ref body } if body == "internal error"));
    }

    #[test]
    fn parse_bad_json_is_a_deserialization_error() {
        let err = client()
            .parse_list_todos(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:3000/");
        assert_eq!(client.build_list_users().url, "http://localhost:3000/users");
    }
}
