//! Route table.
//!
//! # Design
//! Every endpoint is one [`Route`] entry: verb, path, access rule, handler and
//! a declarative description of its input and replies. [`router`] registers
//! the table with axum, wrapping each gated handler in a [`RoleGate`]; the
//! OpenAPI document is produced by a separate pass over the same table
//! (see [`crate::openapi`]), so documentation cannot drift from routing.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put, MethodRouter},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    auth::{require_role, Access, RoleGate},
    handler::{todo, user},
    openapi,
    state::AppState,
};

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

/// Shape of a request or response body, by component schema name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    One(&'static str),
    Many(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Reply {
    pub status: StatusCode,
    pub description: &'static str,
    pub body: Shape,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryParam {
    pub name: &'static str,
    pub description: &'static str,
    /// Component schema name of the value; `None` for a plain string.
    pub schema: Option<&'static str>,
    pub repeated: bool,
}

pub struct Route {
    pub verb: Verb,
    pub path: &'static str,
    /// Model the route belongs to; used as tag and operation id prefix.
    pub model: &'static str,
    pub action: &'static str,
    pub summary: &'static str,
    pub access: Access,
    pub body: Option<Shape>,
    pub query: Vec<QueryParam>,
    pub replies: Vec<Reply>,
    pub handler: fn() -> MethodRouter<AppState>,
}

impl Route {
    /// `<Model>_<Action>`, e.g. `Todo_Create`.
    pub fn operation_id(&self) -> String {
        format!("{}_{}", self.model, self.action)
    }
}

pub const ERROR_BODY: Shape = Shape::One("ApiException");

fn reply(status: StatusCode, description: &'static str, body: Shape) -> Reply {
    Reply {
        status,
        description,
        body,
    }
}

pub fn table() -> Vec<Route> {
    vec![
        Route {
            verb: Verb::Post,
            path: "/todos",
            model: "Todo",
            action: "Create",
            summary: "Create a todo",
            access: Access::ADMIN,
            body: Some(Shape::One("TodoParams")),
            query: Vec::new(),
            replies: vec![
                reply(StatusCode::CREATED, "Created todo", Shape::One("TodoVm")),
                reply(StatusCode::BAD_REQUEST, "Missing content", ERROR_BODY),
                reply(StatusCode::INTERNAL_SERVER_ERROR, "Store failure", ERROR_BODY),
            ],
            handler: || post(todo::create),
        },
        Route {
            verb: Verb::Get,
            path: "/todos",
            model: "Todo",
            action: "GetAll",
            summary: "List todos",
            access: Access::ANY_ROLE,
            body: None,
            query: vec![
                QueryParam {
                    name: "level",
                    description: "Match any of the given levels",
                    schema: Some("TodoLevel"),
                    repeated: true,
                },
                QueryParam {
                    name: "isCompleted",
                    description: "true/false, 1/0 or yes/no",
                    schema: None,
                    repeated: false,
                },
            ],
            replies: vec![
                reply(StatusCode::OK, "Matching todos", Shape::Many("TodoVm")),
                reply(StatusCode::BAD_REQUEST, "Malformed query", ERROR_BODY),
                reply(StatusCode::INTERNAL_SERVER_ERROR, "Store failure", ERROR_BODY),
            ],
            handler: || get(todo::list),
        },
        Route {
            verb: Verb::Put,
            path: "/todos",
            model: "Todo",
            action: "Update",
            summary: "Replace an open todo",
            access: Access::Public,
            body: Some(Shape::One("UpdateTodoRequest")),
            query: Vec::new(),
            replies: vec![
                reply(StatusCode::OK, "Updated todo", Shape::One("TodoVm")),
                reply(StatusCode::BAD_REQUEST, "Missing id or already completed", ERROR_BODY),
                reply(StatusCode::NOT_FOUND, "Unknown id", ERROR_BODY),
                reply(StatusCode::INTERNAL_SERVER_ERROR, "Store failure", ERROR_BODY),
            ],
            handler: || put(todo::update),
        },
        Route {
            verb: Verb::Delete,
            path: "/todos/{id}",
            model: "Todo",
            action: "Delete",
            summary: "Delete a todo",
            access: Access::ADMIN,
            body: None,
            query: Vec::new(),
            replies: vec![
                reply(StatusCode::OK, "Deleted todo", Shape::One("TodoVm")),
                reply(StatusCode::NOT_FOUND, "Unknown id", ERROR_BODY),
                reply(StatusCode::INTERNAL_SERVER_ERROR, "Store failure", ERROR_BODY),
            ],
            handler: || delete(todo::delete),
        },
        Route {
            verb: Verb::Post,
            path: "/users",
            model: "User",
            action: "Register",
            summary: "Register a user",
            access: Access::Public,
            body: Some(Shape::One("UserFields")),
            query: Vec::new(),
            replies: vec![
                reply(StatusCode::CREATED, "Registered user", Shape::One("UserVm")),
                reply(StatusCode::BAD_REQUEST, "Invalid or duplicate user", ERROR_BODY),
                reply(StatusCode::INTERNAL_SERVER_ERROR, "Store failure", ERROR_BODY),
            ],
            handler: || post(user::register),
        },
        Route {
            verb: Verb::Get,
            path: "/users",
            model: "User",
            action: "GetAll",
            summary: "List users",
            access: Access::ADMIN,
            body: None,
            query: Vec::new(),
            replies: vec![
                reply(StatusCode::OK, "All users", Shape::Many("UserVm")),
                reply(StatusCode::INTERNAL_SERVER_ERROR, "Store failure", ERROR_BODY),
            ],
            handler: || get(user::list),
        },
    ]
}

/// Registers the table, the OpenAPI document and request tracing.
pub fn router(state: AppState) -> Router {
    let routes = table();
    let doc = Arc::new(openapi::document(&routes));

    let mut router = Router::new();
    for route in &routes {
        let method_router = (route.handler)();
        let method_router = match route.access {
            Access::Public => method_router,
            Access::Roles(roles) => {
                let gate = RoleGate::new(state.credentials.clone(), roles);
                method_router.route_layer(from_fn_with_state(gate, require_role))
            }
        };
        router = router.route(route.path, method_router);
    }

    router
        .route(OPENAPI_PATH, get(move || async move { Json(doc.as_ref().clone()) }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
