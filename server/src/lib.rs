//! REST backend for todos and users.
//!
//! # Overview
//! A request passes the role gate, the handler validates its input, the
//! persistence service performs one create/read/update/delete against the
//! document store, and the handler maps the record to a view model.
//!
//! # Design
//! - Routes are declared once in [`routes::table`]; routing and the OpenAPI
//!   document are both derived from that table.
//! - Handlers receive their services through [`AppState`], built at startup.
//! - Storage sits behind [`store::DocumentStore`]; [`store::MemoryStore`] is
//!   the bundled driver.

pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod handler;
pub mod model;
pub mod observability;
pub mod openapi;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

use axum::Router;
use tokio::net::TcpListener;

pub use error::{ApiException, AppError};
pub use model::{Todo, TodoLevel, TodoVm, User, UserRole, UserVm};
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}
