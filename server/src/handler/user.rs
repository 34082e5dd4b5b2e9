//! User handlers.
//!
//! - `POST /users` - register
//! - `GET /users` - list (Admin)

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;

use crate::{
    error::AppError,
    filter::Filter,
    model::{UserFields, UserVm},
    state::AppState,
};

#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(fields), _): WithRejection<Json<UserFields>, AppError>,
) -> Result<(StatusCode, Json<UserVm>), AppError> {
    let user = state.users.create(fields).await?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");

    Ok((StatusCode::CREATED, Json(state.users.map(user))))
}

#[tracing::instrument(skip_all)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserVm>>, AppError> {
    let users = state.users.find_all(&Filter::All).await?;
    Ok(Json(state.users.map_all(users)))
}
