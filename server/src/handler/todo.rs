//! Todo handlers.
//!
//! - `POST /todos` - create (Admin)
//! - `GET /todos` - list with optional `level` / `isCompleted` filters (Admin, User)
//! - `PUT /todos` - update an open todo
//! - `DELETE /todos/{id}` - delete (Admin)

use axum::{
    extract::{Path, State},
    Extension,
    http::StatusCode,
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use serde::Deserialize;
use utoipa::ToSchema;

use super::parse_id;
use crate::{
    auth::Principal,
    error::AppError,
    filter::Filter,
    model::{TodoFields, TodoLevel, TodoVm},
    service::ServiceError,
    state::AppState,
};

/// Body of `POST /todos`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoParams {
    pub content: Option<String>,
    pub level: Option<TodoLevel>,
}

/// Body of `PUT /todos`: the full view model of the todo being replaced.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub id: Option<String>,
    pub content: Option<String>,
    pub level: Option<TodoLevel>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTodosQuery {
    /// Repeatable: `?level=Low&level=High`.
    #[serde(default)]
    pub level: Vec<TodoLevel>,
    pub is_completed: Option<String>,
}

#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    WithRejection(Json(params), _): WithRejection<Json<TodoParams>, AppError>,
) -> Result<(StatusCode, Json<TodoVm>), AppError> {
    let Some(content) = params.content.filter(|c| !c.is_empty()) else {
        return Err(AppError::BadRequest("Content is required".to_string()));
    };

    let todo = state.todos.create(TodoFields::new(content, params.level)).await?;
    tracing::info!(
        todo_id = %todo.id,
        level = todo.level.as_str(),
        principal = %principal.name,
        "todo created"
    );

    Ok((StatusCode::CREATED, Json(state.todos.map(todo))))
}

#[tracing::instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ListTodosQuery>, AppError>,
) -> Result<Json<Vec<TodoVm>>, AppError> {
    let is_completed = match query.is_completed.as_deref() {
        Some(raw) => parse_flag(raw)?,
        None => None,
    };
    let filter = todo_filter(&query.level, is_completed);
    tracing::debug!(?filter, "listing todos");

    let todos = state.todos.find_all(&filter).await?;
    Ok(Json(state.todos.map_all(todos)))
}

#[tracing::instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    WithRejection(Json(vm), _): WithRejection<Json<UpdateTodoRequest>, AppError>,
) -> Result<Json<TodoVm>, AppError> {
    let Some(raw_id) = vm.id.as_deref().filter(|id| !id.is_empty()) else {
        return Err(AppError::BadRequest("Missing parameters".to_string()));
    };
    let id = parse_id(raw_id)?;

    let fields = TodoFields {
        content: vm.content.unwrap_or_default(),
        level: vm.level.unwrap_or_default(),
        is_completed: vm.is_completed.unwrap_or(false),
    };
    let updated = state.todos.update(id, fields).await.map_err(|err| match err {
        ServiceError::Frozen(_) => AppError::Invariant("Already completed".to_string()),
        other => other.into(),
    })?;
    tracing::info!(todo_id = %id, is_completed = updated.is_completed, "todo updated");

    Ok(Json(state.todos.map(updated)))
}

#[tracing::instrument(skip_all, fields(%id))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<TodoVm>, AppError> {
    let id = parse_id(&id)?;
    let deleted = state.todos.delete(id).await?;
    tracing::info!(todo_id = %id, principal = %principal.name, "todo deleted");

    Ok(Json(state.todos.map(deleted)))
}

/// Builds the list filter: any of `levels`, and-ed with the completion flag
/// when both are given.
pub fn todo_filter(levels: &[TodoLevel], is_completed: Option<bool>) -> Filter {
    let by_level = (!levels.is_empty())
        .then(|| Filter::one_of("level", levels.iter().map(|level| level.as_str())));

    match (by_level, is_completed) {
        (Some(by_level), Some(done)) => by_level.and(Filter::eq("isCompleted", done)),
        (Some(by_level), None) => by_level,
        (None, Some(done)) => Filter::eq("isCompleted", done),
        (None, None) => Filter::All,
    }
}

/// Parses a boolean-like query value. A blank value counts as omitted.
pub fn parse_flag(raw: &str) -> Result<Option<bool>, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(AppError::BadRequest(format!(
            "isCompleted must be a boolean, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("true", Some(true))]
    #[case("TRUE", Some(true))]
    #[case("1", Some(true))]
    #[case("yes", Some(true))]
    #[case("false", Some(false))]
    #[case("0", Some(false))]
    #[case("no", Some(false))]
    #[case("", None)]
    fn parses_boolean_like_flags(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_flag(raw).unwrap(), expected);
    }

    #[test]
    fn rejects_other_flag_values() {
        assert!(matches!(parse_flag("maybe"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn no_parameters_match_everything() {
        assert_eq!(todo_filter(&[], None), Filter::All);
    }

    #[test]
    fn completion_alone_filters_on_completion() {
        assert_eq!(todo_filter(&[], Some(false)), Filter::eq("isCompleted", false));
    }

    #[test]
    fn levels_become_one_of() {
        assert_eq!(
            todo_filter(&[TodoLevel::Low, TodoLevel::High], None),
            Filter::one_of("level", ["Low", "High"])
        );
    }

    #[test]
    fn levels_and_completion_are_combined() {
        assert_eq!(
            todo_filter(&[TodoLevel::High], Some(true)),
            Filter::And(vec![
                Filter::one_of("level", ["High"]),
                Filter::eq("isCompleted", true),
            ])
        );
    }
}
