use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config;
use crate::database::models::{NewTask, Task};
use crate::database::tasks::TaskRepository;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Kept as raw strings: non-numeric values fall back to the defaults
    /// instead of failing extraction.
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Body for both update flavors. `owner` and unknown keys are not
/// deserialized, so they can never reach the record.
#[derive(Debug, Deserialize)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// GET /api/tasks?page=&limit= - Paginated task listing, public
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = parse_param(query.page.as_deref(), 1);
    let limit = parse_param(query.limit.as_deref(), config::config().api.default_page_size);
    let offset = page.saturating_sub(1).saturating_mul(limit);

    let repository = TaskRepository::new(state.pool.clone());
    let tasks = repository.list_page(limit, offset).await?;
    let total = repository.count().await?;

    Ok(Json(json!({
        "total": total,
        "page": page,
        "limit": limit,
        "totalPages": total_pages(total, limit),
        "tasks": tasks,
    })))
}

/// POST /api/tasks - Create a task owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let repository = TaskRepository::new(state.pool.clone());
    let task = repository
        .insert(NewTask {
            title: payload.title,
            description: payload.description.unwrap_or_default(),
            completed: payload.completed.unwrap_or(false),
            // Always the authenticated identity, never client input
            owner: auth_user.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks/:id - Fetch a single task, owner only
pub async fn read(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let repository = TaskRepository::new(state.pool.clone());
    let task = fetch_owned(&repository, &id, &auth_user).await?;
    Ok(Json(task))
}

/// PUT /api/tasks/:id - Full update, owner only
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<TaskChanges>,
) -> Result<Json<Task>, ApiError> {
    let repository = TaskRepository::new(state.pool.clone());
    let mut task = fetch_owned(&repository, &id, &auth_user).await?;

    apply_full_update(&mut task, payload);

    let task = repository.update(&task).await?;
    Ok(Json(task))
}

/// PATCH /api/tasks/:id - Partial update, owner only
pub async fn patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<TaskChanges>,
) -> Result<Json<Task>, ApiError> {
    let repository = TaskRepository::new(state.pool.clone());
    let mut task = fetch_owned(&repository, &id, &auth_user).await?;

    apply_partial_update(&mut task, payload);

    let task = repository.update(&task).await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/:id - Remove a task, owner only
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let repository = TaskRepository::new(state.pool.clone());
    let task = fetch_owned(&repository, &id, &auth_user).await?;

    repository.delete(task.id).await?;
    Ok(Json(json!({ "message": "Task deleted" })))
}

/// Shared lookup ladder: 400 on a malformed id, 404 when the record is
/// missing, 403 when the caller is not the owner.
async fn fetch_owned(
    repository: &TaskRepository,
    id: &str,
    auth_user: &AuthUser,
) -> Result<Task, ApiError> {
    let id = Uuid::parse_str(id).map_err(|_| ApiError::bad_request("Invalid task id"))?;

    let task = repository
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;

    if task.owner != auth_user.user_id {
        return Err(ApiError::forbidden("Not authorized"));
    }

    Ok(task)
}

/// PUT semantics: an empty string means "no change" for the text fields;
/// `completed` is applied whenever present, false included.
fn apply_full_update(task: &mut Task, changes: TaskChanges) {
    if let Some(title) = changes.title.filter(|t| !t.is_empty()) {
        task.title = title;
    }
    if let Some(description) = changes.description.filter(|d| !d.is_empty()) {
        task.description = description;
    }
    if let Some(completed) = changes.completed {
        task.completed = completed;
    }
}

/// PATCH semantics: every provided allow-listed field is written verbatim,
/// empty strings included.
fn apply_partial_update(task: &mut Task, changes: TaskChanges) {
    if let Some(title) = changes.title {
        task.title = title;
    }
    if let Some(description) = changes.description {
        task.description = description;
    }
    if let Some(completed) = changes.completed {
        task.completed = completed;
    }
}

fn parse_param(value: Option<&str>, default: i64) -> i64 {
    value.and_then(|v| v.parse::<i64>().ok()).unwrap_or(default)
}

/// ceil(total/limit), mirroring Math.ceil on float division so a zero limit
/// saturates instead of panicking.
fn total_pages(total: i64, limit: i64) -> i64 {
    (total as f64 / limit as f64).ceil() as i64
}
