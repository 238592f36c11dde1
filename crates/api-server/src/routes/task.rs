//! Task API endpoints
//!
//! CRUD over the task table, with JSON content negotiation enforced
//! through the `Accept` and `Content-Type` request headers.

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;

use todolist_core::task::{NewTask, Task};
use todolist_core::Error;

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Error responses are plain text: a status code and a message
type RouteError = (StatusCode, String);

const JSON_MIME: &str = "application/json";

fn expectation_failed(message: &str) -> RouteError {
    (StatusCode::EXPECTATION_FAILED, message.to_string())
}

fn store_error(err: Error) -> RouteError {
    if err.is_not_found() {
        (StatusCode::NOT_FOUND, err.to_string())
    } else {
        tracing::error!("Task store failure: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

/// True when any value of the header mentions `application/json`
fn declares_json(headers: &HeaderMap, name: HeaderName) -> bool {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains(JSON_MIME))
}

fn require_json_accept(headers: &HeaderMap) -> Result<(), RouteError> {
    if declares_json(headers, header::ACCEPT) {
        Ok(())
    } else {
        Err(expectation_failed("expected application/json Accept"))
    }
}

fn require_json_content_type(headers: &HeaderMap) -> Result<(), RouteError> {
    if declares_json(headers, header::CONTENT_TYPE) {
        Ok(())
    } else {
        Err(expectation_failed("expected application/json Content-Type"))
    }
}

/// Any id segment that is not a decimal integer, including one that is not
/// valid UTF-8 once percent-decoded, fails the same way
fn parse_id(raw: Result<Path<String>, PathRejection>) -> Result<i64, RouteError> {
    raw.ok()
        .and_then(|Path(raw)| raw.parse().ok())
        .ok_or_else(|| expectation_failed("expected id to be integer number"))
}

/// Decode the first JSON value of the body; anything after it is ignored
fn decode_task(body: &[u8]) -> Result<NewTask, RouteError> {
    serde_json::Deserializer::from_slice(body)
        .into_iter::<NewTask>()
        .next()
        .unwrap_or_else(|| Err(<serde_json::Error as serde::de::Error>::custom("EOF")))
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks/ - List all tasks
async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TaskListResponse>, RouteError> {
    require_json_accept(&headers)?;

    let tasks = state.task_store().list().await.map_err(store_error)?;
    Ok(Json(TaskListResponse { tasks }))
}

/// POST /tasks/ - Create a new task
async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), RouteError> {
    require_json_content_type(&headers)?;
    require_json_accept(&headers)?;

    let task = decode_task(&body)?;
    let id = state.task_store().create(task).await.map_err(store_error)?;
    tracing::debug!("Created task {}", id);

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// DELETE /tasks/ - Delete every task
async fn delete_all_tasks(State(state): State<AppState>) -> Result<StatusCode, RouteError> {
    state.task_store().delete_all().await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Json<Task>, RouteError> {
    let id = parse_id(raw_id)?;
    require_json_accept(&headers)?;

    let task = state.task_store().get(id).await.map_err(store_error)?;
    Ok(Json(task))
}

/// PUT /tasks/{id} - Replace a task
async fn update_task(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, RouteError> {
    let id = parse_id(raw_id)?;
    require_json_content_type(&headers)?;

    let task = decode_task(&body)?;
    state
        .task_store()
        .update(id, task)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::ACCEPTED)
}

/// DELETE /tasks/{id} - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, RouteError> {
    let id = parse_id(raw_id)?;

    state.task_store().delete(id).await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn method_not_allowed() -> Response {
    let code = StatusCode::METHOD_NOT_ALLOWED;
    (code, code.canonical_reason().unwrap_or_default()).into_response()
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", any(|| async { Redirect::permanent("/tasks/") }))
        .route(
            "/tasks/",
            get(list_tasks)
                .post(create_task)
                .delete(delete_all_tasks)
                .fallback(method_not_allowed),
        )
        .route(
            "/tasks/{*id}",
            get(get_task)
                .put(update_task)
                .delete(delete_task)
                .fallback(method_not_allowed),
        )
}
