use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use super::AppState;
use crate::error::ProgressError;
use crate::models::*;
use crate::progress::PhaseWeight;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side for debugging, but clients only
/// see a generic message to avoid leaking internal details.
///
/// A project that vanished between the handler's lookup and the write
/// surfaces from the database layer as [`ProgressError::ProjectNotFound`]
/// and maps to NOT_FOUND.
fn internal_error(e: anyhow::Error) -> (StatusCode, String) {
    if let Some(ProgressError::ProjectNotFound(_)) = e.downcast_ref::<ProgressError>() {
        return project_not_found();
    }

    tracing::error!("Internal error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn progress_error(e: ProgressError) -> (StatusCode, String) {
    match e {
        ProgressError::ProjectNotFound(_) => project_not_found(),
        ProgressError::Store(e) => internal_error(e),
        other => internal_error(other.into()),
    }
}

fn project_not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Project not found".to_string())
}

fn task_not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Task not found".to_string())
}

/// 404 unless the project exists.
fn require_project(state: &AppState, id: Uuid) -> Result<Project, (StatusCode, String)> {
    state
        .db
        .get_project(id)
        .map_err(internal_error)?
        .ok_or_else(project_not_found)
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, (StatusCode, String)> {
    state.db.get_all_projects().map(Json).map_err(internal_error)
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, (StatusCode, String)> {
    require_project(&state, id).map(Json)
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProjectInput>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    if input.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Project name is required".to_string()));
    }

    state
        .db
        .create_project(input)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(internal_error)
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> Result<Json<Project>, (StatusCode, String)> {
    state
        .db
        .update_project(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(project_not_found)
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.db.delete_project(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(project_not_found())
    }
}

// ============================================================
// Progress
// ============================================================

pub async fn get_project_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectProgress>, (StatusCode, String)> {
    state
        .progress
        .try_progress_snapshot(id)
        .map(Json)
        .map_err(progress_error)
}

pub async fn sync_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SyncReport>, (StatusCode, String)> {
    state
        .progress
        .try_sync_all_project_data(id)
        .map(Json)
        .map_err(progress_error)
}

pub async fn get_progress_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProgressEntry>>, (StatusCode, String)> {
    require_project(&state, id)?;
    state
        .db
        .get_progress_history(id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn list_activities(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Activity>>, (StatusCode, String)> {
    require_project(&state, id)?;
    state.db.get_activities(id).map(Json).map_err(internal_error)
}

pub async fn apply_phase_template(
    State(state): State<AppState>,
    Path((id, phase)): Path<(Uuid, Phase)>,
) -> Result<(StatusCode, Json<Vec<Task>>), (StatusCode, String)> {
    require_project(&state, id)?;
    state
        .db
        .apply_phase_template(id, phase)
        .map(|tasks| (StatusCode::CREATED, Json(tasks)))
        .map_err(internal_error)
}

pub async fn list_phases(State(state): State<AppState>) -> Json<Vec<PhaseWeight>> {
    Json(state.progress.catalog().entries().to_vec())
}

// ============================================================
// Tasks
// ============================================================

pub async fn list_project_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    require_project(&state, project_id)?;
    state
        .db
        .get_tasks_by_project(project_id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn create_task(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<CreateTaskInput>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, String)> {
    require_project(&state, project_id)?;
    if input.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Task title is required".to_string()));
    }

    state
        .db
        .create_task(project_id, input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(internal_error)
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, (StatusCode, String)> {
    state
        .db
        .get_task(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(task_not_found)
}

/// Updates a task. A status change recomputes and persists project progress.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTaskInput>,
) -> Result<Json<UpdateTaskResponse>, (StatusCode, String)> {
    let existing = state
        .db
        .get_task(id)
        .map_err(internal_error)?
        .ok_or_else(task_not_found)?;

    let task = state
        .db
        .update_task(id, input)
        .map_err(internal_error)?
        .ok_or_else(task_not_found)?;

    let project_progress = (task.status != existing.status).then(|| {
        state.progress.handle_task_status_change(
            task.project_id,
            task.id,
            existing.status,
            task.status,
        )
    });

    Ok(Json(UpdateTaskResponse {
        task,
        project_progress,
    }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.db.delete_task(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(task_not_found())
    }
}
