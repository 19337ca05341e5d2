mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::progress::{PhaseCatalog, ProgressSync};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub progress: ProgressSync<Database>,
}

impl AppState {
    pub fn new(db: Database, catalog: PhaseCatalog) -> Self {
        Self {
            progress: ProgressSync::new(db.clone(), catalog),
            db,
        }
    }
}

/// Router with the built-in phase catalog.
pub fn create_router(db: Database) -> Router {
    create_router_with_state(AppState::new(db, PhaseCatalog::default()))
}

pub fn create_router_with_state(state: AppState) -> Router {
    let api = Router::new()
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route("/projects", post(handlers::create_project))
        .route("/projects/{id}", get(handlers::get_project))
        .route("/projects/{id}", put(handlers::update_project))
        .route("/projects/{id}", delete(handlers::delete_project))
        .route("/projects/{id}/tasks", get(handlers::list_project_tasks))
        .route("/projects/{id}/tasks", post(handlers::create_task))
        // Progress
        .route("/projects/{id}/progress", get(handlers::get_project_progress))
        .route("/projects/{id}/progress/history", get(handlers::get_progress_history))
        .route("/projects/{id}/sync", post(handlers::sync_project))
        .route("/projects/{id}/activities", get(handlers::list_activities))
        .route("/projects/{id}/phases/{phase}/template", post(handlers::apply_phase_template))
        .route("/phases", get(handlers::list_phases))
        // Tasks (by task id)
        .route("/tasks/{id}", get(handlers::get_task))
        .route("/tasks/{id}", put(handlers::update_task))
        .route("/tasks/{id}", delete(handlers::delete_task))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
