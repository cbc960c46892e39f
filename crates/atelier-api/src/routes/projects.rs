//! Project registry API routes.
//!
//! ## Routes
//!
//! - `POST /create-project` - Create a project document with raw content
//! - `POST /api/save` - Save a project payload as formatted JSON
//! - `GET  /api/projects` - Reconciled project listing
//! - `GET  /api/folders` - Distinct folder labels
//! - `POST /api/delete` - Delete a project document and its manifest entry
//!
//! Required body fields are declared optional here and validated by the
//! service so that a missing field yields the documented 400, not a generic
//! deserialization rejection.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use atelier_registry::ProjectRecord;

use crate::error::{ApiError, ApiErrorBody};
use crate::server::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a project document from raw content.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    /// Folder label; defaults to `sandbox`.
    pub folder: Option<String>,
    /// Display name; defaults to the file name minus `.json`.
    pub name: Option<String>,
    /// Document file name (required).
    pub file: Option<String>,
    /// Raw document content (required).
    pub content: Option<String>,
}

/// Response after creating a project.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct CreateProjectResponse {
    /// Confirmation message.
    pub message: String,
}

/// Request to save a project payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveProjectRequest {
    /// Folder label; defaults to `sandbox`.
    pub folder: Option<String>,
    /// Display name candidate for a new manifest entry.
    pub project: Option<String>,
    /// Document file name (required).
    pub file_name: Option<String>,
    /// Document payload, serialized as formatted JSON (required).
    pub payload: Option<serde_json::Value>,
}

/// Response after saving a project payload.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct SaveProjectResponse {
    /// Relative path of the written document.
    pub path: String,
}

/// One project in the reconciled listing.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct ProjectSummary {
    /// Folder label.
    pub folder: String,
    /// Display name.
    pub name: String,
    /// Document file name.
    pub file: String,
}

impl From<ProjectRecord> for ProjectSummary {
    fn from(record: ProjectRecord) -> Self {
        Self {
            folder: record.folder,
            name: record.name,
            file: record.file,
        }
    }
}

/// Reconciled project listing.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct ListProjectsResponse {
    /// Projects in manifest order, orphan documents appended.
    pub projects: Vec<ProjectSummary>,
}

/// Distinct folder labels.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct FoldersResponse {
    /// Unique non-empty folder values.
    pub folders: Vec<String>,
}

/// Request to delete a project.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteProjectRequest {
    /// Document file name (required).
    pub file: Option<String>,
}

/// Response after deleting a project.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct DeleteProjectResponse {
    /// Confirmation message.
    pub message: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Create a project document.
#[utoipa::path(
    post,
    path = "/create-project",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created", body = CreateProjectResponse),
        (status = 400, description = "Missing file or content", body = ApiErrorBody),
        (status = 500, description = "Write failed", body = ApiErrorBody),
    ),
    tag = "projects"
)]
pub(crate) async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<Json<CreateProjectResponse>, ApiError> {
    let file = state
        .service()
        .create(request.folder, request.name, request.file, request.content)
        .await?;

    Ok(Json(CreateProjectResponse {
        message: format!("Created {file}"),
    }))
}

/// Save a project payload as formatted JSON.
#[utoipa::path(
    post,
    path = "/api/save",
    request_body = SaveProjectRequest,
    responses(
        (status = 200, description = "Payload written", body = SaveProjectResponse),
        (status = 400, description = "Missing fileName or payload", body = ApiErrorBody),
        (status = 500, description = "Write failed", body = ApiErrorBody),
    ),
    tag = "projects"
)]
pub(crate) async fn save_project(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveProjectRequest>,
) -> Result<Json<SaveProjectResponse>, ApiError> {
    let path = state
        .service()
        .save(
            request.folder,
            request.project,
            request.file_name,
            request.payload,
        )
        .await?;

    Ok(Json(SaveProjectResponse { path }))
}

/// Reconciled project listing.
#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "Project listing", body = ListProjectsResponse),
        (status = 500, description = "Listing failed", body = ApiErrorBody),
    ),
    tag = "projects"
)]
pub(crate) async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListProjectsResponse>, ApiError> {
    let projects = state.service().list().await?;

    Ok(Json(ListProjectsResponse {
        projects: projects.into_iter().map(ProjectSummary::from).collect(),
    }))
}

/// Distinct folder labels from the manifest.
#[utoipa::path(
    get,
    path = "/api/folders",
    responses(
        (status = 200, description = "Folder labels", body = FoldersResponse),
        (status = 500, description = "Listing failed", body = ApiErrorBody),
    ),
    tag = "projects"
)]
pub(crate) async fn list_folders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FoldersResponse>, ApiError> {
    let folders = state.service().folders().await;
    Ok(Json(FoldersResponse { folders }))
}

/// Delete a project document and its manifest entry.
#[utoipa::path(
    post,
    path = "/api/delete",
    request_body = DeleteProjectRequest,
    responses(
        (status = 200, description = "Project deleted", body = DeleteProjectResponse),
        (status = 400, description = "Missing file", body = ApiErrorBody),
        (status = 500, description = "Delete failed", body = ApiErrorBody),
    ),
    tag = "projects"
)]
pub(crate) async fn delete_project(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteProjectRequest>,
) -> Result<Json<DeleteProjectResponse>, ApiError> {
    let file = state.service().delete(request.file).await?;

    Ok(Json(DeleteProjectResponse {
        message: format!("Deleted {file}"),
    }))
}

/// Project registry routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create-project", post(create_project))
        .route("/api/save", post(save_project))
        .route("/api/projects", get(list_projects))
        .route("/api/folders", get(list_folders))
        .route("/api/delete", post(delete_project))
}
