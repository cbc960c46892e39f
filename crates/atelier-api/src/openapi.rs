//! `OpenAPI` specification generation for the registry API.
//!
//! The generated document is served at `/openapi.json` and is used by the
//! admin dashboard tooling to keep its client in sync.

use axum::response::IntoResponse;
use axum::Json;
use utoipa::OpenApi;

/// `OpenAPI` documentation for the registry REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        description = "Administrative API for file-backed project documents"
    ),
    paths(
        crate::routes::projects::create_project,
        crate::routes::projects::save_project,
        crate::routes::projects::list_projects,
        crate::routes::projects::list_folders,
        crate::routes::projects::delete_project,
    ),
    components(schemas(
        crate::error::ApiErrorBody,
        crate::routes::projects::CreateProjectRequest,
        crate::routes::projects::CreateProjectResponse,
        crate::routes::projects::SaveProjectRequest,
        crate::routes::projects::SaveProjectResponse,
        crate::routes::projects::ProjectSummary,
        crate::routes::projects::ListProjectsResponse,
        crate::routes::projects::FoldersResponse,
        crate::routes::projects::DeleteProjectRequest,
        crate::routes::projects::DeleteProjectResponse,
    )),
    tags(
        (name = "projects", description = "Project document and manifest operations"),
    )
)]
pub struct ApiDoc;

/// Serves the generated `OpenAPI` spec.
pub(crate) async fn serve_openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_covers_every_registry_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/create-project",
            "/api/save",
            "/api/projects",
            "/api/folders",
            "/api/delete",
        ] {
            assert!(
                spec.paths.paths.contains_key(path),
                "missing path in spec: {path}"
            );
        }
    }
}
