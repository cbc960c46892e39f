//! HTTP route handlers.

pub mod projects;

use std::sync::Arc;

use axum::Router;

use crate::server::AppState;

/// All project registry routes.
pub fn routes() -> Router<Arc<AppState>> {
    projects::routes()
}
