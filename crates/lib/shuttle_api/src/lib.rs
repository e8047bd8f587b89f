//! # shuttle_api
//!
//! HTTP API library for Shuttle: the school student roster endpoints.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};
use shuttle_core::store::SchoolStore;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::handlers::{health, students};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Student roster storage.
    pub store: Arc<dyn SchoolStore>,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `shuttle_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    shuttle_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public = Router::new().route(routes::GET_API_HEALTH, get(health::health_handler));

    // School-scoped routes: token first, then school permission.
    let school = Router::new()
        .route(
            routes::SCHOOL_STUDENTS,
            get(students::list_students_handler).post(students::create_student_handler),
        )
        .route(
            routes::SCHOOL_STUDENTS_ID,
            put(students::update_student_handler)
                .delete(students::delete_student_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::school_scope::require_school_scope,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new().merge(public).merge(school).with_state(state)
}
