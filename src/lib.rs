pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod import;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use crate::config::ImportSettings;
use crate::services::{
    import_service::ImportService, question_service::QuestionService, test_service::TestService,
};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub test_service: TestService,
    pub question_service: QuestionService,
    pub import_service: ImportService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let settings = crate::config::get_config().import_settings();
        Self::with_settings(pool, settings)
    }

    pub fn with_settings(pool: PgPool, settings: ImportSettings) -> Self {
        let test_service = TestService::new(pool.clone());
        let question_service = QuestionService::new(pool.clone());
        let import_service = ImportService::new(pool.clone(), settings);

        Self {
            pool,
            test_service,
            question_service,
            import_service,
        }
    }
}

/// Admin API routes, without authentication or body-limit layers.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/questions/import",
            post(routes::import::import_questions),
        )
        .route(
            "/api/admin/questions/import/template",
            get(routes::import::download_template),
        )
        .route(
            "/api/admin/tests/:id/questions",
            get(routes::questions::list_test_questions),
        )
        .route(
            "/api/admin/personality-dimensions",
            get(routes::questions::list_personality_dimensions),
        )
}
