use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::question_dto::ListQuestionsQuery;
use crate::error::Result;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/tests/{id}/questions",
    params(
        ("id" = String, Path, description = "Test ID (UUID)"),
        ("page" = Option<i64>, Query, description = "1-based page"),
        ("per_page" = Option<i64>, Query, description = "Page size, at most 500"),
    ),
    responses(
        (status = 200, description = "Questions of the test in import order"),
        (status = 404, description = "Test not found"),
    ),
)]
pub async fn list_test_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuestionsQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    state.test_service.get_test_by_id(id).await?;

    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(50);
    let questions = state
        .question_service
        .list_for_test(id, page, per_page)
        .await?;
    Ok(Json(questions))
}

#[utoipa::path(
    get,
    path = "/api/admin/personality-dimensions",
    responses(
        (status = 200, description = "All personality dimensions ordered by code"),
    ),
)]
pub async fn list_personality_dimensions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let dimensions = state.question_service.list_dimensions().await?;
    Ok(Json(dimensions))
}
