use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::import_dto::{ImportSuccessResponse, TemplateQuery};
use crate::error::Error;
use crate::import::ImportError;
use crate::services::import_service::ImportUpload;
use crate::services::template_service::TemplateService;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/admin/questions/import",
    responses(
        (status = 200, description = "All rows imported"),
        (status = 400, description = "Bad request, unreadable file or row validation errors"),
        (status = 404, description = "Test not found"),
        (status = 500, description = "Database failure; nothing was imported"),
    ),
)]
pub async fn import_questions(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportSuccessResponse>, ImportError> {
    let mut upload: Option<ImportUpload> = None;
    let mut test_id_raw: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(Error::Multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    tracing::error!("Failed to read uploaded spreadsheet: {}", e);
                    Error::BadRequest("Failed to read file upload".into())
                })?;
                // Browsers send an unnamed, empty part when no file was picked.
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                upload = Some(ImportUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            "testId" | "test_id" => {
                let value = field.text().await.map_err(Error::Multipart)?;
                test_id_raw = Some(value.trim().to_string());
            }
            _ => {}
        }
    }

    let upload = upload.ok_or(ImportError::MissingFile)?;
    let test_id_raw = test_id_raw
        .filter(|v| !v.is_empty())
        .ok_or(ImportError::MissingTestId)?;
    let test_id =
        Uuid::parse_str(&test_id_raw).map_err(|_| ImportError::InvalidTestId(test_id_raw.clone()))?;

    let outcome = state.import_service.import(test_id, upload).await?;
    let imported = outcome.questions.len();

    Ok(Json(ImportSuccessResponse {
        success: true,
        imported,
        total: outcome.total_rows,
        empty_rows: outcome.empty_rows,
        questions: outcome.questions,
        message: format!("Successfully imported {} question(s)", imported),
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/questions/import/template",
    params(
        ("format" = Option<String>, Query, description = "xlsx (default) or csv")
    ),
    responses(
        (status = 200, description = "Import template file"),
        (status = 400, description = "Unknown format"),
    ),
)]
pub async fn download_template(
    Query(query): Query<TemplateQuery>,
) -> crate::error::Result<impl IntoResponse> {
    let format = query.format.unwrap_or_else(|| "xlsx".to_string()).to_ascii_lowercase();
    let (content_type, extension, buffer) = match format.as_str() {
        "xlsx" => (
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "xlsx",
            TemplateService::generate_xlsx()?,
        ),
        "csv" => ("text/csv; charset=utf-8", "csv", TemplateService::generate_csv()?),
        other => {
            return Err(Error::BadRequest(format!(
                "Unknown template format '{}'. Use xlsx or csv",
                other
            )))
        }
    };
    let disposition = format!("attachment; filename=\"question_import_template.{}\"", extension);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
