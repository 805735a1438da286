use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use super::parser::{ParseError, SUPPORTED_EXTENSIONS};
use super::validator::{RowError, ValidationReport};
use crate::dto::import_dto::{
    PersistenceDebugInfo, PersistenceFailureResponse, ValidationFailureResponse,
};

/// Failures of the upload pipeline. Each variant renders its own JSON body
/// so the uploader sees counts and a suggestion, not just a message.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Test ID is required")]
    MissingTestId,

    #[error("Invalid test ID: {0}")]
    InvalidTestId(String),

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("File is {size} bytes; the limit is {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Invalid file type '{file_name}'")]
    UnsupportedFileType { file_name: String },

    #[error("Failed to parse file: {0}")]
    Parse(#[from] ParseError),

    #[error("{} validation error(s) in {invalid_rows} row(s)", .errors.len())]
    Validation {
        errors: Vec<RowError>,
        valid_rows: usize,
        invalid_rows: usize,
        total_rows: usize,
        empty_rows: usize,
    },

    #[error("No questions found in file")]
    NoQuestions { total_rows: usize, empty_rows: usize },

    #[error("Test {0} not found")]
    TestNotFound(Uuid),

    #[error("Failed to save questions: {source}")]
    Persistence {
        source: crate::error::Error,
        debug_info: PersistenceDebugInfo,
        valid_questions: usize,
    },

    #[error(transparent)]
    Request(#[from] crate::error::Error),
}

impl ImportError {
    pub fn from_report(report: ValidationReport) -> Self {
        ImportError::Validation {
            valid_rows: report.valid_rows(),
            invalid_rows: report.invalid_rows,
            total_rows: report.total_rows,
            empty_rows: report.empty_rows,
            errors: report.errors,
        }
    }
}

fn bad_request(error: String, suggestion: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error, "suggestion": suggestion })),
    )
        .into_response()
}

impl IntoResponse for ImportError {
    fn into_response(self) -> Response {
        match self {
            ImportError::MissingFile => bad_request(
                self.to_string(),
                "Attach the spreadsheet in the 'file' form field",
            ),
            ImportError::MissingTestId | ImportError::InvalidTestId(_) => bad_request(
                self.to_string(),
                "Send the target test's UUID in the 'testId' form field",
            ),
            ImportError::EmptyFile => bad_request(
                self.to_string(),
                "The uploaded file has no content; export the spreadsheet again and retry",
            ),
            ImportError::FileTooLarge { .. } => bad_request(
                self.to_string(),
                "Split the question bank into smaller files and import them one at a time",
            ),
            ImportError::UnsupportedFileType { .. } => bad_request(
                format!("Invalid file type. Supported formats: {}", SUPPORTED_EXTENSIONS),
                "Save the question bank as .xlsx, .xls or .csv and upload it again",
            ),
            ImportError::Parse(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Failed to parse file",
                    "details": err.to_string(),
                    "suggestion": "Make sure the file is a valid spreadsheet with the question columns on the first sheet. Download the import template if unsure.",
                })),
            )
                .into_response(),
            ImportError::Validation {
                errors,
                valid_rows,
                invalid_rows,
                total_rows,
                empty_rows,
            } => {
                let summary = format!(
                    "{} error(s) in {} of {} row(s) ({} valid, {} empty). Nothing was imported; fix the listed rows and upload the file again.",
                    errors.len(),
                    invalid_rows,
                    total_rows,
                    valid_rows,
                    empty_rows
                );
                let body = ValidationFailureResponse {
                    error: "Validation failed".to_string(),
                    errors,
                    valid_rows,
                    total_rows,
                    empty_rows,
                    summary,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ImportError::NoQuestions {
                total_rows,
                empty_rows,
            } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "No questions found in file",
                    "totalRows": total_rows,
                    "emptyRows": empty_rows,
                    "suggestion": "Fill in at least one question row below the header row",
                })),
            )
                .into_response(),
            ImportError::TestNotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Test not found" })),
            )
                .into_response(),
            ImportError::Persistence {
                source,
                debug_info,
                valid_questions,
            } => {
                let body = PersistenceFailureResponse {
                    error: "Failed to save questions".to_string(),
                    details: source.to_string(),
                    valid_questions,
                    created_questions: 0,
                    debug_info,
                    suggestion: "No questions were saved. Check that the test still exists and try again; if the problem persists, split the file into smaller batches.".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ImportError::Request(err) => err.into_response(),
        }
    }
}
