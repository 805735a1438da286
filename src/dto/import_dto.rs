use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::import::validator::RowError;
use crate::models::question::Question;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSuccessResponse {
    pub success: bool,
    pub imported: usize,
    pub total: usize,
    pub empty_rows: usize,
    pub questions: Vec<Question>,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailureResponse {
    pub error: String,
    pub errors: Vec<RowError>,
    pub valid_rows: usize,
    pub total_rows: usize,
    pub empty_rows: usize,
    pub summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceFailureResponse {
    pub error: String,
    pub details: String,
    pub valid_questions: usize,
    pub created_questions: usize,
    pub debug_info: PersistenceDebugInfo,
    pub suggestion: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceDebugInfo {
    pub test_id: Uuid,
    pub total_rows: usize,
    pub empty_rows: usize,
    pub objective_questions: usize,
    pub personality_questions: usize,
}

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub format: Option<String>,
}
