use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::Question;

#[derive(Debug, Deserialize, Validate)]
pub struct ListQuestionsQuery {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 500, message = "per_page must be between 1 and 500"))]
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedQuestions {
    #[serde(rename = "items")]
    pub questions: Vec<Question>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}
