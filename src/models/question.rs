use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Objective,
    Personality,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Objective => "OBJECTIVE",
            QuestionType::Personality => "PERSONALITY",
        }
    }
}

impl FromStr for QuestionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OBJECTIVE" => Ok(QuestionType::Objective),
            "PERSONALITY" => Ok(QuestionType::Personality),
            _ => Err(()),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section a question is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionCategory {
    Logical,
    Verbal,
    Numerical,
    AttentionToDetail,
    Mechanical,
    GeneralKnowledge,
    Personality,
    Other,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 8] = [
        QuestionCategory::Logical,
        QuestionCategory::Verbal,
        QuestionCategory::Numerical,
        QuestionCategory::AttentionToDetail,
        QuestionCategory::Mechanical,
        QuestionCategory::GeneralKnowledge,
        QuestionCategory::Personality,
        QuestionCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Logical => "LOGICAL",
            QuestionCategory::Verbal => "VERBAL",
            QuestionCategory::Numerical => "NUMERICAL",
            QuestionCategory::AttentionToDetail => "ATTENTION_TO_DETAIL",
            QuestionCategory::Mechanical => "MECHANICAL",
            QuestionCategory::GeneralKnowledge => "GENERAL_KNOWLEDGE",
            QuestionCategory::Personality => "PERSONALITY",
            QuestionCategory::Other => "OTHER",
        }
    }

    pub fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for QuestionCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or(())
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated question that has not been written yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub source_row: usize,
    pub prompt_text: String,
    pub prompt_image_url: Option<String>,
    pub answer_options: Vec<String>,
    pub timer_seconds: i32,
    pub category: QuestionCategory,
    pub section_tag: Option<String>,
    pub kind: QuestionKind,
}

impl NewQuestion {
    pub fn question_type(&self) -> QuestionType {
        match self.kind {
            QuestionKind::Objective { .. } => QuestionType::Objective,
            QuestionKind::Personality { .. } => QuestionType::Personality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "questionType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    #[serde(rename_all = "camelCase")]
    Objective { correct_answer_index: usize },
    #[serde(rename_all = "camelCase")]
    Personality {
        answer_weights: Vec<f64>,
        dimension_code: String,
    },
}

/// Stored question row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub test_id: Uuid,
    pub question_type: String,
    pub prompt_text: String,
    pub prompt_image_url: Option<String>,
    pub answer_options: Json<Vec<String>>,
    pub correct_answer_index: Option<i32>,
    pub answer_weights: Option<Json<Vec<f64>>>,
    pub personality_dimension_id: Option<Uuid>,
    pub timer_seconds: i32,
    pub category: String,
    pub section_tag: Option<String>,
    pub created_at: DateTime<Utc>,
}
