use serde::Serialize;
use url::Url;

use super::answer_key::answer_index;
use super::row::SheetRow;
use crate::models::question::{NewQuestion, QuestionCategory, QuestionKind, QuestionType};

pub const MIN_TIMER_SECONDS: i32 = 5;
pub const MAX_TIMER_SECONDS: i32 = 300;
pub const MIN_ANSWER_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub field: String,
    pub message: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Every cell was blank; counted separately and never reported.
    Empty,
    Invalid(Vec<RowError>),
    Valid(NewQuestion),
}

struct RowErrors {
    row: usize,
    errors: Vec<RowError>,
}

impl RowErrors {
    fn push(&mut self, field: &str, message: impl Into<String>, value: &str) {
        self.errors.push(RowError {
            row: self.row,
            field: field.to_string(),
            message: message.into(),
            value: value.to_string(),
        });
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Checks one row against the import rules. All rules run, so a single pass
/// reports every problem in the row.
pub fn validate_row(row: &SheetRow) -> RowOutcome {
    if row.is_blank() {
        return RowOutcome::Empty;
    }

    let mut errors = RowErrors {
        row: row.row_number,
        errors: Vec::new(),
    };

    if row.prompt_text.is_empty() {
        errors.push("promptText", "Prompt text is required", "");
    }

    let question_type = if row.question_type.is_empty() {
        Some(QuestionType::Objective)
    } else {
        match row.question_type.parse::<QuestionType>() {
            Ok(t) => Some(t),
            Err(()) => {
                errors.push(
                    "questionType",
                    "Question type must be OBJECTIVE or PERSONALITY",
                    &row.question_type,
                );
                None
            }
        }
    };

    let category = if row.category.is_empty() {
        errors.push("category", "Category is required", "");
        None
    } else {
        match row.category.parse::<QuestionCategory>() {
            Ok(c) => Some(c),
            Err(()) => {
                errors.push(
                    "category",
                    format!(
                        "Invalid category. Must be one of: {}",
                        QuestionCategory::allowed_values()
                    ),
                    &row.category,
                );
                None
            }
        }
    };

    let timer_seconds = match row.timer_seconds.parse::<i32>() {
        Ok(t) if (MIN_TIMER_SECONDS..=MAX_TIMER_SECONDS).contains(&t) => Some(t),
        Ok(_) => {
            errors.push(
                "timerSeconds",
                format!(
                    "Timer must be between {} and {} seconds",
                    MIN_TIMER_SECONDS, MAX_TIMER_SECONDS
                ),
                &row.timer_seconds,
            );
            None
        }
        Err(_) if row.timer_seconds.is_empty() => {
            errors.push("timerSeconds", "Timer seconds is required", "");
            None
        }
        Err(_) => {
            errors.push(
                "timerSeconds",
                "Timer seconds must be a whole number",
                &row.timer_seconds,
            );
            None
        }
    };

    let answer_options = row.answer_options();
    if answer_options.len() < MIN_ANSWER_OPTIONS {
        errors.push(
            "answerOptions",
            format!(
                "At least {} answer options are required (Answer A-F or answerOption1-6)",
                MIN_ANSWER_OPTIONS
            ),
            &answer_options.len().to_string(),
        );
    }

    let kind = match question_type {
        Some(QuestionType::Objective) => objective_kind(row, answer_options.len(), &mut errors),
        Some(QuestionType::Personality) => personality_kind(row, answer_options.len(), &mut errors),
        None => None,
    };

    if !row.prompt_image_url.is_empty() && !is_valid_image_url(&row.prompt_image_url) {
        errors.push(
            "promptImageUrl",
            "Image URL must be an absolute http(s) URL or a path starting with /",
            &row.prompt_image_url,
        );
    }

    if !errors.errors.is_empty() {
        return RowOutcome::Invalid(errors.errors);
    }

    match (category, timer_seconds, kind) {
        (Some(category), Some(timer_seconds), Some(kind)) => RowOutcome::Valid(NewQuestion {
            source_row: row.row_number,
            prompt_text: row.prompt_text.clone(),
            prompt_image_url: non_empty(&row.prompt_image_url),
            answer_options,
            timer_seconds,
            category,
            section_tag: non_empty(&row.section_tag),
            kind,
        }),
        _ => RowOutcome::Invalid(errors.errors),
    }
}

fn objective_kind(row: &SheetRow, option_count: usize, errors: &mut RowErrors) -> Option<QuestionKind> {
    if !row.answer_weights.is_empty() {
        errors.push(
            "answerWeights",
            "Answer weights must be empty for OBJECTIVE questions",
            &row.answer_weights,
        );
    }
    if !row.personality_dimension_code.is_empty() {
        errors.push(
            "personalityDimensionCode",
            "Personality dimension must be empty for OBJECTIVE questions",
            &row.personality_dimension_code,
        );
    }

    if row.correct_answer_index.is_empty() {
        errors.push(
            "correctAnswerIndex",
            "Correct answer is required for OBJECTIVE questions",
            "",
        );
        return None;
    }

    match answer_index(&row.correct_answer_index) {
        Some(idx) if idx < option_count => Some(QuestionKind::Objective {
            correct_answer_index: idx,
        }),
        Some(idx) => {
            errors.push(
                "correctAnswerIndex",
                format!(
                    "Correct answer points to option {} but only {} answer options are provided",
                    idx + 1,
                    option_count
                ),
                &row.correct_answer_index,
            );
            None
        }
        None => {
            errors.push(
                "correctAnswerIndex",
                "Correct answer must be a letter A-F",
                &row.correct_answer_index,
            );
            None
        }
    }
}

fn personality_kind(row: &SheetRow, option_count: usize, errors: &mut RowErrors) -> Option<QuestionKind> {
    if !row.correct_answer_index.is_empty() {
        errors.push(
            "correctAnswerIndex",
            "Correct answer must be empty for PERSONALITY questions",
            &row.correct_answer_index,
        );
    }

    let weights = if row.answer_weights.is_empty() {
        errors.push(
            "answerWeights",
            "Answer weights are required for PERSONALITY questions",
            "",
        );
        None
    } else {
        match serde_json::from_str::<Vec<f64>>(&row.answer_weights) {
            Ok(w) if w.len() == option_count => Some(w),
            Ok(w) => {
                errors.push(
                    "answerWeights",
                    format!(
                        "Answer weights has {} values but {} answer options are provided",
                        w.len(),
                        option_count
                    ),
                    &row.answer_weights,
                );
                None
            }
            Err(_) => {
                errors.push(
                    "answerWeights",
                    "Answer weights must be a JSON array of numbers, e.g. [1,2,3,4,5]",
                    &row.answer_weights,
                );
                None
            }
        }
    };

    if row.personality_dimension_code.is_empty() {
        errors.push(
            "personalityDimensionCode",
            "Personality dimension code is required for PERSONALITY questions",
            "",
        );
        return None;
    }

    weights.map(|answer_weights| QuestionKind::Personality {
        answer_weights,
        dimension_code: row.personality_dimension_code.clone(),
    })
}

fn is_valid_image_url(value: &str) -> bool {
    if value.starts_with('/') {
        return !value.starts_with("//");
    }
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub questions: Vec<NewQuestion>,
    pub errors: Vec<RowError>,
    pub total_rows: usize,
    pub empty_rows: usize,
    pub invalid_rows: usize,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn valid_rows(&self) -> usize {
        self.questions.len()
    }
}

pub fn validate_rows(rows: &[SheetRow]) -> ValidationReport {
    let mut report = ValidationReport {
        total_rows: rows.len(),
        ..ValidationReport::default()
    };
    for row in rows {
        match validate_row(row) {
            RowOutcome::Empty => report.empty_rows += 1,
            RowOutcome::Invalid(errors) => {
                report.invalid_rows += 1;
                report.errors.extend(errors);
            }
            RowOutcome::Valid(question) => report.questions.push(question),
        }
    }
    report
}
