use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::Result;
use crate::models::personality_dimension::PersonalityDimension;
use crate::models::question::{NewQuestion, Question, QuestionKind};

pub const AUTO_DIMENSION_DESCRIPTION: &str = "Auto-created during question import";

/// Write side of an import. Every call happens inside one unit of work
/// that the caller commits or abandons as a whole.
#[allow(async_fn_in_trait)]
pub trait ImportSink {
    async fn find_dimension(&mut self, code: &str) -> Result<Option<PersonalityDimension>>;

    async fn create_dimension(&mut self, code: &str) -> Result<PersonalityDimension>;

    async fn insert_question(
        &mut self,
        test_id: Uuid,
        question: &NewQuestion,
        dimension_id: Option<Uuid>,
    ) -> Result<Question>;
}

/// Inserts every question in order, resolving personality dimensions by
/// upper-cased code and creating missing ones once per import.
pub async fn persist_questions<S: ImportSink>(
    sink: &mut S,
    test_id: Uuid,
    questions: &[NewQuestion],
) -> Result<Vec<Question>> {
    let mut dimensions: HashMap<String, Uuid> = HashMap::new();
    let mut created = Vec::with_capacity(questions.len());

    for question in questions {
        let dimension_id = match &question.kind {
            QuestionKind::Objective { .. } => None,
            QuestionKind::Personality { dimension_code, .. } => {
                let code = dimension_code.trim().to_ascii_uppercase();
                let id = match dimensions.get(&code) {
                    Some(id) => *id,
                    None => {
                        let dimension = match sink.find_dimension(&code).await? {
                            Some(existing) => existing,
                            None => {
                                let dimension = sink.create_dimension(&code).await?;
                                tracing::info!(
                                    code = %dimension.code,
                                    dimension_id = %dimension.id,
                                    "Created personality dimension during import"
                                );
                                dimension
                            }
                        };
                        dimensions.insert(code, dimension.id);
                        dimension.id
                    }
                };
                Some(id)
            }
        };

        let stored = sink.insert_question(test_id, question, dimension_id).await?;
        created.push(stored);
    }

    Ok(created)
}

impl ImportSink for Transaction<'_, Postgres> {
    async fn find_dimension(&mut self, code: &str) -> Result<Option<PersonalityDimension>> {
        let dimension = sqlx::query_as::<_, PersonalityDimension>(
            r#"
            SELECT id, code, name, description, created_at
            FROM personality_dimensions
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&mut **self)
        .await?;

        Ok(dimension)
    }

    async fn create_dimension(&mut self, code: &str) -> Result<PersonalityDimension> {
        // A concurrent import may have created the same code since the lookup.
        let dimension = sqlx::query_as::<_, PersonalityDimension>(
            r#"
            INSERT INTO personality_dimensions (code, name, description)
            VALUES ($1, $1, $2)
            ON CONFLICT (code) DO UPDATE SET code = EXCLUDED.code
            RETURNING id, code, name, description, created_at
            "#,
        )
        .bind(code)
        .bind(AUTO_DIMENSION_DESCRIPTION)
        .fetch_one(&mut **self)
        .await?;

        Ok(dimension)
    }

    async fn insert_question(
        &mut self,
        test_id: Uuid,
        question: &NewQuestion,
        dimension_id: Option<Uuid>,
    ) -> Result<Question> {
        let (correct_answer_index, answer_weights) = match &question.kind {
            QuestionKind::Objective {
                correct_answer_index,
            } => (Some(*correct_answer_index as i32), None),
            QuestionKind::Personality { answer_weights, .. } => {
                (None, Some(Json(answer_weights.clone())))
            }
        };

        let stored = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (
                test_id, question_type, prompt_text, prompt_image_url, answer_options,
                correct_answer_index, answer_weights, personality_dimension_id,
                timer_seconds, category, section_tag
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING
                id, test_id, question_type, prompt_text, prompt_image_url, answer_options,
                correct_answer_index, answer_weights, personality_dimension_id,
                timer_seconds, category, section_tag, created_at
            "#,
        )
        .bind(test_id)
        .bind(question.question_type().as_str())
        .bind(&question.prompt_text)
        .bind(&question.prompt_image_url)
        .bind(Json(&question.answer_options))
        .bind(correct_answer_index)
        .bind(answer_weights)
        .bind(dimension_id)
        .bind(question.timer_seconds)
        .bind(question.category.as_str())
        .bind(&question.section_tag)
        .fetch_one(&mut **self)
        .await?;

        Ok(stored)
    }
}
