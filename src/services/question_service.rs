use crate::dto::question_dto::PaginatedQuestions;
use crate::error::Result;
use crate::models::personality_dimension::PersonalityDimension;
use crate::models::question::Question;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_test(
        &self,
        test_id: Uuid,
        page: i64,
        per_page: i64,
    ) -> Result<PaginatedQuestions> {
        let offset = (page - 1) * per_page;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions WHERE test_id = $1")
            .bind(test_id)
            .fetch_one(&self.pool)
            .await?;
        let total = total.0;

        let total_pages = if per_page > 0 {
            ((total as f64) / (per_page as f64)).ceil() as i64
        } else {
            1
        };

        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT
                id, test_id, question_type, prompt_text, prompt_image_url, answer_options,
                correct_answer_index, answer_weights, personality_dimension_id,
                timer_seconds, category, section_tag, created_at
            FROM questions
            WHERE test_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(test_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(PaginatedQuestions {
            questions,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn list_dimensions(&self) -> Result<Vec<PersonalityDimension>> {
        let dimensions = sqlx::query_as::<_, PersonalityDimension>(
            r#"
            SELECT id, code, name, description, created_at
            FROM personality_dimensions
            ORDER BY code ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(dimensions)
    }
}
