use crate::error::Result;
use crate::models::test::Test;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct TestService {
    pool: PgPool,
}

impl TestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_test(&self, test_id: Uuid) -> Result<Option<Test>> {
        let test = sqlx::query_as::<_, Test>(
            r#"
            SELECT id, title, description, time_limit_minutes, created_by, created_at, updated_at
            FROM tests
            WHERE id = $1
            "#,
        )
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(test)
    }

    pub async fn get_test_by_id(&self, test_id: Uuid) -> Result<Test> {
        self.find_test(test_id)
            .await?
            .ok_or_else(|| crate::error::Error::NotFound("Test not found".to_string()))
    }
}
