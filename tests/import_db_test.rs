use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use question_import_backend::{
    admin_routes,
    config::ImportSettings,
    dto::import_dto::ImportSuccessResponse,
    error::{Error, Result},
    import::persist::{persist_questions, ImportSink},
    models::{
        personality_dimension::PersonalityDimension,
        question::{NewQuestion, Question, QuestionCategory, QuestionKind},
    },
    AppState,
};
use serde_json::Value as JsonValue;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "----question-import-boundary";

// These tests need a migrated Postgres; they are skipped when DATABASE_URL
// is not set.
async fn setup() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let url = env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    Some(pool)
}

fn app(pool: &PgPool) -> Router {
    admin_routes().with_state(AppState::with_settings(pool.clone(), ImportSettings::default()))
}

async fn seed_test(pool: &PgPool) -> Uuid {
    sqlx::query_scalar::<_, Uuid>("INSERT INTO tests (title) VALUES ($1) RETURNING id")
        .bind("Import Test")
        .fetch_one(pool)
        .await
        .expect("seed test")
}

async fn question_count(pool: &PgPool, test_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE test_id = $1")
        .bind(test_id)
        .fetch_one(pool)
        .await
        .expect("count")
}

fn unique_code() -> String {
    format!("T{}", &Uuid::new_v4().simple().to_string()[..10]).to_ascii_uppercase()
}

async fn upload_csv(app: Router, test_id: Uuid, csv: &str) -> (StatusCode, JsonValue) {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"testId\"\r\n\r\n{id}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"bank.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n\
         --{b}--\r\n",
        b = BOUNDARY,
        id = test_id,
        csv = csv
    );
    let req = Request::builder()
        .method("POST")
        .uri("/api/admin/questions/import")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn imports_objective_row_with_letter_key() {
    let Some(pool) = setup().await else { return };
    let test_id = seed_test(&pool).await;

    let csv = "promptText,category,timerSeconds,correctAnswerIndex,Answer A,Answer B,Answer C,Answer D\n\
               \"2+2?\",LOGICAL,30,B,3,4,5,6\n";
    let (status, body) = upload_csv(app(&pool), test_id, csv).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let response: ImportSuccessResponse = serde_json::from_value(body).unwrap();
    assert!(response.success);
    assert_eq!(response.imported, 1);
    assert_eq!(response.total, 1);
    let question = &response.questions[0];
    assert_eq!(question.correct_answer_index, Some(1));
    assert_eq!(question.answer_options.0, vec!["3", "4", "5", "6"]);
    assert_eq!(question.question_type, "OBJECTIVE");
    assert_eq!(question_count(&pool, test_id).await, 1);
}

#[tokio::test]
async fn personality_rows_share_one_auto_created_dimension() {
    let Some(pool) = setup().await else { return };
    let test_id = seed_test(&pool).await;
    let code = unique_code();

    let csv = format!(
        "promptText,questionType,category,timerSeconds,Answer A,Answer B,Answer C,Answer D,Answer E,answerWeights,personalityDimensionCode\n\
         I like parties,PERSONALITY,PERSONALITY,20,1,2,3,4,5,\"[1,2,3,4,5]\",{lower}\n\
         I like crowds,PERSONALITY,PERSONALITY,20,1,2,3,4,5,\"[5,4,3,2,1]\",{upper}\n",
        lower = code.to_ascii_lowercase(),
        upper = code
    );
    let (status, body) = upload_csv(app(&pool), test_id, &csv).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["imported"], 2);

    let dimensions = sqlx::query_as::<_, PersonalityDimension>(
        "SELECT id, code, name, description, created_at FROM personality_dimensions WHERE code = $1",
    )
    .bind(&code)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(dimensions.len(), 1);
    assert_eq!(
        dimensions[0].description.as_deref(),
        Some("Auto-created during question import")
    );

    let questions = sqlx::query_as::<_, Question>(
        r#"SELECT id, test_id, question_type, prompt_text, prompt_image_url, answer_options,
                  correct_answer_index, answer_weights, personality_dimension_id,
                  timer_seconds, category, section_tag, created_at
           FROM questions WHERE test_id = $1 ORDER BY created_at"#,
    )
    .bind(test_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(questions.len(), 2);
    for q in &questions {
        assert_eq!(q.personality_dimension_id, Some(dimensions[0].id));
        assert_eq!(q.correct_answer_index, None);
    }
    assert_eq!(
        questions[0].answer_weights.as_ref().map(|w| w.0.clone()),
        Some(vec![1.0, 2.0, 3.0, 4.0, 5.0])
    );

    // A second import reuses the dimension instead of creating another.
    let csv = format!(
        "promptText,questionType,category,timerSeconds,Answer A,Answer B,answerWeights,personalityDimensionCode\n\
         Quiet evenings,PERSONALITY,PERSONALITY,20,no,yes,\"[0,1]\",{}\n",
        code
    );
    let (status, _) = upload_csv(app(&pool), test_id, &csv).await;
    assert_eq!(status, StatusCode::OK);
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM personality_dimensions WHERE code = $1",
    )
    .bind(&code)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
    assert_eq!(question_count(&pool, test_id).await, 3);
}

#[tokio::test]
async fn unknown_test_is_not_found() {
    let Some(pool) = setup().await else { return };

    let csv = "promptText,category,timerSeconds,correctAnswerIndex,Answer A,Answer B\nQ?,VERBAL,30,A,x,y\n";
    let (status, body) = upload_csv(app(&pool), Uuid::new_v4(), csv).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Test not found");

    let req = Request::builder()
        .uri(format!("/api/admin/tests/{}/questions", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let resp = app(&pool).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lists_imported_questions_in_file_order() {
    let Some(pool) = setup().await else { return };
    let test_id = seed_test(&pool).await;

    let csv = "promptText,category,timerSeconds,correctAnswerIndex,Answer A,Answer B\n\
               First,LOGICAL,30,A,x,y\n\
               Second,VERBAL,45,B,x,y\n\
               Third,NUMERICAL,60,A,x,y\n";
    let (status, _) = upload_csv(app(&pool), test_id, csv).await;
    assert_eq!(status, StatusCode::OK);

    let req = Request::builder()
        .uri(format!("/api/admin/tests/{}/questions?page=1&per_page=2", test_id))
        .body(Body::empty())
        .unwrap();
    let resp = app(&pool).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let page: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["promptText"], "First");
    assert_eq!(items[1]["promptText"], "Second");
}

/// Delegates to a real transaction but fails the Nth insert.
struct FailingSink<'a, 'c> {
    tx: &'a mut Transaction<'c, Postgres>,
    inserts: usize,
    fail_at: usize,
}

impl ImportSink for FailingSink<'_, '_> {
    async fn find_dimension(&mut self, code: &str) -> Result<Option<PersonalityDimension>> {
        self.tx.find_dimension(code).await
    }

    async fn create_dimension(&mut self, code: &str) -> Result<PersonalityDimension> {
        self.tx.create_dimension(code).await
    }

    async fn insert_question(
        &mut self,
        test_id: Uuid,
        question: &NewQuestion,
        dimension_id: Option<Uuid>,
    ) -> Result<Question> {
        self.inserts += 1;
        if self.inserts == self.fail_at {
            return Err(Error::Internal("simulated insert failure".into()));
        }
        self.tx.insert_question(test_id, question, dimension_id).await
    }
}

#[tokio::test]
async fn failed_insert_leaves_no_questions_behind() {
    let Some(pool) = setup().await else { return };
    let test_id = seed_test(&pool).await;
    let code = unique_code();

    let questions: Vec<NewQuestion> = (0..10)
        .map(|i| NewQuestion {
            source_row: i + 2,
            prompt_text: format!("Question {}", i),
            prompt_image_url: None,
            answer_options: vec!["a".into(), "b".into()],
            timer_seconds: 30,
            category: QuestionCategory::Personality,
            section_tag: None,
            kind: QuestionKind::Personality {
                answer_weights: vec![0.0, 1.0],
                dimension_code: code.clone(),
            },
        })
        .collect();

    let mut tx = pool.begin().await.unwrap();
    let mut sink = FailingSink {
        tx: &mut tx,
        inserts: 0,
        fail_at: 5,
    };
    let result = persist_questions(&mut sink, test_id, &questions).await;
    assert!(result.is_err());
    drop(sink);
    tx.rollback().await.unwrap();

    assert_eq!(question_count(&pool, test_id).await, 0);
    let dimensions = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM personality_dimensions WHERE code = $1",
    )
    .bind(&code)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(dimensions, 0);
}

#[tokio::test]
async fn lists_personality_dimensions() {
    let Some(pool) = setup().await else { return };
    let code = unique_code();
    let mut tx = pool.begin().await.unwrap();
    tx.create_dimension(&code).await.unwrap();
    tx.commit().await.unwrap();

    let req = Request::builder()
        .uri("/api/admin/personality-dimensions")
        .body(Body::empty())
        .unwrap();
    let resp = app(&pool).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let dimensions: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert!(dimensions
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["code"] == code.as_str()));
}
