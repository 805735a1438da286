use bytes::Bytes;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::ImportSettings;
use crate::dto::import_dto::PersistenceDebugInfo;
use crate::error::{Error, Result};
use crate::import::parser::{detect_format, parse_spreadsheet};
use crate::import::persist::persist_questions;
use crate::import::validator::validate_rows;
use crate::import::ImportError;
use crate::models::question::{NewQuestion, Question, QuestionType};
use crate::services::test_service::TestService;

/// A spreadsheet received from the client.
#[derive(Debug, Clone)]
pub struct ImportUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug)]
pub struct ImportOutcome {
    pub questions: Vec<Question>,
    pub total_rows: usize,
    pub empty_rows: usize,
}

#[derive(Clone)]
pub struct ImportService {
    pool: PgPool,
    tests: TestService,
    settings: ImportSettings,
}

impl ImportService {
    pub fn new(pool: PgPool, settings: ImportSettings) -> Self {
        let tests = TestService::new(pool.clone());
        Self {
            pool,
            tests,
            settings,
        }
    }

    /// Parses, validates and stores a question bank for `test_id`.
    ///
    /// Nothing is written unless every non-empty row is valid, and the
    /// writes themselves are all-or-nothing.
    pub async fn import(
        &self,
        test_id: Uuid,
        upload: ImportUpload,
    ) -> std::result::Result<ImportOutcome, ImportError> {
        let format = detect_format(&upload.file_name, upload.content_type.as_deref()).ok_or_else(
            || ImportError::UnsupportedFileType {
                file_name: upload.file_name.clone(),
            },
        )?;
        if upload.data.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        if upload.data.len() > self.settings.max_upload_bytes {
            return Err(ImportError::FileTooLarge {
                size: upload.data.len(),
                limit: self.settings.max_upload_bytes,
            });
        }

        tracing::info!(
            test_id = %test_id,
            file_name = %upload.file_name,
            format = format.as_str(),
            bytes = upload.data.len(),
            "Starting question import"
        );

        let data = upload.data.clone();
        let rows = tokio::task::spawn_blocking(move || parse_spreadsheet(format, &data))
            .await
            .map_err(|e| Error::Internal(format!("Parser task failed: {}", e)))??;

        let report = validate_rows(&rows);
        tracing::info!(
            test_id = %test_id,
            total_rows = report.total_rows,
            valid_rows = report.valid_rows(),
            invalid_rows = report.invalid_rows,
            empty_rows = report.empty_rows,
            errors = report.errors.len(),
            "Validated import rows"
        );

        if report.has_errors() {
            return Err(ImportError::from_report(report));
        }
        if report.questions.is_empty() {
            return Err(ImportError::NoQuestions {
                total_rows: report.total_rows,
                empty_rows: report.empty_rows,
            });
        }

        if self.tests.find_test(test_id).await?.is_none() {
            return Err(ImportError::TestNotFound(test_id));
        }

        let questions = match self.persist(test_id, &report.questions).await {
            Ok(questions) => questions,
            Err(source) => {
                tracing::error!(
                    test_id = %test_id,
                    valid_questions = report.questions.len(),
                    error = %source,
                    "Question import rolled back"
                );
                let personality_questions = report
                    .questions
                    .iter()
                    .filter(|q| q.question_type() == QuestionType::Personality)
                    .count();
                return Err(ImportError::Persistence {
                    source,
                    debug_info: PersistenceDebugInfo {
                        test_id,
                        total_rows: report.total_rows,
                        empty_rows: report.empty_rows,
                        objective_questions: report.questions.len() - personality_questions,
                        personality_questions,
                    },
                    valid_questions: report.questions.len(),
                });
            }
        };

        tracing::info!(
            test_id = %test_id,
            imported = questions.len(),
            total_rows = report.total_rows,
            empty_rows = report.empty_rows,
            "Question import completed"
        );

        Ok(ImportOutcome {
            questions,
            total_rows: report.total_rows,
            empty_rows: report.empty_rows,
        })
    }

    /// Inserts all questions inside one transaction. Waiting for a
    /// connection and running the inserts are bounded separately; on any
    /// error or timeout the transaction is dropped and rolled back.
    pub async fn persist(&self, test_id: Uuid, questions: &[NewQuestion]) -> Result<Vec<Question>> {
        let mut tx = tokio::time::timeout(self.settings.tx_max_wait, self.pool.begin())
            .await
            .map_err(|_| {
                Error::Internal(format!(
                    "Timed out after {}s waiting to start the import transaction",
                    self.settings.tx_max_wait.as_secs()
                ))
            })??;

        let statement_timeout = format!(
            "SET LOCAL statement_timeout = {}",
            self.settings.tx_timeout.as_millis()
        );
        sqlx::query(&statement_timeout).execute(&mut *tx).await?;

        let created = tokio::time::timeout(
            self.settings.tx_timeout,
            persist_questions(&mut tx, test_id, questions),
        )
        .await
        .map_err(|_| {
            Error::Internal(format!(
                "Import transaction exceeded {}s and was rolled back",
                self.settings.tx_timeout.as_secs()
            ))
        })??;

        tx.commit().await?;
        Ok(created)
    }
}
