use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use super::{CommitError, CommitOutcome, CommitWarning, DerivedKind};
use crate::db::repository;
use crate::models::{
    truncate_to, ConditionEntry, HealthRecord, MedicationEntry, ParameterEntry,
    RecommendationEntry, UploadMetadata, UploadedFile, ENTRY_NAME_MAX_LEN, ENTRY_TEXT_MAX_LEN,
    ENTRY_VALUE_MAX_LEN, SUMMARY_MAX_LEN,
};
use crate::pipeline::normalize::ExtractionResult;
use crate::storage::{document_path, FileStore};

/// Fans a confirmed extraction result out to storage and the data store.
///
/// Failure handling is deliberately asymmetric: the file upload and the
/// HealthRecord insert are fatal, the four derived writes are not. The
/// record with its file reference is what the user perceives as "my
/// upload"; derived rows are reconstructable from the stored document, so
/// losing some of them is degraded service, not data loss. No cross-table
/// transaction is used.
pub struct RecordCommitter {
    files: Box<dyn FileStore>,
}

impl RecordCommitter {
    pub fn new(files: Box<dyn FileStore>) -> Self {
        Self { files }
    }

    pub fn commit(
        &self,
        conn: &Connection,
        user_id: &Uuid,
        file: &UploadedFile,
        extraction: &ExtractionResult,
        metadata: &UploadMetadata,
    ) -> Result<CommitOutcome, CommitError> {
        // Step 1: store the original document, obtain a durable URL.
        let path = document_path(&file.name, &file.bytes);
        let url = self.files.upload(&path, &file.bytes)?;

        // Step 2: primary record. Nothing below runs if this fails.
        let record = HealthRecord {
            id: Uuid::new_v4(),
            user_id: *user_id,
            condition_id: metadata.condition_id,
            since: metadata.document_date,
            document_url: url.clone(),
            ai_summary: truncate_to(&extraction.summary, SUMMARY_MAX_LEN),
            created_at: chrono::Local::now().naive_local(),
        };
        repository::insert_health_record(conn, &record).map_err(|e| {
            tracing::error!(record_id = %record.id, error = %e, "health record write failed");
            CommitError::PrimaryWrite(e.to_string())
        })?;

        // Step 3: independent best-effort fan-out, all four always attempted.
        let mut warnings = Vec::new();
        self.write_parameters(conn, &record, extraction, &mut warnings);
        self.write_conditions(conn, &record, extraction, &mut warnings);
        self.write_medications(conn, &record, extraction, &mut warnings);
        self.write_recommendations(conn, &record, extraction, &mut warnings);

        tracing::info!(
            record_id = %record.id,
            warnings = warnings.len(),
            "record committed"
        );

        Ok(CommitOutcome {
            record_id: record.id,
            document_url: url,
            warnings,
        })
    }

    fn write_parameters(
        &self,
        conn: &Connection,
        record: &HealthRecord,
        extraction: &ExtractionResult,
        warnings: &mut Vec<CommitWarning>,
    ) {
        if extraction.parameters.is_empty() {
            return;
        }
        let rows: Vec<ParameterEntry> = extraction
            .parameters
            .iter()
            .map(|(name, value)| ParameterEntry {
                id: Uuid::new_v4(),
                record_id: record.id,
                user_id: record.user_id,
                name: truncate_to(name, ENTRY_NAME_MAX_LEN),
                value: truncate_to(value, ENTRY_VALUE_MAX_LEN),
                created_at: record.created_at,
            })
            .collect();
        if let Err(e) = repository::insert_parameter_entries(conn, &rows) {
            push_warning(warnings, DerivedKind::Parameters, e, record.id);
        }
    }

    fn write_conditions(
        &self,
        conn: &Connection,
        record: &HealthRecord,
        extraction: &ExtractionResult,
        warnings: &mut Vec<CommitWarning>,
    ) {
        if extraction.conditions.is_empty() {
            return;
        }
        let rows = named_rows(&extraction.conditions, record, |name, created_at| {
            ConditionEntry {
                id: Uuid::new_v4(),
                record_id: record.id,
                user_id: record.user_id,
                name,
                created_at,
            }
        });
        if let Err(e) = repository::insert_condition_entries(conn, &rows) {
            push_warning(warnings, DerivedKind::Conditions, e, record.id);
        }
    }

    fn write_medications(
        &self,
        conn: &Connection,
        record: &HealthRecord,
        extraction: &ExtractionResult,
        warnings: &mut Vec<CommitWarning>,
    ) {
        if extraction.medications.is_empty() {
            return;
        }
        let rows = named_rows(&extraction.medications, record, |name, created_at| {
            MedicationEntry {
                id: Uuid::new_v4(),
                record_id: record.id,
                user_id: record.user_id,
                name,
                created_at,
            }
        });
        if let Err(e) = repository::insert_medication_entries(conn, &rows) {
            push_warning(warnings, DerivedKind::Medications, e, record.id);
        }
    }

    fn write_recommendations(
        &self,
        conn: &Connection,
        record: &HealthRecord,
        extraction: &ExtractionResult,
        warnings: &mut Vec<CommitWarning>,
    ) {
        if extraction.recommendations.trim().is_empty() {
            return;
        }
        let rows = vec![RecommendationEntry {
            id: Uuid::new_v4(),
            record_id: record.id,
            user_id: record.user_id,
            text: truncate_to(&extraction.recommendations, ENTRY_TEXT_MAX_LEN),
            created_at: record.created_at,
        }];
        if let Err(e) = repository::insert_recommendation_entries(conn, &rows) {
            push_warning(warnings, DerivedKind::Recommendations, e, record.id);
        }
    }
}

fn named_rows<T>(
    names: &[String],
    record: &HealthRecord,
    make: impl Fn(String, NaiveDateTime) -> T,
) -> Vec<T> {
    names
        .iter()
        .map(|name| make(truncate_to(name, ENTRY_NAME_MAX_LEN), record.created_at))
        .collect()
}

fn push_warning(
    warnings: &mut Vec<CommitWarning>,
    kind: DerivedKind,
    error: crate::db::DatabaseError,
    record_id: Uuid,
) {
    tracing::warn!(
        record_id = %record_id,
        collection = kind.as_str(),
        error = %error,
        "derived write failed, record stands"
    );
    warnings.push(CommitWarning {
        kind,
        detail: error.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::storage::{LocalFileStore, StorageError};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    struct FailingStore;

    impl FileStore for FailingStore {
        fn upload(&self, _path: &str, _bytes: &[u8]) -> Result<String, StorageError> {
            Err(StorageError::Rejected("bucket offline".into()))
        }

        fn public_url(&self, path: &str) -> String {
            format!("/files/{path}")
        }
    }

    fn committer(dir: &tempfile::TempDir) -> RecordCommitter {
        RecordCommitter::new(Box::new(LocalFileStore::new(dir.path(), "/files")))
    }

    fn sample_file() -> UploadedFile {
        UploadedFile::new("labs.txt", "text/plain", b"HbA1c 7.2%".to_vec())
    }

    fn sample_metadata() -> UploadMetadata {
        UploadMetadata {
            condition_id: Uuid::new_v4(),
            document_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    fn full_extraction() -> ExtractionResult {
        ExtractionResult {
            parameters: BTreeMap::from([
                ("BP".to_string(), "120/80".to_string()),
                ("HbA1c".to_string(), "7.2%".to_string()),
            ]),
            conditions: vec!["Type 2 Diabetes".into()],
            medications: vec!["Metformin 500mg".into(), "Lisinopril 10mg".into()],
            recommendations: "Repeat HbA1c in 3 months".into(),
            summary: "Routine diabetes follow-up.".into(),
        }
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn commit_writes_record_and_all_derived_rows() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_memory_database().unwrap();
        let user_id = Uuid::new_v4();

        let outcome = committer(&dir)
            .commit(
                &conn,
                &user_id,
                &sample_file(),
                &full_extraction(),
                &sample_metadata(),
            )
            .unwrap();

        assert!(outcome.warnings.is_empty());
        let record = repository::get_health_record(&conn, &outcome.record_id)
            .unwrap()
            .unwrap();
        assert_eq!(record.user_id, user_id);
        assert_eq!(record.document_url, outcome.document_url);
        assert_eq!(record.ai_summary, "Routine diabetes follow-up.");

        assert_eq!(count(&conn, "parameter_entries"), 2);
        assert_eq!(count(&conn, "condition_entries"), 1);
        assert_eq!(count(&conn, "medication_entries"), 2);
        assert_eq!(count(&conn, "recommendation_entries"), 1);
    }

    #[test]
    fn empty_extraction_creates_bare_record() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_memory_database().unwrap();

        let outcome = committer(&dir)
            .commit(
                &conn,
                &Uuid::new_v4(),
                &sample_file(),
                &ExtractionResult::default(),
                &sample_metadata(),
            )
            .unwrap();

        // Zero derived rows is a valid terminal state, not an error
        assert!(outcome.warnings.is_empty());
        assert_eq!(count(&conn, "health_records"), 1);
        assert_eq!(count(&conn, "parameter_entries"), 0);
        assert_eq!(count(&conn, "condition_entries"), 0);
        assert_eq!(count(&conn, "medication_entries"), 0);
        assert_eq!(count(&conn, "recommendation_entries"), 0);
    }

    #[test]
    fn one_failed_derived_write_does_not_block_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_memory_database().unwrap();
        conn.execute_batch("DROP TABLE condition_entries").unwrap();

        let outcome = committer(&dir)
            .commit(
                &conn,
                &Uuid::new_v4(),
                &sample_file(),
                &full_extraction(),
                &sample_metadata(),
            )
            .unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, DerivedKind::Conditions);

        // The record and the other three collections all survived
        assert!(repository::get_health_record(&conn, &outcome.record_id)
            .unwrap()
            .is_some());
        assert_eq!(count(&conn, "parameter_entries"), 2);
        assert_eq!(count(&conn, "medication_entries"), 2);
        assert_eq!(count(&conn, "recommendation_entries"), 1);
    }

    #[test]
    fn storage_failure_aborts_before_any_write() {
        let conn = open_memory_database().unwrap();
        let committer = RecordCommitter::new(Box::new(FailingStore));

        let result = committer.commit(
            &conn,
            &Uuid::new_v4(),
            &sample_file(),
            &full_extraction(),
            &sample_metadata(),
        );

        assert!(matches!(result, Err(CommitError::Storage(_))));
        assert_eq!(count(&conn, "health_records"), 0);
        assert_eq!(count(&conn, "parameter_entries"), 0);
    }

    #[test]
    fn primary_write_failure_skips_derived_writes() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_memory_database().unwrap();
        // Dropping children first, then the parent, forces the primary
        // insert to fail while the store call still succeeds.
        conn.execute_batch(
            "DROP TABLE parameter_entries;
             DROP TABLE condition_entries;
             DROP TABLE medication_entries;
             DROP TABLE recommendation_entries;
             DROP TABLE health_records;",
        )
        .unwrap();

        let file = sample_file();
        let result = committer(&dir).commit(
            &conn,
            &Uuid::new_v4(),
            &file,
            &full_extraction(),
            &sample_metadata(),
        );

        assert!(matches!(result, Err(CommitError::PrimaryWrite(_))));
        // The file was stored before the failure — accepted orphan
        let stored = dir.path().join(document_path(&file.name, &file.bytes));
        assert!(stored.exists());
    }

    #[test]
    fn long_texts_truncated_to_storage_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_memory_database().unwrap();

        let extraction = ExtractionResult {
            summary: "s".repeat(5000),
            conditions: vec!["c".repeat(900)],
            recommendations: "r".repeat(5000),
            ..ExtractionResult::default()
        };

        let outcome = committer(&dir)
            .commit(
                &conn,
                &Uuid::new_v4(),
                &sample_file(),
                &extraction,
                &sample_metadata(),
            )
            .unwrap();

        let record = repository::get_health_record(&conn, &outcome.record_id)
            .unwrap()
            .unwrap();
        assert_eq!(record.ai_summary.len(), SUMMARY_MAX_LEN);

        let conditions = repository::get_conditions_for_record(&conn, &outcome.record_id).unwrap();
        assert_eq!(conditions[0].name.len(), ENTRY_NAME_MAX_LEN);

        let recs = repository::get_recommendations_for_record(&conn, &outcome.record_id).unwrap();
        assert_eq!(recs[0].text.len(), ENTRY_TEXT_MAX_LEN);
    }

    #[test]
    fn identical_reupload_reuses_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_memory_database().unwrap();
        let committer = committer(&dir);

        let first = committer
            .commit(
                &conn,
                &Uuid::new_v4(),
                &sample_file(),
                &ExtractionResult::default(),
                &sample_metadata(),
            )
            .unwrap();
        let second = committer
            .commit(
                &conn,
                &Uuid::new_v4(),
                &sample_file(),
                &ExtractionResult::default(),
                &sample_metadata(),
            )
            .unwrap();

        // Two records, one content-addressed file
        assert_ne!(first.record_id, second.record_id);
        assert_eq!(first.document_url, second.document_url);
        assert_eq!(count(&conn, "health_records"), 2);
    }
}
