use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::notify::{Notifier, Severity};
use super::service::ExtractionService;
use super::IngestError;
use crate::models::{UploadMetadata, UploadedFile};
use crate::pipeline::commit::{CommitError, CommitOutcome, RecordCommitter};
use crate::pipeline::extraction::{detect_category, ExtractionError, FileCategory};
use crate::pipeline::normalize::{normalize, ExtractionResult};

/// Workflow stages of one upload session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    #[default]
    Idle,
    FileSelected,
    Extracting,
    Reviewing,
    Committing,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Whether a placeholder result from an unavailable analysis service
    /// may be retried within the same session.
    pub retry_on_unavailable: bool,
    /// How long notifications stay on screen before auto-dismissing.
    pub notification_ttl: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            retry_on_unavailable: true,
            notification_ttl: Duration::from_secs(6),
        }
    }
}

#[derive(Default)]
struct WorkflowState {
    stage: UploadStage,
    file: Option<UploadedFile>,
    metadata: Option<UploadMetadata>,
    result: Option<ExtractionResult>,
    /// True while `result` is the service-unavailable placeholder.
    placeholder: bool,
    /// Bumped on cancel; an in-flight extraction whose captured generation
    /// no longer matches is discarded on arrival.
    generation: u64,
}

/// Drives one upload session: select → extract → review → confirm → commit,
/// with user-visible notifications at each transition.
///
/// One instance per upload; no state is shared between sessions. Methods
/// take `&self` so an embedding UI can hold the coordinator in an `Arc`
/// and cancel from another task.
pub struct UploadCoordinator {
    service: Arc<dyn ExtractionService>,
    committer: Arc<RecordCommitter>,
    notifier: Notifier,
    config: IngestConfig,
    user_id: Uuid,
    state: Mutex<WorkflowState>,
}

enum PreparedExtraction {
    SkippedUnavailable,
    Completed(Result<Value, ExtractionError>),
}

impl UploadCoordinator {
    pub fn new(
        service: Arc<dyn ExtractionService>,
        committer: Arc<RecordCommitter>,
        user_id: Uuid,
        config: IngestConfig,
    ) -> Self {
        Self {
            service,
            committer,
            notifier: Notifier::new(),
            config,
            user_id,
            state: Mutex::new(WorkflowState::default()),
        }
    }

    pub fn stage(&self) -> UploadStage {
        self.lock().stage
    }

    pub fn extraction(&self) -> Option<ExtractionResult> {
        self.lock().result.clone()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Select the document for this session. Image files short-circuit
    /// straight to review: the gateway does not offer image analysis.
    pub fn select_file(&self, file: UploadedFile) {
        let is_image = detect_category(&file.bytes) == FileCategory::Image;

        let mut state = self.lock();
        state.result = None;
        state.placeholder = false;

        if is_image {
            tracing::info!(file = %file.name, "image selected, skipping analysis");
            state.result = Some(ExtractionResult::default());
            state.stage = UploadStage::Reviewing;
            state.file = Some(file);
            drop(state);
            self.notify(
                "Image analysis is not available; you can still upload the document.",
                Severity::Warning,
            );
        } else {
            state.file = Some(file);
            state.stage = UploadStage::FileSelected;
        }
    }

    pub fn set_metadata(&self, metadata: UploadMetadata) {
        self.lock().metadata = Some(metadata);
    }

    /// Run the extraction step. Permitted from `FileSelected`, from
    /// `Failed` (user-initiated retry), and from a placeholder `Reviewing`
    /// state when the retry policy allows it.
    pub async fn run_extraction(&self) {
        let (file, generation) = {
            let mut state = self.lock();
            let retryable_placeholder = state.stage == UploadStage::Reviewing
                && state.placeholder
                && self.config.retry_on_unavailable;
            let allowed = matches!(
                state.stage,
                UploadStage::FileSelected | UploadStage::Failed
            ) || retryable_placeholder;
            if !allowed {
                return;
            }
            let Some(file) = state.file.clone() else {
                return;
            };
            state.stage = UploadStage::Extracting;
            (file, state.generation)
        };

        let service = self.service.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            if !service.analysis_available() {
                return PreparedExtraction::SkippedUnavailable;
            }
            PreparedExtraction::Completed(service.extract(&file))
        })
        .await;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::info!("discarding extraction result for a cancelled workflow");
            return;
        }

        match outcome {
            Ok(PreparedExtraction::SkippedUnavailable) => {
                state.result = Some(ExtractionResult::unavailable_placeholder());
                state.placeholder = true;
                state.stage = UploadStage::Reviewing;
                drop(state);
                self.notify(
                    "Analysis was skipped — the service is not configured. \
                     Your document can still be uploaded.",
                    Severity::Info,
                );
            }
            Ok(PreparedExtraction::Completed(Ok(value))) => {
                state.result = Some(normalize(&value));
                state.placeholder = false;
                state.stage = UploadStage::Reviewing;
                drop(state);
                self.notify("Document analyzed. Review the details below.", Severity::Success);
            }
            Ok(PreparedExtraction::Completed(Err(ExtractionError::ServiceUnavailable(detail)))) => {
                tracing::warn!(detail = %detail, "analysis service unavailable");
                state.result = Some(ExtractionResult::unavailable_placeholder());
                state.placeholder = true;
                state.stage = UploadStage::Reviewing;
                drop(state);
                self.notify(
                    "Could not reach the analysis service. \
                     Your document can still be uploaded without analysis.",
                    Severity::Warning,
                );
            }
            Ok(PreparedExtraction::Completed(Err(e)))
                if e.is_text_failure() || matches!(e, ExtractionError::UnsupportedMedia(_)) =>
            {
                tracing::warn!(error = %e, "document text could not be read");
                state.result = Some(ExtractionResult::default());
                state.placeholder = false;
                state.stage = UploadStage::Reviewing;
                drop(state);
                self.notify(
                    "Could not read your document's text; it will be uploaded without analysis.",
                    Severity::Warning,
                );
            }
            Ok(PreparedExtraction::Completed(Err(e))) => {
                tracing::error!(error = %e, "extraction failed");
                state.stage = UploadStage::Failed;
                drop(state);
                self.notify(
                    "The analysis service returned an unreadable result. \
                     Retry, or continue without analysis.",
                    Severity::Error,
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "extraction task failed");
                state.stage = UploadStage::Failed;
                drop(state);
                self.notify(
                    "Analysis failed unexpectedly. Retry, or continue without analysis.",
                    Severity::Error,
                );
            }
        }
    }

    /// Give up on analysis after a failure and proceed to review with an
    /// empty result.
    pub fn skip_analysis(&self) {
        let mut state = self.lock();
        if state.stage != UploadStage::Failed {
            return;
        }
        state.result = Some(ExtractionResult::default());
        state.placeholder = false;
        state.stage = UploadStage::Reviewing;
        drop(state);
        self.notify(
            "Continuing without analysis. Your document will still be uploaded.",
            Severity::Info,
        );
    }

    /// Abandon the workflow. Any extraction still in flight is discarded
    /// when it lands — the instance identity (generation) has moved on.
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.stage = UploadStage::Idle;
        state.file = None;
        state.metadata = None;
        state.result = None;
        state.placeholder = false;
        drop(state);
        self.notifier.dismiss();
    }

    /// Commit the reviewed result. Requires the file, the mandatory
    /// metadata, and a reviewed extraction — rejected locally otherwise.
    pub fn confirm(&self, conn: &Connection) -> Result<CommitOutcome, IngestError> {
        let (file, metadata, result) = {
            let mut state = self.lock();
            if state.stage != UploadStage::Reviewing {
                return Err(IngestError::NotReady(format!(
                    "cannot confirm from stage {:?}",
                    state.stage
                )));
            }
            let Some(file) = state.file.clone() else {
                return Err(IngestError::NotReady("no file selected".into()));
            };
            let Some(metadata) = state.metadata else {
                return Err(IngestError::NotReady(
                    "condition and document date are required".into(),
                ));
            };
            let Some(result) = state.result.clone() else {
                return Err(IngestError::NotReady("no extraction result".into()));
            };
            state.stage = UploadStage::Committing;
            (file, metadata, result)
        };

        let outcome = self
            .committer
            .commit(conn, &self.user_id, &file, &result, &metadata);

        let mut state = self.lock();
        match outcome {
            Ok(outcome) => {
                state.stage = UploadStage::Done;
                drop(state);
                if outcome.warnings.is_empty() {
                    self.notify("Record uploaded.", Severity::Success);
                } else {
                    self.notify(
                        "Record uploaded. Some analysis details could not be saved.",
                        Severity::Warning,
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                state.stage = UploadStage::Failed;
                drop(state);
                let message = match &e {
                    CommitError::Storage(_) => {
                        "Could not store your document. Nothing was saved — please try again."
                    }
                    CommitError::PrimaryWrite(_) => {
                        "Could not save your upload. Please try again."
                    }
                };
                self.notify(message, Severity::Error);
                Err(e.into())
            }
        }
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.notifier
            .show(message, severity, self.config.notification_ttl);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WorkflowState> {
        self.state.lock().expect("workflow lock")
    }
}
