//! Intake form controller: field edits, attachments, submission, and the
//! progress view that follows it.

use std::time::Duration;

use intake_core::{
    AttachedFile, AttachmentList, CreatedPatient, IntakeField, IntakeRecord, SelectedFile,
};
use tracing::{error, info, warn};

use crate::api::{PatientApi, Submission};
use crate::error::SubmitError;
use crate::poller::Completion;

/// Where the user lands after a finished intake.
pub const PATIENTS_ROUTE: &str = "/dashboard/patients";

const CREATED_NAVIGATION_DELAY: Duration = Duration::from_secs(1);
const INDEXED_NAVIGATION_DELAY: Duration = Duration::from_secs(2);

/// A navigation the caller should perform after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub route: &'static str,
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Indexing { patient_id: String, patient_name: String },
    Done,
}

/// Visibility of the indexing progress view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressView {
    Hidden,
    Expanded,
    /// Detailed view dismissed while indexing continues; a compact indicator
    /// stays on screen.
    Background,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Patient created with no documents to index.
    Created {
        patient: CreatedPatient,
        navigation: Navigation,
    },
    /// Patient created; hand `patient_id` to a
    /// [`StatusPoller`](crate::StatusPoller).
    Indexing {
        patient_id: String,
        patient_name: String,
    },
}

#[derive(Debug)]
pub struct IntakeForm {
    record: IntakeRecord,
    attachments: AttachmentList,
    phase: FormPhase,
    view: ProgressView,
}

impl Default for IntakeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeForm {
    pub fn new() -> Self {
        Self::with_record(IntakeRecord::new())
    }

    pub fn with_record(record: IntakeRecord) -> Self {
        Self {
            record,
            attachments: AttachmentList::new(),
            phase: FormPhase::Editing,
            view: ProgressView::Hidden,
        }
    }

    pub fn record(&self) -> &IntakeRecord {
        &self.record
    }

    pub fn set_field(&mut self, field: IntakeField, value: impl Into<String>) {
        self.record.set(field, value);
    }

    /// Add the selected files in order, returning their new ids.
    ///
    /// Selections are taken by value, so the same file can be picked again
    /// later and becomes a separate attachment.
    pub fn attach(&mut self, files: impl IntoIterator<Item = SelectedFile>) -> Vec<String> {
        self.attachments.add(files)
    }

    pub fn remove_attachment(&mut self, id: &str) -> bool {
        self.attachments.remove(id)
    }

    pub fn attachments(&self) -> &[AttachedFile] {
        self.attachments.as_slice()
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn view(&self) -> ProgressView {
        self.view
    }

    /// Validate and send the form as one multipart create request.
    ///
    /// A validation failure returns before any request is made. On any
    /// failure the record and attachments are left as they were so the user
    /// can correct and resubmit; on success both are consumed.
    pub async fn submit(&mut self, api: &dyn PatientApi) -> Result<SubmitOutcome, SubmitError> {
        if let Err(e) = self.record.validate() {
            warn!(error = %e, "intake form rejected");
            return Err(e.into());
        }

        let submission = Submission {
            fields: self.record.to_form_fields(),
            documents: self.attachments.as_slice(),
        };
        let created = match api.create_patient(&submission).await {
            Ok(created) => created,
            Err(e) => {
                error!(error = %e, "patient creation failed");
                return Err(e.into());
            }
        };

        self.record = IntakeRecord::new();
        self.attachments.clear();

        if created.has_documents() {
            let patient_name = created.display_name();
            info!(
                patient_id = %created.patient_id,
                documents = created.documents.len(),
                "document indexing in progress"
            );
            self.phase = FormPhase::Indexing {
                patient_id: created.patient_id.clone(),
                patient_name: patient_name.clone(),
            };
            self.view = ProgressView::Expanded;
            Ok(SubmitOutcome::Indexing {
                patient_id: created.patient_id,
                patient_name,
            })
        } else {
            self.phase = FormPhase::Done;
            Ok(SubmitOutcome::Created {
                patient: created,
                navigation: Navigation {
                    route: PATIENTS_ROUTE,
                    delay: CREATED_NAVIGATION_DELAY,
                },
            })
        }
    }

    /// Close the detailed progress view. While indexing is still running
    /// this switches to the compact background indicator.
    pub fn dismiss_progress(&mut self) {
        self.view = match self.phase {
            FormPhase::Indexing { .. } => ProgressView::Background,
            _ => ProgressView::Hidden,
        };
    }

    /// Re-open the detailed view from the background indicator.
    pub fn expand_progress(&mut self) {
        if self.view == ProgressView::Background {
            self.view = ProgressView::Expanded;
        }
    }

    /// Record that indexing finished. Returns the navigation to perform, if
    /// any: only a run without failures navigates away on its own.
    pub fn on_indexing_complete(&mut self, completion: &Completion) -> Option<Navigation> {
        self.phase = FormPhase::Done;
        if self.view == ProgressView::Background {
            self.view = ProgressView::Hidden;
        }
        completion.outcome.is_full_success().then_some(Navigation {
            route: PATIENTS_ROUTE,
            delay: INDEXED_NAVIGATION_DELAY,
        })
    }
}
