//! Core types shared by the intake client and CLI: the form record, attached
//! files, indexing status snapshots, and patient directory rows.

pub mod attachment;
mod ident;
pub mod patient;
pub mod record;
pub mod status;

pub use attachment::{AttachedFile, AttachmentList, FileKind, SelectedFile, is_accepted_name};
pub use patient::{ActivationStatus, CreatedPatient, PatientPage, PatientSummary};
pub use record::{IntakeField, IntakeRecord, ValidationError};
pub use status::{DocumentState, DocumentStatus, IndexingStatus, Outcome};
