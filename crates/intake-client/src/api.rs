//! Seams between the controller/poller and the backend.
//!
//! [`ApiClient`](crate::ApiClient) is the HTTP implementation; tests swap in
//! in-memory fakes.

use async_trait::async_trait;
use intake_core::{AttachedFile, CreatedPatient, IndexingStatus};

use crate::error::ClientError;

/// Multipart field name shared by every uploaded file.
pub const DOCUMENTS_FIELD: &str = "documents";

/// Everything sent by one `POST /api/patients/` call.
#[derive(Debug)]
pub struct Submission<'a> {
    /// `(external_name, value)` pairs, optional fields included as `""`.
    pub fields: Vec<(&'static str, String)>,
    /// Files sent as repeated [`DOCUMENTS_FIELD`] parts.
    pub documents: &'a [AttachedFile],
}

#[async_trait]
pub trait PatientApi: Send + Sync {
    async fn create_patient(&self, submission: &Submission<'_>)
    -> Result<CreatedPatient, ClientError>;
}

#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, patient_id: &str) -> Result<IndexingStatus, ClientError>;

    /// Ask the backend to re-run indexing for one document. The response body
    /// is not interpreted.
    async fn retry_document(&self, document_id: &str) -> Result<(), ClientError>;
}
