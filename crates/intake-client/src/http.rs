//! HTTP client for the intake backend's patient and document endpoints.

use async_trait::async_trait;
use intake_core::{ActivationStatus, CreatedPatient, IndexingStatus, PatientPage};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::api::{DOCUMENTS_FIELD, PatientApi, StatusSource, Submission};
use crate::config::ClientConfig;
use crate::error::{ClientError, error_detail};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP client for the intake backend.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

/// Filters for `GET /api/patients/list/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatientQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Serialize)]
struct CheckActiveRequest<'a> {
    phone: &'a str,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn patients_url(&self) -> String {
        format!("{}/api/patients/", self.base_url)
    }

    fn status_url(&self, patient_id: &str) -> String {
        format!("{}/api/patients/{patient_id}/indexing-status/", self.base_url)
    }

    fn retry_url(&self, document_id: &str) -> String {
        format!("{}/api/documents/{document_id}/retry/", self.base_url)
    }

    /// Create a patient from form fields plus uploaded files.
    pub async fn create_patient(
        &self,
        submission: &Submission<'_>,
    ) -> Result<CreatedPatient, ClientError> {
        let url = self.patients_url();

        let mut form = Form::new();
        for (name, value) in &submission.fields {
            form = form.text(*name, value.clone());
        }
        for file in submission.documents {
            let content_type = if file.content_type.is_empty() {
                FALLBACK_CONTENT_TYPE
            } else {
                file.content_type.as_str()
            };
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(content_type)?;
            form = form.part(DOCUMENTS_FIELD, part);
        }

        info!(
            url = %url,
            documents = submission.documents.len(),
            "creating patient"
        );
        let resp = self.client.post(&url).multipart(form).send().await?;
        let created: CreatedPatient = read_json(resp).await?;
        info!(
            patient_id = %created.patient_id,
            documents = created.documents.len(),
            "patient created"
        );
        Ok(created)
    }

    pub async fn indexing_status(&self, patient_id: &str) -> Result<IndexingStatus, ClientError> {
        let url = self.status_url(patient_id);
        debug!(url = %url, "fetching indexing status");
        let resp = self.client.get(&url).send().await?;
        read_json(resp).await
    }

    pub async fn retry_document(&self, document_id: &str) -> Result<(), ClientError> {
        let url = self.retry_url(document_id);
        info!(url = %url, "retrying document indexing");
        let resp = self.client.post(&url).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    /// One page of the patient directory, newest first.
    pub async fn list_patients(&self, query: &PatientQuery) -> Result<PatientPage, ClientError> {
        let url = format!("{}/api/patients/list/", self.base_url);
        info!(url = %url, search = ?query.search, "listing patients");
        let resp = self.client.get(&url).query(query).send().await?;
        let page: PatientPage = read_json(resp).await?;
        info!(
            count = page.results.len(),
            total = page.total_count,
            "listed patients"
        );
        Ok(page)
    }

    /// Look up whether the patient registered under `phone` has activated
    /// their account.
    pub async fn check_active(&self, phone: &str) -> Result<ActivationStatus, ClientError> {
        let url = format!("{}/api/patients/check-active/", self.base_url);
        info!(url = %url, "checking patient activation");
        let resp = self
            .client
            .post(&url)
            .json(&CheckActiveRequest { phone })
            .send()
            .await?;
        read_json(resp).await
    }
}

/// Turn a non-2xx response into [`ClientError::Server`].
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Server {
        status: status.as_u16(),
        detail: error_detail(&body),
    })
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let resp = check_status(resp).await?;
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl PatientApi for ApiClient {
    async fn create_patient(
        &self,
        submission: &Submission<'_>,
    ) -> Result<CreatedPatient, ClientError> {
        ApiClient::create_patient(self, submission).await
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn fetch_status(&self, patient_id: &str) -> Result<IndexingStatus, ClientError> {
        self.indexing_status(patient_id).await
    }

    async fn retry_document(&self, document_id: &str) -> Result<(), ClientError> {
        ApiClient::retry_document(self, document_id).await
    }
}
