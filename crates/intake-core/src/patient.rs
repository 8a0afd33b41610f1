//! Patient payloads returned by the backend's patient endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `POST /api/patients/`.
///
/// `documents` holds one entry per stored upload. Only its length is
/// interpreted here, so entries are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedPatient {
    #[serde(deserialize_with = "crate::ident::deserialize")]
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub documents: Vec<serde_json::Value>,
}

impl CreatedPatient {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }
}

/// Row of `GET /api/patients/list/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    #[serde(deserialize_with = "crate::ident::deserialize")]
    pub id: String,
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub documents_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientPage {
    pub results: Vec<PatientSummary>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Response of `POST /api/patients/check-active/`.
///
/// An unknown phone number is not an HTTP error: the server answers with
/// `is_active: false`, no id, and an `error` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationStatus {
    pub is_active: bool,
    #[serde(default, deserialize_with = "crate::ident::deserialize_opt")]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub activated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}
