//! Document indexing status as reported by
//! `GET /api/patients/{id}/indexing-status/`.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    Pending,
    Processing,
    Indexed,
    Failed,
}

impl DocumentState {
    pub fn label(self) -> &'static str {
        match self {
            DocumentState::Pending => "pending",
            DocumentState::Processing => "processing",
            DocumentState::Indexed => "indexed",
            DocumentState::Failed => "failed",
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Per-document line of a status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatus {
    #[serde(deserialize_with = "crate::ident::deserialize")]
    pub id: String,
    pub filename: String,
    pub status: DocumentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One snapshot of a patient's document indexing progress.
///
/// The server owns this value; clients replace their copy wholesale on every
/// poll and never merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexingStatus {
    pub total_documents: u32,
    pub indexed: u32,
    pub processing: u32,
    pub failed: u32,
    pub pending: u32,
    /// Percentage, 0..=100.
    pub progress: f64,
    pub is_complete: bool,
    #[serde(default)]
    pub documents: Vec<DocumentStatus>,
}

/// How a completed indexing run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    FullSuccess { indexed: u32 },
    PartialSuccess { indexed: u32, failed: u32 },
}

impl Outcome {
    pub fn is_full_success(self) -> bool {
        matches!(self, Outcome::FullSuccess { .. })
    }
}

impl IndexingStatus {
    /// `None` while indexing is still running.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.is_complete {
            return None;
        }
        Some(if self.failed == 0 {
            Outcome::FullSuccess {
                indexed: self.indexed,
            }
        } else {
            Outcome::PartialSuccess {
                indexed: self.indexed,
                failed: self.failed,
            }
        })
    }

    /// Checks the counters against each other: the four buckets sum to the
    /// total, and a complete run has nothing pending or processing.
    ///
    /// The server is trusted; this only exists so callers can log a warning.
    pub fn is_consistent(&self) -> bool {
        let sum = self.indexed as u64
            + self.processing as u64
            + self.failed as u64
            + self.pending as u64;
        let counts_match = sum == self.total_documents as u64;
        let settled = !self.is_complete || (self.processing == 0 && self.pending == 0);
        counts_match && settled
    }

    pub fn failed_document_ids(&self) -> Vec<String> {
        self.documents
            .iter()
            .filter(|d| d.status == DocumentState::Failed)
            .map(|d| d.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_in_progress_snapshot() {
        let json = r#"{
            "total_documents": 3,
            "indexed": 1,
            "processing": 1,
            "failed": 0,
            "pending": 1,
            "progress": 33,
            "is_complete": false,
            "documents": [
                {"id": 11, "filename": "scan.pdf", "status": "indexed"},
                {"id": "12", "filename": "id.png", "status": "processing"},
                {"id": 13, "filename": "letter.docx", "status": "pending", "error": null}
            ]
        }"#;
        let status: IndexingStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.total_documents, 3);
        assert_eq!(status.progress, 33.0);
        assert!(status.is_consistent());
        assert_eq!(status.outcome(), None);
        assert_eq!(status.documents[0].id, "11");
        assert_eq!(status.documents[1].id, "12");
        assert_eq!(status.documents[2].error, None);
    }

    #[test]
    fn documents_default_to_empty() {
        let json = r#"{"total_documents": 0, "indexed": 0, "processing": 0,
            "failed": 0, "pending": 0, "progress": 0, "is_complete": true}"#;
        let status: IndexingStatus = serde_json::from_str(json).unwrap();
        assert!(status.documents.is_empty());
    }

    #[test]
    fn complete_without_failures_is_full_success() {
        let status = IndexingStatus {
            total_documents: 3,
            indexed: 3,
            progress: 100.0,
            is_complete: true,
            ..Default::default()
        };
        assert_eq!(status.outcome(), Some(Outcome::FullSuccess { indexed: 3 }));
    }

    #[test]
    fn complete_with_failures_is_partial_success() {
        let status = IndexingStatus {
            total_documents: 3,
            indexed: 1,
            failed: 2,
            progress: 100.0,
            is_complete: true,
            documents: vec![
                DocumentStatus {
                    id: "1".into(),
                    filename: "a.pdf".into(),
                    status: DocumentState::Indexed,
                    error: None,
                },
                DocumentStatus {
                    id: "2".into(),
                    filename: "b.pdf".into(),
                    status: DocumentState::Failed,
                    error: Some("OCR timeout".into()),
                },
                DocumentStatus {
                    id: "3".into(),
                    filename: "c.pdf".into(),
                    status: DocumentState::Failed,
                    error: None,
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            status.outcome(),
            Some(Outcome::PartialSuccess {
                indexed: 1,
                failed: 2
            })
        );
        assert_eq!(status.failed_document_ids(), vec!["2", "3"]);
    }

    #[test]
    fn inconsistent_counts_are_detected() {
        let status = IndexingStatus {
            total_documents: 4,
            indexed: 1,
            pending: 1,
            ..Default::default()
        };
        assert!(!status.is_consistent());

        let settled_but_pending = IndexingStatus {
            total_documents: 1,
            pending: 1,
            is_complete: true,
            ..Default::default()
        };
        assert!(!settled_but_pending.is_consistent());
    }

    #[test]
    fn unknown_document_state_is_rejected() {
        let json = r#"{"id": 1, "filename": "a.pdf", "status": "queued"}"#;
        assert!(serde_json::from_str::<DocumentStatus>(json).is_err());
    }
}
