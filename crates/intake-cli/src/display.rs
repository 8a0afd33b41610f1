//! Terminal rendering for indexing progress and patient lookups.
//!
//! Everything renders to a `String` so the layout can be checked in tests;
//! callers decide whether it goes to stdout or stderr.

use std::fmt::Write;

use intake_client::Completion;
use intake_core::{
    ActivationStatus, AttachedFile, DocumentState, IndexingStatus, Outcome, PatientPage,
};

const BAR_WIDTH: usize = 30;
const MAX_DOCUMENT_ROWS: usize = 20;

// ── Indexing progress ──

/// Detailed progress view: overall bar, counters, then one row per document.
pub fn render_status(patient_name: &str, status: &IndexingStatus, error: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Indexing documents for {patient_name} ===");
    let _ = writeln!(
        out,
        "  {:<12} {} {:>3.0}%",
        "progress",
        progress_bar(status.progress, BAR_WIDTH),
        status.progress
    );
    let _ = writeln!(
        out,
        "  {:<12} {} / {}",
        "processed", status.indexed, status.total_documents
    );
    let _ = writeln!(
        out,
        "  {:<12} {}",
        "status",
        if status.is_complete {
            "complete"
        } else {
            "in progress"
        }
    );
    let _ = writeln!(
        out,
        "  {:<12} indexed {} | processing {} | pending {} | failed {}",
        "counts", status.indexed, status.processing, status.pending, status.failed
    );

    if !status.documents.is_empty() {
        let _ = writeln!(out);
        let show = status.documents.len().min(MAX_DOCUMENT_ROWS);
        for doc in &status.documents[..show] {
            let _ = write!(
                out,
                "  {} {:<32} {}",
                state_marker(doc.status),
                doc.filename,
                doc.status
            );
            if let Some(err) = &doc.error {
                let _ = write!(out, "  ({err})");
            }
            let _ = writeln!(out);
        }
        if status.documents.len() > show {
            let _ = writeln!(
                out,
                "  ... and {} more",
                status.documents.len() - show
            );
        }
    }

    if let Some(err) = error {
        let _ = writeln!(out);
        let _ = writeln!(out, "  error: {err}");
    }

    if status.is_complete && status.failed > 0 {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  {} document(s) failed; run `intake retry <patient-id>` to try again",
            status.failed
        );
    }
    out
}

/// One-line indicator shown while the detailed view is in the background.
pub fn render_compact(patient_name: &str, status: &IndexingStatus) -> String {
    format!(
        "[indexing] {patient_name}: {:.0}% ({}/{})",
        status.progress, status.indexed, status.total_documents
    )
}

pub fn render_completion(completion: &Completion) -> String {
    match completion.outcome {
        Outcome::FullSuccess { indexed } => {
            format!("Indexing complete: {indexed} document(s) indexed successfully.")
        }
        Outcome::PartialSuccess { indexed, failed } => {
            format!("Indexing finished with errors: {indexed} succeeded, {failed} failed.")
        }
    }
}

fn state_marker(state: DocumentState) -> &'static str {
    match state {
        DocumentState::Indexed => "[ok]",
        DocumentState::Processing => "[..]",
        DocumentState::Pending => "[  ]",
        DocumentState::Failed => "[!!]",
    }
}

fn progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

// ── Submission ──

pub fn render_attachments(files: &[AttachedFile]) -> String {
    let mut out = String::new();
    for file in files {
        let _ = writeln!(out, "  {:<10} {:<32} {}", file.kind, file.name, file.size);
    }
    out
}

// ── Patient lookups ──

pub fn render_patient_page(page: &PatientPage) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== Patients (page {}, {} total) ===",
        page.page, page.total_count
    );
    if page.results.is_empty() {
        let _ = writeln!(out, "  (no patients)");
    }
    for p in &page.results {
        let created = p
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "  {:<8} {:<28} {:<16} {:<8} {:>3} docs  {}",
            p.id,
            p.full_name,
            p.phone,
            if p.is_active { "active" } else { "inactive" },
            p.documents_count,
            created
        );
    }
    if page.has_next {
        let _ = writeln!(out, "  more results on page {}", page.page + 1);
    }
    out
}

pub fn render_activation(phone: &str, status: &ActivationStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {phone} ===");
    let _ = writeln!(
        out,
        "  {:<12} {}",
        "active",
        if status.is_active { "yes" } else { "no" }
    );
    if let Some(id) = &status.patient_id {
        let _ = writeln!(out, "  {:<12} {}", "patient", id);
    }
    if let Some(name) = &status.full_name {
        let _ = writeln!(out, "  {:<12} {}", "name", name);
    }
    if let Some(at) = status.activated_at {
        let _ = writeln!(out, "  {:<12} {}", "activated", at.to_rfc3339());
    }
    if let Some(err) = &status.error {
        let _ = writeln!(out, "  {:<12} {}", "note", err);
    }
    out
}
