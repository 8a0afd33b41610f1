//! Files attached to an intake form before submission.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Extensions the intake file picker offers.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "doc", "docx"];

/// Whether `name` carries one of [`ACCEPTED_EXTENSIONS`] (case-insensitive).
pub fn is_accepted_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ACCEPTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Coarse classification used to pick an icon for an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
    Document,
}

impl FileKind {
    /// Classify by content type: anything mentioning "image" is an image,
    /// then anything mentioning "pdf" is a PDF, everything else a document.
    pub fn classify(content_type: &str) -> Self {
        if content_type.contains("image") {
            FileKind::Image
        } else if content_type.contains("pdf") {
            FileKind::Pdf
        } else {
            FileKind::Document
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Pdf => "pdf",
            FileKind::Document => "document",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Megabyte label with two decimals, e.g. `"1.50 MB"`.
pub fn size_label(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// A file as handed over by whatever did the selecting (file dialog, CLI
/// argument, test).
#[derive(Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A selected file once it has been added to the form.
#[derive(Clone)]
pub struct AttachedFile {
    pub id: String,
    pub name: String,
    pub size: String,
    pub kind: FileKind,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AttachedFile {
    /// Take ownership of a selection, assigning it a fresh random id.
    pub fn from_selection(file: SelectedFile) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            size: size_label(file.bytes.len() as u64),
            kind: FileKind::classify(&file.content_type),
            name: file.name,
            content_type: file.content_type,
            bytes: file.bytes,
        }
    }
}

impl fmt::Debug for AttachedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &self.size)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Ordered list of attachments pending submission.
#[derive(Debug, Clone, Default)]
pub struct AttachmentList {
    files: Vec<AttachedFile>,
}

impl AttachmentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every selection in order, returning the ids assigned to them.
    pub fn add(&mut self, selection: impl IntoIterator<Item = SelectedFile>) -> Vec<String> {
        let start = self.files.len();
        self.files
            .extend(selection.into_iter().map(AttachedFile::from_selection));
        self.files[start..].iter().map(|f| f.id.clone()).collect()
    }

    /// Drop the attachment with `id`. Returns `false` if there was none.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        self.files.len() != before
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttachedFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[AttachedFile] {
        &self.files
    }

    pub fn ids(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(name: &str, content_type: &str, len: usize) -> SelectedFile {
        SelectedFile::new(name, content_type, vec![0u8; len])
    }

    #[test]
    fn classify_by_content_type() {
        assert_eq!(FileKind::classify("application/pdf"), FileKind::Pdf);
        assert_eq!(FileKind::classify("image/png"), FileKind::Image);
        assert_eq!(FileKind::classify("text/plain"), FileKind::Document);
        assert_eq!(FileKind::classify(""), FileKind::Document);
    }

    #[test]
    fn attached_file_classifies_examples() {
        let scan = AttachedFile::from_selection(pick("scan.pdf", "application/pdf", 10));
        let id = AttachedFile::from_selection(pick("id.png", "image/png", 10));
        let notes = AttachedFile::from_selection(pick("notes.txt", "text/plain", 10));
        assert_eq!(scan.kind, FileKind::Pdf);
        assert_eq!(id.kind, FileKind::Image);
        assert_eq!(notes.kind, FileKind::Document);
    }

    #[test]
    fn size_label_rounds_to_two_decimals() {
        assert_eq!(size_label(0), "0.00 MB");
        assert_eq!(size_label(1024 * 1024), "1.00 MB");
        assert_eq!(size_label(1024 * 1024 * 3 / 2), "1.50 MB");
        assert_eq!(size_label(250 * 1024), "0.24 MB");
    }

    #[test]
    fn ids_are_unique() {
        let mut list = AttachmentList::new();
        let ids = list.add(vec![
            pick("a.pdf", "application/pdf", 1),
            pick("a.pdf", "application/pdf", 1),
        ]);
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn add_and_remove_preserve_insertion_order() {
        let mut list = AttachmentList::new();
        let first = list.add(vec![
            pick("a.pdf", "application/pdf", 1),
            pick("b.png", "image/png", 1),
        ]);
        let second = list.add(vec![
            pick("c.doc", "application/msword", 1),
            pick("d.jpg", "image/jpeg", 1),
        ]);

        assert!(list.remove(&first[1]));
        assert!(!list.remove(&first[1]));
        assert!(list.remove(&second[0]));

        assert_eq!(list.ids(), vec![first[0].as_str(), second[1].as_str()]);
        let names: Vec<&str> = list.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "d.jpg"]);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut list = AttachmentList::new();
        list.add(vec![pick("a.pdf", "application/pdf", 1)]);
        assert!(!list.remove("missing"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn accepted_extensions() {
        assert!(is_accepted_name("scan.PDF"));
        assert!(is_accepted_name("photo.jpeg"));
        assert!(is_accepted_name("letter.docx"));
        assert!(!is_accepted_name("notes.txt"));
        assert!(!is_accepted_name("README"));
    }
}
