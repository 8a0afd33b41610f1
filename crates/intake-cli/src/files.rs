//! Turning CLI file arguments into form selections.

use std::path::Path;

use anyhow::{Context, bail};
use intake_core::attachment::ACCEPTED_EXTENSIONS;
use intake_core::{SelectedFile, is_accepted_name};

/// Read `path` into a selection, guessing its content type from the
/// extension. Files the intake picker would not offer are refused.
pub async fn load_selection(path: &Path) -> anyhow::Result<SelectedFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("no usable file name in {}", path.display()))?
        .to_string();

    if !is_accepted_name(&name) {
        bail!(
            "{name}: unsupported file type (accepted: {})",
            ACCEPTED_EXTENSIONS.join(", ")
        );
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Ok(SelectedFile::new(name, content_type, bytes))
}

pub async fn load_selections(paths: &[impl AsRef<Path>]) -> anyhow::Result<Vec<SelectedFile>> {
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        out.push(load_selection(path.as_ref()).await?);
    }
    Ok(out)
}
