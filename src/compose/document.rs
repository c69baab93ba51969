use std::path::{Path, PathBuf};

use tracing::debug;

use crate::compose::model::ComposeDocument;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("service '{service}' not found in compose document")]
    MissingService { service: String },
    #[error("failed to serialize compose document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn load_document(path: &Path) -> Result<ComposeDocument, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DocumentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrite `path` with `doc`. Written to a sibling tmp file then renamed so
/// a crash never leaves a truncated document behind.
pub fn save_document(path: &Path, doc: &ComposeDocument) -> Result<(), DocumentError> {
    let content = serde_json::to_string_pretty(doc).map_err(DocumentError::Serialize)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let write_err = |source| DocumentError::Write {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&tmp_path, content).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        write_err(source)
    })?;
    Ok(())
}

/// Load the document, run `edit` over it and store the result. Nothing is
/// written when loading or the edit fails.
pub fn update_document<F>(path: &Path, edit: F) -> Result<(), DocumentError>
where
    F: FnOnce(ComposeDocument) -> Result<ComposeDocument, DocumentError>,
{
    let doc = load_document(path)?;
    let next = edit(doc)?;
    save_document(path, &next)?;
    debug!(path = %path.display(), services = next.services.len(), "compose document updated");
    Ok(())
}
