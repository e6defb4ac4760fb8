//! Atomic document writer.
//!
//! The gateway may start reading the output file at any moment, so the
//! document is written to a temporary file in the target directory, synced,
//! and renamed over the destination. A failed run leaves the previous file
//! untouched.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use domain::KongDocument;
use tempfile::NamedTempFile;

/// The gateway reads the document as its own container user.
#[cfg(unix)]
const DOCUMENT_MODE: u32 = 0o644;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write temporary file next to {path}: {source}")]
    TempFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize gateway document: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("Failed to move generated document into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Serialize a document to the exact text that would be written.
pub fn render(document: &KongDocument) -> Result<String, WriteError> {
    Ok(document.to_yaml()?)
}

/// Serialize and atomically replace `path` with the document.
pub fn write_document(document: &KongDocument, path: &Path) -> Result<(), WriteError> {
    let contents = render(document)?;
    write_atomic(path, contents.as_bytes())
}

pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&dir).map_err(|source| WriteError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let temp_error = |source| WriteError::TempFile {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(&dir).map_err(temp_error)?;
    // Temp files are created 0600 and the rename keeps that mode.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(DOCUMENT_MODE))
            .map_err(temp_error)?;
    }
    file.write_all(contents).map_err(temp_error)?;
    file.as_file().sync_all().map_err(temp_error)?;

    file.persist(path).map_err(|e| WriteError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote gateway document");
    Ok(())
}
