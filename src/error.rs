use std::path::PathBuf;

use thiserror::Error;

/// A name destined for direct interpolation into query text failed the
/// identifier allow-list. Always fatal to the current read: stored metadata
/// should never contain such a name, so seeing one means the catalog is
/// corrupted or someone is probing for injection.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsafe identifier {0:?}")]
pub struct UnsafeIdentifierError(pub String);

/// The source workbook could not be read or parsed. Fatal to the whole
/// generation run; no partial schema or seed artifact is written.
#[derive(Debug, Error)]
#[error("failed to read source workbook {path:?}: {reason}")]
pub struct SourceReadError {
    pub path: PathBuf,
    pub reason: String,
}

impl SourceReadError {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
