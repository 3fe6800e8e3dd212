use std::path::PathBuf;

/// Errors that can occur loading a translation file.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The translation file could not be opened.
    #[error("failed to open translation file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading from the translation source failed mid-way.
    #[error("failed to read translation source: {0}")]
    Read(#[from] std::io::Error),

    /// A mapping line does not have the expected shape.
    #[error("malformed mapping on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, MapError>;
