use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TocError {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error("{message}")]
    InvalidArgument { message: String },
}

impl TocError {
    /// Map an `io::Error` for `path`, keeping not-found distinct so the CLI can say so plainly.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            TocError::NotFound { path }
        } else {
            TocError::Io { path, source }
        }
    }

    /// Exit code used by the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            TocError::NotFound { .. } | TocError::Io { .. } => 2,
            TocError::Config { .. } | TocError::InvalidArgument { .. } => 3,
            TocError::Pattern { .. } => 4,
        }
    }
}
