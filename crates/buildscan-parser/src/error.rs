use std::fmt;
use std::path::PathBuf;

/// Result type for buildscan-parser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the parser layer.
///
/// Only failures that must abort a run surface here; everything else is
/// reported through the diagnostic sink and skipped.
#[derive(Debug)]
pub enum Error {
    /// A build log could not be opened or read
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    pub fn log_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::LogFile {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LogFile { path, source } => {
                write!(f, "Failed to read log file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::LogFile { source, .. } => Some(source),
        }
    }
}
