use std::fmt;

/// Result type for buildscan-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the engine layer
#[derive(Debug)]
pub enum Error {
    /// A build log could not be scanned
    Parser(buildscan_parser::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// A final invocation's output binary is missing
    MissingOutput {
        assembly_name: String,
        path: Option<String>,
    },

    /// The scanner thread pool could not be created
    ThreadPool(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parser(err) => write!(f, "Parser error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::MissingOutput {
                assembly_name,
                path: Some(path),
            } => write!(f, "Output assembly of {} does not exist: {}", assembly_name, path),
            Error::MissingOutput {
                assembly_name,
                path: None,
            } => write!(f, "No output assembly path for {}", assembly_name),
            Error::ThreadPool(msg) => write!(f, "Thread pool error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parser(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::MissingOutput { .. } | Error::ThreadPool(_) => None,
        }
    }
}

impl From<buildscan_parser::Error> for Error {
    fn from(err: buildscan_parser::Error) -> Self {
        Error::Parser(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
