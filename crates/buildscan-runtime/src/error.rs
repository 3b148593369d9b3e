use std::fmt;

/// Result type for buildscan-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Analysis engine error
    Engine(buildscan_engine::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// JSON (de)serialization failed
    Json(serde_json::Error),

    /// Invalid patch manifest
    Patch(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Engine(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Patch(msg) => write!(f, "Patch error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Engine(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Config(_) | Error::Patch(_) => None,
        }
    }
}

impl From<buildscan_engine::Error> for Error {
    fn from(err: buildscan_engine::Error) -> Self {
        Error::Engine(err)
    }
}

impl From<buildscan_core::Error> for Error {
    fn from(err: buildscan_core::Error) -> Self {
        match err {
            buildscan_core::Error::Io(err) => Error::Io(err),
            buildscan_core::Error::Config(msg) => Error::Config(msg),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
