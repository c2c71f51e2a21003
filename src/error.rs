use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Charity not found in catalog: {0}")]
    UnknownCharity(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Coarse classification used by retry policies and the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkFailure,
    MalformedResponse,
    Usage,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NetworkFailure(_) => ErrorKind::NetworkFailure,
            AppError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            AppError::UnknownCharity(_) | AppError::ConfigError(_) => ErrorKind::Usage,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::NetworkFailure
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::MalformedResponse(e.to_string())
    }
}
