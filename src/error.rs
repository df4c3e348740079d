use thiserror::Error;

/// Every failure a request can end in. The HTTP layer maps each variant to a
/// status code and a stable `code` string.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    Validation(String),

    /// No session, or a session with the wrong role.
    #[error("{0}")]
    Unauthorized(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_params(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "bad_params",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::DuplicateEmail(_) => "duplicate_email",
            AppError::NotFound(_) => "not_found",
            AppError::Db(_) => "db_query_failed",
            AppError::Internal(_) => "internal",
        }
    }

    /// Server-side faults, as opposed to a caller sending something wrong.
    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::Db(_) | AppError::Internal(_))
    }
}
