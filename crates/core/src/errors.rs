use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type RosterResult<T> = Result<T, RosterError>;

impl RosterError {
    pub fn not_found(what: impl Into<String>) -> Self {
        RosterError::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        RosterError::Validation(msg.into())
    }
}
