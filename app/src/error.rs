use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the invoicing core
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Database operation failed: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    Store(String),

    #[error("Stored record could not be (de)serialized: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timestamp could not be formatted: {0}")]
    Time(#[from] time::error::Format),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub(crate) fn sqlite_error_string(err: &rusqlite::Error) -> String {
    match err {
        rusqlite::Error::SqliteFailure(code, msg) => {
            let message = msg.clone().unwrap_or_default();
            format!(
                "sqlite(code={:?}, extended_code={}, msg={})",
                code.code, code.extended_code, message
            )
        }
        other => other.to_string(),
    }
}
