use thiserror::Error;

/// Errors that can occur during reference resolution.
#[derive(Error, Debug)]
pub enum RefmarkError {
    #[error("unknown reference type '{kind}'")]
    UnknownReferenceType { kind: String },

    #[error("malformed reference: {message} (attribute: {attribute})")]
    MalformedReference { message: String, attribute: String },

    #[error("store error: {message} (operation: {operation})")]
    Store { message: String, operation: String },

    #[error("policy error: {message}")]
    Policy { message: String },

    #[error("document error: {message}")]
    Document { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `RefmarkError`.
pub type Result<T> = std::result::Result<T, RefmarkError>;
