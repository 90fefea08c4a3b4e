use thiserror::Error;

/// Centralized error types for the infrastructure around the editor
///
/// Storage, media and transport failures are converted to this enum. The editing
/// engine keeps its own narrower errors (`EditError`, `ApplyError`, `SpliceError`)
/// and only wraps an `AppError` when a collaborator fails.
///
/// # Example
///
/// ```no_run
/// use tourcore::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[cfg(feature = "telegram")]
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors, e.g. media lists stored as text columns
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Media store rejected a key or file
    #[error("Media storage error: {0}")]
    Media(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced row or file does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
