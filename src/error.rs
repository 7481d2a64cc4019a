use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while the
/// tool downloads, converts, or reports on dealer workbooks.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the vendor HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] umya_spreadsheet::XlsxError),

    /// Raised when a workbook does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a required environment variable is absent.
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    /// Raised when a configured mail address fails to parse.
    #[error("invalid mail address: {0}")]
    MailAddress(#[from] lettre::address::AddressError),

    /// Raised when the digest message cannot be assembled.
    #[error("mail build error: {0}")]
    MailBuild(#[from] lettre::error::Error),

    /// Raised when the SMTP relay rejects or drops the digest.
    #[error("mail send error: {0}")]
    MailSend(#[from] lettre::transport::smtp::Error),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
