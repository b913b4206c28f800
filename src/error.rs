//! Error types for the instagram-downloader application.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Input file not found: {}", .0.display())]
    InputFile(PathBuf),

    // Startup network errors
    #[error("Proxy connectivity check failed: {0}")]
    Connectivity(String),

    #[error("Cookie loading failed: {0}")]
    Auth(String),

    // Per-post fetch errors
    #[error("Post not found (deleted, private or invalid): {0}")]
    NotFound(String),

    #[error("Login required to access post: {0}")]
    AuthRequired(String),

    #[error("Rate limited by Instagram: {0}")]
    RateLimited(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Invalid post reference on line {line}: '{reference}'")]
    InvalidReference { line: usize, reference: String },

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error aborts the whole run.
    ///
    /// Only startup-phase failures are fatal; everything raised while handling
    /// a single post is logged and the loop moves on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::InputFile(_)
                | Error::Connectivity(_)
                | Error::Logging(_)
        )
    }

    /// Short label used in per-post failure log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not found",
            Error::AuthRequired(_) => "login required",
            Error::RateLimited(_) => "rate limited",
            Error::InvalidReference { .. } => "invalid reference",
            Error::Io(_) | Error::InvalidFilename(_) => "filesystem",
            Error::Http(_) | Error::Fetch(_) | Error::Json(_) => "fetch",
            _ => "error",
        }
    }
}

impl Error {
    /// Process exit code for an error that ended the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::ConfigValidation { .. }
            | Error::MissingConfig(_)
            | Error::InputFile(_)
            | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
            Error::Connectivity(_) => exit_codes::CONNECTIVITY_ERROR,
            _ => exit_codes::UNEXPECTED_ERROR,
        }
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONNECTIVITY_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
