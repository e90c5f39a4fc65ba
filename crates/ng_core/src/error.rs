use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Every query of a batch failed.
    #[error("Upstream news source unavailable: all {attempted} queries failed")]
    UpstreamUnavailable { attempted: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The upstream answered, but not with a usable article list.
    #[error("Upstream error (status {status}): {code}")]
    Upstream { status: u16, code: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable machine-readable code for the error, safe to show to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Error::UpstreamUnavailable { .. } => "upstream_unavailable",
            Error::InvalidInput(_) => "invalid_input",
            Error::Upstream { .. } | Error::Http(_) => "upstream_error",
            Error::Serialization(_) => "serialization_error",
            Error::Config(_) => "config_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
