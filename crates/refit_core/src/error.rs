use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source article unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Search provider error: {0}")]
    SearchProvider(String),

    #[error("No references found for \"{0}\"")]
    NoReferencesFound(String),

    #[error("Extraction failed for {url}: {reason}")]
    ExtractionFailed { url: String, reason: String },

    #[error("Insufficient references: found {found}, need {required}")]
    InsufficientReferences { found: usize, required: usize },

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("No model available: all {attempted} candidates failed")]
    NoModelAvailable { attempted: usize },

    #[error("Publish rejected{}: {body}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    PublishRejected { status: Option<u16>, body: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::InvalidUrl(e.to_string())
    }
}

impl Error {
    pub fn extraction(url: &str, reason: impl ToString) -> Self {
        Error::ExtractionFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
