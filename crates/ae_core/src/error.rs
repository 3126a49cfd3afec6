use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Store {
        status: Option<u16>,
        message: String,
    },

    #[error("Search error: {0}")]
    Search(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn store(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Store {
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
