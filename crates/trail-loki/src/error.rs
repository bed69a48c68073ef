//! Error types for querying Loki.

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cluster credentials: {0}")]
    Credentials(String),

    #[error("discovery: {0}")]
    Discovery(String),

    #[error("transport: {0}")]
    Transport(#[source] BoxError),

    /// Non-success reply from Loki; `body` is the raw response text
    #[error("{body}")]
    Backend { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}

impl From<kube::Error> for Error {
    fn from(e: kube::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
