//! Error types for fetching remote collections and link lookups.

/// Failure of a single fetch attempt. Every variant is terminal for that attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Request rejected by the transport or answered with a non-2xx status.
    #[error("{0}")]
    Network(String),

    /// 404 from a link lookup; carries the server's `detail` message.
    #[error("{0}")]
    NotFound(String),

    /// Body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    Parse(String),

    /// Page number or page size out of range; no request was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Local I/O while saving a downloaded file.
    #[error("io error: {0}")]
    Io(String),

    /// Downloaded bytes do not hash to the advertised SHA-256.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

/// Configuration problems (bad URL, unreadable CA file).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("page size must be between 1 and {max}, got {got}")]
    PageSize { got: u32, max: u32 },

    #[error("reading TLS CA {path}: {source}")]
    TlsCa {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("building HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;
