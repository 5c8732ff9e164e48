#[derive(Debug, thiserror::Error)]
pub enum WishlistError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Interrupted")]
    Interrupted,
}

impl WishlistError {
    /// True for network failures and non-2xx responses.
    pub fn is_transport(&self) -> bool {
        matches!(self, WishlistError::Http(_) | WishlistError::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, WishlistError>;
