use thiserror::Error;

/// Typed error for Jellyfin API calls.
///
/// `Clone` so a single failed page fetch can be reported to every caller
/// waiting on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JellyfinApiError {
    /// 401 / 403: the access token was rejected
    #[error("Authentication failed: {message} (status: {status})")]
    Authentication { status: u16, message: String },

    #[error("Item not found: {message}")]
    NotFound { message: String },

    #[error("Client error: {message} (status: {status})")]
    ClientError { status: u16, message: String },

    #[error("Server error: {message} (status: {status})")]
    ServerError { status: u16, message: String },

    /// Timeouts, refused connections, DNS failures
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid server url: {0}")]
    InvalidUrl(String),

    #[error("API error: {0}")]
    Other(String),
}

impl JellyfinApiError {
    /// Whether a later attempt could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            JellyfinApiError::Network(_) | JellyfinApiError::ServerError { .. }
        )
    }

    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            JellyfinApiError::Network(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            JellyfinApiError::Network(format!("Connection failed: {}", error))
        } else if error.is_decode() {
            JellyfinApiError::Parse(error.to_string())
        } else if error.is_request() {
            JellyfinApiError::Network(format!("Request error: {}", error))
        } else {
            JellyfinApiError::Other(error.to_string())
        }
    }

    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => JellyfinApiError::Authentication {
                status,
                message: body,
            },
            404 => JellyfinApiError::NotFound { message: body },
            400..=499 => JellyfinApiError::ClientError {
                status,
                message: body,
            },
            500..=599 => JellyfinApiError::ServerError {
                status,
                message: body,
            },
            _ => JellyfinApiError::Other(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<serde_json::Error> for JellyfinApiError {
    fn from(error: serde_json::Error) -> Self {
        JellyfinApiError::Parse(error.to_string())
    }
}

impl From<url::ParseError> for JellyfinApiError {
    fn from(error: url::ParseError) -> Self {
        JellyfinApiError::InvalidUrl(error.to_string())
    }
}
