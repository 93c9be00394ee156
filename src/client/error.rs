use thiserror::Error;

/// Where the admin UI sends the user once the server rejects their token.
pub const SESSION_EXPIRED_REDIRECT: &str = "/admin/login?session=expired";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the stored token; it has been discarded.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// Mutation attempted against a static deployment
    #[error("{0}")]
    StaticMode(&'static str),

    /// Rejected before sending
    #[error("{0}")]
    Validation(String),

    /// Non-success response from the server
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Upload timed out. Is the server running?")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Login screen to navigate to, if this error ends the admin session.
    pub fn login_redirect(&self) -> Option<&'static str> {
        match self {
            ClientError::SessionExpired => Some(SESSION_EXPIRED_REDIRECT),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::SessionExpired => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
