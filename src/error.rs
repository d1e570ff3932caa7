use thiserror::Error;

/// Convenient Result alias for Neurio API operations.
pub type Result<T> = std::result::Result<T, NeurioError>;

/// All errors that can occur when interacting with the Neurio API.
#[derive(Error, Debug)]
pub enum NeurioError {
    /// One of key, secret or sensor id was empty at construction.
    #[error("missing credentials: key, secret and sensor id are all required")]
    MissingCredentials,

    /// A required fetch parameter was absent; no request was sent.
    #[error("missing required parameter `{0}`")]
    MissingParameters(&'static str),

    /// A fetch was attempted before `connect` stored an access token.
    #[error("not connected: call `connect` before fetching samples")]
    NotConnected,

    /// The base URL in the settings could not be parsed.
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The HTTP client itself could not be built.
    #[error("failed to initialize HTTP transport: {reason}")]
    Transport { reason: String },

    /// The token request failed or its body held no access token.
    #[error("token request to {url} failed: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// A data request failed or its body was not valid JSON.
    #[error("request to {url} failed: {reason}")]
    FetchFailed { url: String, reason: String },
}
