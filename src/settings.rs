use serde::Deserialize;
use std::time::Duration;

/// Credentials and transport options for a [`crate::NeurioClient`].
///
/// `key`, `secret` and `sensor_id` come from the Neurio developer portal and
/// are all required; the remaining fields tune the underlying HTTP transport.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub key: String,
    pub secret: String,
    pub sensor_id: String,
    /// Base URL of the API, `https://api-staging.neur.io/v1` when absent.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout for the underlying HTTP client. No timeout when absent.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl Settings {
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        sensor_id: impl Into<String>,
    ) -> Self {
        Settings {
            key: key.into(),
            secret: secret.into(),
            sensor_id: sensor_id.into(),
            base_url: None,
            timeout: None,
        }
    }

    /// The `base64(key:secret)` value sent in the `Authorization: Basic`
    /// header of the token request.
    pub fn basic_credential(&self) -> String {
        base64::encode(format!("{}:{}", self.key, self.secret))
    }

    pub(crate) fn has_credentials(&self) -> bool {
        !self.key.is_empty() && !self.secret.is_empty() && !self.sensor_id.is_empty()
    }
}
