use crate::error::{NeurioError, Result};
use crate::samples::SamplesQuery;
use crate::settings::Settings;
use log::{debug, trace};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Base URL used when the settings don't override it.
pub const DEFAULT_BASE_URL: &str = "https://api-staging.neur.io/v1";

/// Client for the Neurio energy sensor cloud API.
///
/// Construct it with [`NeurioClient::new`], obtain a bearer token with
/// [`NeurioClient::connect`], then use the `fetch_*` methods to query sample
/// data for the configured sensor. Each fetch returns the decoded JSON body
/// as-is; no schema is enforced beyond what the server sends.
pub struct NeurioClient {
    settings: Settings,
    basic_credential: String,
    base_url: Url,
    http_client: Client,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl NeurioClient {
    /// Creates a client for the sensor named in `settings`.
    ///
    /// Fails with [`NeurioError::MissingCredentials`] when any of key, secret
    /// or sensor id is empty. The `base64(key:secret)` credential for the
    /// token request is computed once, here.
    pub fn new(settings: Settings) -> Result<Self> {
        if !settings.has_credentials() {
            return Err(NeurioError::MissingCredentials);
        }

        let basic_credential = settings.basic_credential();

        let raw_base_url = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(raw_base_url).map_err(|e| NeurioError::InvalidBaseUrl {
            url: raw_base_url.to_string(),
            reason: e.to_string(),
        })?;

        // Create the underlying http client, will be reused for every call
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| NeurioError::Transport {
            reason: e.to_string(),
        })?;

        Ok(NeurioClient {
            settings,
            basic_credential,
            base_url,
            http_client,
            access_token: None,
        })
    }

    /// Exchanges the client credentials for a bearer token.
    ///
    /// A single POST to `/oauth2/token`; no retries. On success the token is
    /// stored on the client and used by every subsequent fetch. On failure
    /// the previously stored token (if any) is left untouched.
    pub async fn connect(&mut self) -> Result<()> {
        let url = self.endpoint(&["oauth2", "token"])?;
        trace!("Requesting access token from '{}'", url);

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.settings.key.as_str()),
            ("client_secret", self.settings.secret.as_str()),
        ];

        let response = self
            .http_client
            .post(url.clone())
            .header("Authorization", format!("Basic {}", self.basic_credential))
            .form(&form)
            .send()
            .await
            .map_err(|e| connection_failed(&url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(connection_failed(
                &url,
                format!("server answered with status {}", status),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| connection_failed(&url, format!("malformed token response: {}", e)))?;

        self.access_token = Some(token.access_token);
        debug!("Connected: token endpoint issued an access token");
        Ok(())
    }

    /// GET the last live sample recorded for the sensor.
    pub async fn fetch_last_live(&self) -> Result<Value> {
        let mut url = self.endpoint(&["samples", "live", "last"])?;
        set_query_pairs(&mut url, &[("sensorId", &self.settings.sensor_id)]);
        self.get_json(url).await
    }

    /// GET recent live samples, optionally only those after the ISO-8601
    /// timestamp `last`.
    pub async fn fetch_recent_live(&self, last: Option<&str>) -> Result<Value> {
        let mut url = self.endpoint(&["samples", "live"])?;
        let mut pairs = vec![("sensorId", self.settings.sensor_id.as_str())];
        if let Some(last) = last {
            pairs.push(("last", last));
        }
        set_query_pairs(&mut url, &pairs);
        self.get_json(url).await
    }

    /// GET aggregated samples for a time range.
    pub async fn fetch_samples(&self, query: &SamplesQuery) -> Result<Value> {
        let url = self.samples_url(&["samples"], query)?;
        self.get_json(url).await
    }

    /// GET aggregated per-phase ("full") samples for a time range.
    pub async fn fetch_full_samples(&self, query: &SamplesQuery) -> Result<Value> {
        let url = self.samples_url(&["samples", "full"], query)?;
        self.get_json(url).await
    }

    /// GET energy statistics for a time range.
    pub async fn fetch_energy_stats(&self, query: &SamplesQuery) -> Result<Value> {
        let url = self.samples_url(&["samples", "stats"], query)?;
        self.get_json(url).await
    }

    /// Whether `connect` has stored an access token on this client.
    pub fn is_connected(&self) -> bool {
        self.access_token.is_some()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NeurioError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "base url cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // Query order is fixed: sensorId, then the required range parameters,
    // then the optional ones that were set.
    fn samples_url(&self, segments: &[&str], query: &SamplesQuery) -> Result<Url> {
        let (start, granularity) = query.require()?;
        let mut url = self.endpoint(segments)?;

        let frequency = query.frequency.map(|f| f.to_string());
        let mut pairs = vec![
            ("sensorId", self.settings.sensor_id.as_str()),
            ("start", start),
            ("granularity", granularity.as_str()),
        ];
        if let Some(end) = query.end.as_deref() {
            pairs.push(("end", end));
        }
        if let Some(frequency) = frequency.as_deref() {
            pairs.push(("frequency", frequency));
        }

        set_query_pairs(&mut url, &pairs);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        // Fail fast instead of sending a request the server will reject
        let access_token = self.access_token.as_ref().ok_or(NeurioError::NotConnected)?;

        trace!("GET {}", url);
        let response = self
            .http_client
            .get(url.clone())
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| fetch_failed(&url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(
                &url,
                format!("server answered with status {}", status),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| fetch_failed(&url, format!("response body is not valid JSON: {}", e)))
    }
}

// Timestamps keep their literal `:` here; `Url::query_pairs_mut` would
// form-encode them as `%3A`, which is not what the API documents.
fn set_query_pairs(url: &mut Url, pairs: &[(&str, &str)]) {
    let query = pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");
    url.set_query(Some(&query));
}

fn connection_failed(url: &Url, reason: String) -> NeurioError {
    NeurioError::ConnectionFailed {
        url: url.to_string(),
        reason,
    }
}

fn fetch_failed(url: &Url, reason: String) -> NeurioError {
    NeurioError::FetchFailed {
        url: url.to_string(),
        reason,
    }
}
