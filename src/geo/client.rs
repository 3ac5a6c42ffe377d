//! Upstream geolocation provider client.

use std::time::Duration;

use serde_json::Value;

use crate::models::LocationInfo;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Geolocation lookup failure.
#[derive(Debug)]
pub enum GeoError {
    /// Network or decode failure talking to the provider
    Http(reqwest::Error),
    /// The provider answered but reported a failure
    Upstream(String),
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::Http(err) => write!(f, "geolocation request failed: {}", err),
            GeoError::Upstream(message) => write!(f, "geolocation lookup failed: {}", message),
        }
    }
}

impl std::error::Error for GeoError {}

/// Client for the external IP geolocation provider.
///
/// The provider infers the caller's address from the connection when no
/// explicit target is given, which is exactly what we want for requests whose
/// apparent address is non-routable.
pub struct GeoClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Look up `ip`, or let the provider infer the address when `None`.
    pub async fn lookup(&self, ip: Option<&str>) -> Result<LocationInfo, GeoError> {
        let url = match ip {
            Some(ip) => format!("{}/{}", self.base_url, ip),
            None => format!("{}/", self.base_url),
        };

        let response = self
            .http
            .get(&url)
            // Per-requester data; never accept an intermediate cache's answer.
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(GeoError::Http)?;

        if !response.status().is_success() {
            return Err(GeoError::Upstream(format!(
                "provider returned status {}",
                response.status()
            )));
        }

        let data: Value = response.json().await.map_err(GeoError::Http)?;

        // The provider reports { success: false, message } instead of an
        // HTTP error status.
        if data.get("success").and_then(Value::as_bool) == Some(false) {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Failed to fetch geolocation")
                .to_string();
            return Err(GeoError::Upstream(message));
        }

        Ok(LocationInfo::from_provider(&data))
    }
}
