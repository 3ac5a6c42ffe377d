//! Caching, de-duplicating location resolution for the form engine.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::LocationInfo;

use super::client::GeoError;

/// How long a resolved location stays fresh.
pub const LOCATION_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// One upstream fetch, abstracted so tests can count and fail lookups.
#[async_trait]
pub trait LocationFetch: Send + Sync {
    async fn fetch(&self) -> Result<LocationInfo, GeoError>;
}

/// Production fetch: the backend's location endpoint over HTTP.
pub struct HttpLocationFetch {
    http: reqwest::Client,
    url: String,
}

impl HttpLocationFetch {
    /// `base_url` is the deployed backend origin, e.g. `https://intake.example.org`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!("{}/api/location", base_url.into().trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl LocationFetch for HttpLocationFetch {
    async fn fetch(&self) -> Result<LocationInfo, GeoError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(GeoError::Http)?;

        if !response.status().is_success() {
            return Err(GeoError::Upstream(format!(
                "location endpoint returned status {}",
                response.status()
            )));
        }

        response.json::<LocationInfo>().await.map_err(GeoError::Http)
    }
}

struct CachedLocation {
    at: Instant,
    info: LocationInfo,
}

/// Resolves the applicant's location with a freshness window and at most one
/// in-flight upstream request.
///
/// Concurrent `resolve` calls serialize on the cache lock: the first caller
/// fetches while the rest wait, then read the freshly filled cache. A failed
/// fetch returns `None` and leaves any previous (expired) cache entry alone,
/// so a later call simply retries.
pub struct LocationResolver<F> {
    fetcher: F,
    ttl: Duration,
    cache: Mutex<Option<CachedLocation>>,
}

impl<F: LocationFetch> LocationResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_ttl(fetcher, LOCATION_CACHE_TTL)
    }

    pub fn with_ttl(fetcher: F, ttl: Duration) -> Self {
        Self {
            fetcher,
            ttl,
            cache: Mutex::new(None),
        }
    }

    /// The current location, from cache when fresh. `None` means "unknown",
    /// never an error.
    pub async fn resolve(&self) -> Option<LocationInfo> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.at.elapsed() < self.ttl {
                return Some(cached.info.clone());
            }
        }

        match self.fetcher.fetch().await {
            Ok(info) => {
                *cache = Some(CachedLocation {
                    at: Instant::now(),
                    info: info.clone(),
                });
                Some(info)
            }
            Err(err) => {
                tracing::debug!("Location lookup failed: {}", err);
                None
            }
        }
    }
}
