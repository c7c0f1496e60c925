//! Memoizing JSON Fetcher
//!
//! HTTP GET client that consults an `ExpiringCache` before going to the
//! network and only stores successful, fully parsed responses.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::cache::{Clock, ExpiringCache, TokioClock};
use crate::client::{cache_key, RequestOptions};
use crate::config::Config;
use crate::error::{FetchError, Result};

// == Cached Response ==
/// A response body as stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedResponse {
    /// Parsed JSON body
    pub body: Value,
    /// Wall-clock time the body was fetched from the network
    pub fetched_at: DateTime<Utc>,
}

/// Where a fetched body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Network,
    Cache,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Network => write!(f, "network"),
            Origin::Cache => write!(f, "cache"),
        }
    }
}

/// Result of a fetch: the body plus whether the network was used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched {
    pub body: Value,
    pub fetched_at: DateTime<Utc>,
    pub origin: Origin,
}

impl Fetched {
    fn new(response: CachedResponse, origin: Origin) -> Self {
        Self {
            body: response.body,
            fetched_at: response.fetched_at,
            origin,
        }
    }
}

/// The single in-flight `execute` call, tagged so a finished call only clears
/// its own slot.
#[derive(Debug, Default)]
struct InFlight {
    generation: u64,
    abort: Option<AbortHandle>,
}

// == Cached Fetcher ==
/// JSON GET client memoized through an expiring cache.
pub struct CachedFetcher<C = TokioClock> {
    client: Client,
    base_url: Url,
    cache: ExpiringCache<CachedResponse, C>,
    in_flight: Arc<Mutex<InFlight>>,
}

impl<C> Clone for CachedFetcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            cache: self.cache.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<C> fmt::Debug for CachedFetcher<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFetcher")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl CachedFetcher<TokioClock> {
    /// Creates a fetcher from configuration, with its own cache.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = ExpiringCache::new(config.default_ttl());
        Self::new(&config.base_url, cache, config.request_timeout())
    }
}

impl<C: Clock> CachedFetcher<C> {
    /// Creates a fetcher that resolves paths against `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Root URL that request paths are joined onto
    /// * `cache` - Cache holding response bodies; may be shared with a `Sweeper`
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: &str,
        cache: ExpiringCache<CachedResponse, C>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("expiring_cache/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            cache,
            in_flight: Arc::new(Mutex::new(InFlight::default())),
        })
    }

    /// The cache backing this fetcher.
    pub fn cache(&self) -> &ExpiringCache<CachedResponse, C> {
        &self.cache
    }

    /// Joins `path` onto the base URL. Absolute URLs are used as given.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Cache key the request for `path` with `options` is stored under.
    pub fn key_for(&self, path: &str, options: &RequestOptions) -> Result<String> {
        Ok(cache_key(self.resolve(path)?.as_str(), options))
    }

    // == Fetch ==
    /// Returns the body for `path`, from cache when live, else from the network.
    pub async fn fetch(&self, path: &str, options: &RequestOptions) -> Result<Fetched> {
        self.fetch_inner(path, options, None).await
    }

    /// Like `fetch`, storing a network result with `ttl` instead of the default.
    pub async fn fetch_with_ttl(
        &self,
        path: &str,
        options: &RequestOptions,
        ttl: Duration,
    ) -> Result<Fetched> {
        self.fetch_inner(path, options, Some(ttl)).await
    }

    /// Convenience wrapper returning only the JSON body.
    pub async fn get_json(&self, path: &str, options: &RequestOptions) -> Result<Value> {
        Ok(self.fetch(path, options).await?.body)
    }

    async fn fetch_inner(
        &self,
        path: &str,
        options: &RequestOptions,
        ttl: Option<Duration>,
    ) -> Result<Fetched> {
        let url = self.resolve(path)?;
        let key = cache_key(url.as_str(), options);

        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit for {}", url);
            return Ok(Fetched::new(cached, Origin::Cache));
        }
        debug!("Cache miss for {}", url);

        let mut request = self.client.get(url.clone());
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("GET {} returned {}", url, status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;

        let cached = CachedResponse {
            body,
            fetched_at: Utc::now(),
        };
        match ttl {
            Some(ttl) => self.cache.set_with_ttl(key, cached.clone(), ttl),
            None => self.cache.set(key, cached.clone()),
        }

        info!("GET {} -> {} (cached)", url, status);
        Ok(Fetched::new(cached, Origin::Network))
    }

    // == Execute / Cancel ==
    /// Fetches `path`, first aborting any `execute` call still in flight on
    /// this fetcher or its clones.
    ///
    /// A superseded call resolves to `FetchError::Cancelled`.
    pub async fn execute(&self, path: &str, options: &RequestOptions) -> Result<Fetched> {
        let this = self.clone();
        let path = path.to_string();
        let options = options.clone();
        let task = tokio::spawn(async move { this.fetch(&path, &options).await });

        let generation = {
            let mut in_flight = self.in_flight.lock();
            if let Some(previous) = in_flight.abort.replace(task.abort_handle()) {
                previous.abort();
                debug!("Aborted previous in-flight request");
            }
            in_flight.generation += 1;
            in_flight.generation
        };

        let result = task.await;

        {
            let mut in_flight = self.in_flight.lock();
            if in_flight.generation == generation {
                in_flight.abort = None;
            }
        }

        match result {
            Ok(fetched) => fetched,
            Err(e) if e.is_cancelled() => Err(FetchError::Cancelled),
            Err(e) => Err(FetchError::Task(e.to_string())),
        }
    }

    /// Aborts the in-flight `execute` call, if any. Returns whether one was aborted.
    pub fn cancel(&self) -> bool {
        match self.in_flight.lock().abort.take() {
            Some(handle) => {
                handle.abort();
                debug!("Cancelled in-flight request");
                true
            }
            None => false,
        }
    }

    /// Drops the cached entry for a request. Returns whether one was present.
    pub fn invalidate(&self, path: &str, options: &RequestOptions) -> Result<bool> {
        Ok(self.cache.delete(&self.key_for(path, options)?))
    }
}
