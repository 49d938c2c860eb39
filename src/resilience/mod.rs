mod circuit_breaker;

use crate::config::HttpConfig;
use circuit_breaker::CircuitBreakerMap;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum Error {
    #[error("circuit open for {host}, retry after {retry_after:?}")]
    CircuitOpen { host: String, retry_after: Duration },
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(StatusCode),
}

/// Fronts every outbound call to NASA / PDS endpoints with retry, a
/// per-host circuit breaker, and a politeness delay between successive
/// requests to the same host. Oblivious to payload semantics: callers read
/// the response body themselves (buffered `.text()`/`.json()`, or streamed
/// via `bytes_stream()` for the PDS archive).
pub struct ResilientClient {
    client: reqwest::Client,
    breakers: CircuitBreakerMap,
    config: HttpConfig,
}

/// `Ok(None)` signals "no data for this unit" (HTTP 404), which is not an error.
pub type FetchResult = Result<Option<reqwest::Response>, Error>;

impl ResilientClient {
    pub fn new(config: HttpConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .expect("Could not build HTTP client");
        Self {
            client,
            breakers: CircuitBreakerMap::new(config.circuit_breaker_threshold, config.circuit_breaker_cooldown()),
            config,
        }
    }

    /// Issues a GET request, retrying transient failures with exponential backoff
    /// and tripping the per-host circuit breaker on repeated failure.
    pub async fn get(&self, url: &str) -> FetchResult {
        let host = host_of(url);
        if let Some(retry_after) = self.breakers.trip_remaining(&host) {
            return Err(Error::CircuitOpen { host, retry_after });
        }

        let mut attempt = 0;
        loop {
            let outcome = self.client.get(url).send().await;
            match outcome {
                Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                    self.breakers.record_success(&host);
                    return Ok(None);
                }
                Ok(response) if response.status().is_success() => {
                    self.breakers.record_success(&host);
                    return Ok(Some(response));
                }
                Ok(response) if is_retryable_status(response.status()) && attempt < self.config.max_retries => {
                    warn!("{url} returned {} (attempt {}/{})", response.status(), attempt + 1, self.config.max_retries);
                    self.sleep_backoff(attempt).await;
                    attempt += 1;
                }
                Ok(response) if is_retryable_status(response.status()) => {
                    self.breakers.record_failure(&host);
                    return Err(Error::Status(response.status()));
                }
                Ok(response) => {
                    self.breakers.record_success(&host);
                    return Err(Error::Status(response.status()));
                }
                Err(err) if attempt < self.config.max_retries => {
                    warn!("request to {url} failed (attempt {}/{}): {err}", attempt + 1, self.config.max_retries);
                    self.sleep_backoff(attempt).await;
                    attempt += 1;
                }
                Err(err) => {
                    self.breakers.record_failure(&host);
                    return Err(err.into());
                }
            }
        }
    }

    async fn sleep_backoff(&self, attempt: u32) {
        let backoff = self.config.backoff_base() * 2u32.pow(attempt);
        tokio::time::sleep(backoff).await;
    }

    /// Politeness pause between successive unit fetches to the same host during a bulk run.
    pub async fn politeness_pause(&self) {
        tokio::time::sleep(self.config.politeness_delay()).await;
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
