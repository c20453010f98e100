//! Rate-limited HTTP client shared by every community source adapter.

mod in_flight;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use crowdpulse_core::source_offset;
use reqwest::{Client, StatusCode, Url};
use tokio::sync::Semaphore;

use crate::error::FetchError;
use crate::rate_limit::{retry_with_backoff, Pacing};
use crate::session::{find_cookie, SessionToken};
use crate::types::{FetchRequest, RawPayload};

use in_flight::InFlightGuard;

/// Tunables for a [`FetchClient`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Hard ceiling for one request, connect through body.
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Maximum concurrent in-flight requests through this client.
    pub max_in_flight: usize,
    pub pacing: Pacing,
    /// Additional attempts after a transient failure. `0` skips the
    /// target/page on its first failure.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: "crowdpulse/0.1".to_owned(),
            max_in_flight: 4,
            pacing: Pacing::new(2_000, 4_000),
            max_retries: 0,
            retry_backoff_base_ms: 1_000,
        }
    }
}

/// HTTP client enforcing the per-source request discipline:
///
/// - at most `max_in_flight` requests outstanding at once,
/// - a randomized pacing delay before every request,
/// - a hard per-request timeout,
/// - non-2xx responses surfaced as typed, transient [`FetchError`]s.
///
/// The only shared mutable state is the permit pool and the atomic
/// in-flight counters.
pub struct FetchClient {
    client: Client,
    permits: Semaphore,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    requests_sent: AtomicUsize,
    pacing: Pacing,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl FetchClient {
    /// Creates a `FetchClient` from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout.min(Duration::from_secs(10)))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;
        Ok(Self {
            client,
            permits: Semaphore::new(config.max_in_flight.max(1)),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            requests_sent: AtomicUsize::new(0),
            pacing: config.pacing,
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// Requests currently on the wire.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous requests observed so far.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Total HTTP requests sent, including retries and warm-ups.
    #[must_use]
    pub fn requests_sent(&self) -> usize {
        self.requests_sent.load(Ordering::SeqCst)
    }

    /// Fetches one target/page, retrying transient failures per the
    /// configured retry policy.
    ///
    /// # Errors
    ///
    /// - [`FetchError::UnexpectedStatus`]: any non-2xx status.
    /// - [`FetchError::RateLimited`]: HTTP 429.
    /// - [`FetchError::Http`]: timeout, connection or body failure.
    /// - [`FetchError::InvalidUrl`]: the request URL does not parse.
    pub async fn fetch(
        &self,
        request: &FetchRequest,
        session: &SessionToken,
    ) -> Result<RawPayload, FetchError> {
        retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            self.fetch_once(request, session)
        })
        .await
    }

    async fn fetch_once(
        &self,
        request: &FetchRequest,
        session: &SessionToken,
    ) -> Result<RawPayload, FetchError> {
        let url = build_url(&request.url, &request.query)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::ClientBuild("in-flight limiter closed".to_owned()))?;
        self.pacing.wait().await;
        let _guard = InFlightGuard::enter(&self.in_flight, &self.peak_in_flight);
        self.requests_sent.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(
            source = %request.source,
            fetch_target = %request.target,
            page = request.page,
            url = %url,
            "fetching"
        );

        let mut builder = self.client.get(url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(cookie) = session.cookie_header() {
            builder = builder.header(reqwest::header::COOKIE, cookie);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FetchError::RateLimited {
                url: url.to_string(),
                retry_after_secs,
            });
        }

        if !status.is_success() {
            tracing::warn!(
                source = %request.source,
                fetch_target = %request.target,
                page = request.page,
                status = status.as_u16(),
                "source returned non-success status"
            );
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;

        Ok(RawPayload {
            source: request.source,
            target: request.target.clone(),
            page: request.page,
            fetched_at: Utc::now().with_timezone(&source_offset()),
            status: status.as_u16(),
            body,
        })
    }

    /// Visits `url` once and captures `cookie_name` from its `Set-Cookie`
    /// headers. Returns an empty token when the cookie is absent.
    ///
    /// Callers treat failure as non-fatal: requests simply proceed without
    /// the token.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure or a non-2xx landing page.
    pub async fn warm_up(
        &self,
        url: &str,
        cookie_name: &str,
        headers: &[(String, String)],
    ) -> Result<SessionToken, FetchError> {
        let url = build_url(url, &[])?;
        let response = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| FetchError::ClientBuild("in-flight limiter closed".to_owned()))?;
            let _guard = InFlightGuard::enter(&self.in_flight, &self.peak_in_flight);
            self.requests_sent.fetch_add(1, Ordering::SeqCst);

            let mut builder = self.client.get(url.clone());
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.send().await?
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let token = match find_cookie(response.headers(), cookie_name) {
            Some(value) => SessionToken::with_cookie(cookie_name, &value),
            None => {
                tracing::debug!(url = %url, cookie = cookie_name, "warm-up response carried no session cookie");
                SessionToken::none()
            }
        };

        self.pacing.wait().await;
        Ok(token)
    }
}

/// Parses `base` and appends `query` pairs.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `base` is not an absolute URL.
fn build_url(base: &str, query: &[(String, String)]) -> Result<Url, FetchError> {
    let mut url = Url::parse(base).map_err(|e| FetchError::InvalidUrl {
        url: base.to_owned(),
        reason: e.to_string(),
    })?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
