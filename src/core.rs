use async_trait::async_trait;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::borrow::Cow;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use super::config::{EdgarConfig, EdgarUrls};
use super::error::{EdgarError, Result};
use super::traits::Fetch;

/// Number of characters of an error body kept in [`EdgarError::RemoteRejected`].
pub const BODY_PREVIEW_CHARS: usize = 200;

/// Preview used when an error body is not valid UTF-8.
pub const NON_TEXT_PREVIEW: &str = "<non-text response body>";

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Minimum-interval request throttle.
///
/// Backed by a GCRA limiter with a burst of one, so consecutive requests are
/// spaced at least `1 / requests_per_second` apart and idle time never builds
/// up credit for a burst. The limiter state is atomic, which keeps the
/// interval honest even when one client is shared between tasks.
#[derive(Debug, Clone)]
pub struct Throttle {
    limiter: Option<Arc<Governor>>,
    interval: Duration,
}

impl Throttle {
    /// Builds a throttle for the given ceiling. Zero, negative or non-finite
    /// values disable throttling.
    ///
    /// # Errors
    ///
    /// Returns `EdgarError::ConfigError` if the rate is so low that the
    /// interval between requests cannot be represented.
    pub fn per_second(requests_per_second: f64) -> Result<Self> {
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Ok(Self::disabled());
        }
        let interval = Duration::try_from_secs_f64(1.0 / requests_per_second)
            .ok()
            .filter(|interval| interval.as_nanos() <= u128::from(u64::MAX))
            .ok_or_else(|| {
                EdgarError::ConfigError(format!(
                    "Rate limit of {} requests per second is too low",
                    requests_per_second
                ))
            })?;
        Ok(match Quota::with_period(interval) {
            Some(quota) => Self {
                limiter: Some(Arc::new(RateLimiter::direct(
                    quota.allow_burst(NonZeroU32::MIN),
                ))),
                interval,
            },
            None => Self::disabled(),
        })
    }

    pub fn disabled() -> Self {
        Self {
            limiter: None,
            interval: Duration::ZERO,
        }
    }

    /// The configured minimum spacing between requests.
    pub fn min_interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the next request is allowed.
    pub async fn until_ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

/// A successful (status below 400) HTTP response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// First [`BODY_PREVIEW_CHARS`] characters of a body, or [`NON_TEXT_PREVIEW`].
pub fn body_preview(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.chars().take(BODY_PREVIEW_CHARS).collect(),
        Err(_) => NON_TEXT_PREVIEW.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct Edgar {
    /// HTTP client for making requests
    pub(crate) client: reqwest::Client,

    /// Minimum-interval throttle for SEC fair access
    pub(crate) throttle: Throttle,

    /// User agent sent with every request, recorded in manifests
    pub(crate) user_agent: String,

    /// Base URLs for the EDGAR services
    pub(crate) urls: EdgarUrls,
}

/// Rate-limited HTTP client for the SEC EDGAR services.
///
/// `Edgar` performs plain GET requests with a fixed identifying user agent and
/// a minimum interval between requests. SEC.gov requires automated clients to
/// identify themselves and to stay under 10 requests per second; the default
/// configuration uses 5.
///
/// # Error classification
///
/// - Any status at or above 400 becomes [`EdgarError::RemoteRejected`] with the
///   first 200 characters of the body.
/// - DNS, connection and timeout problems become [`EdgarError::TransportFailure`].
/// - Everything else is returned untouched. The client never retries; wrap it
///   in [`Retrying`](crate::Retrying) for that.
///
/// Compressed transfer encodings (gzip, deflate) are advertised through
/// `Accept-Encoding` and decoded transparently.
///
/// # Examples
///
/// ```rust
/// # use edgarsum::Edgar;
/// let edgar = Edgar::new("my_app/1.0 (my@email.com)")?;
/// # Ok::<(), edgarsum::EdgarError>(())
/// ```
impl Edgar {
    /// Creates a new Edgar client with the default rate limit, timeout and SEC.gov URLs.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - "AppName/Version (contact@email.com)". The SEC uses it to
    ///   contact you if your application causes issues.
    pub fn new(user_agent: &str) -> Result<Self> {
        let config = EdgarConfig {
            user_agent: user_agent.to_string(),
            ..EdgarConfig::default()
        };
        Self::with_config(config)
    }

    /// Creates an Edgar client with custom configuration settings.
    ///
    /// # Errors
    ///
    /// Returns `EdgarError::ConfigError` if the user agent is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn with_config(config: EdgarConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| EdgarError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| EdgarError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Edgar {
            client,
            throttle: Throttle::per_second(config.requests_per_second)?,
            user_agent: config.user_agent,
            urls: config.base_urls,
        })
    }

    /// Performs a throttled GET request.
    ///
    /// # Errors
    ///
    /// * `EdgarError::RemoteRejected` - status 400 or above
    /// * `EdgarError::TransportFailure` - the request or the body transfer failed
    pub async fn get(&self, url: &str, params: Option<&[(&str, &str)]>) -> Result<FetchResponse> {
        self.throttle.until_ready().await;

        let mut request = self.client.get(url);
        if let Some(params) = params {
            request = request.query(params);
        }

        tracing::debug!(url, "GET");
        let response = request
            .send()
            .await
            .map_err(|cause| EdgarError::TransportFailure {
                url: url.to_string(),
                cause,
            })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();

        if status >= 400 {
            let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            tracing::debug!(url, status, "request rejected");
            return Err(EdgarError::RemoteRejected {
                url: url.to_string(),
                status_code: status,
                body_preview: body_preview(&body),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|cause| EdgarError::TransportFailure {
                url: url.to_string(),
                cause,
            })?
            .to_vec();

        Ok(FetchResponse {
            status,
            body,
            headers,
        })
    }

    /// Returns the user agent sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the configured base URLs.
    pub fn urls(&self) -> &EdgarUrls {
        &self.urls
    }

    /// Returns the configured minimum spacing between requests.
    pub fn min_interval(&self) -> Duration {
        self.throttle.min_interval()
    }
}

#[async_trait]
impl Fetch for Edgar {
    async fn get(&self, url: &str, params: Option<&[(&str, &str)]>) -> Result<FetchResponse> {
        Edgar::get(self, url, params).await
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn urls(&self) -> &EdgarUrls {
        &self.urls
    }
}
