use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::chat::{ChatRequest, ChatResponse};
use super::config::ReportConfig;
use super::error::{ReportError, Result};

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Upper bound on any single wait between 429 re-sends.
pub const MAX_RETRY_WAIT: Duration = Duration::from_secs(60);

/// Settings for one [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_key: String,
    pub rate_limit: u32,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl ClientSettings {
    /// Settings for the generation API taken from a report config.
    pub fn generation(config: &ReportConfig) -> Self {
        Self::from_config(config, &config.base_urls.generation, &config.generation_api_key)
    }

    /// Settings for the search API taken from a report config.
    pub fn search(config: &ReportConfig) -> Self {
        Self::from_config(config, &config.base_urls.search, &config.search_api_key)
    }

    fn from_config(config: &ReportConfig, base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            rate_limit: config.rate_limit,
            timeout: config.timeout,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        }
    }
}

/// HTTP client for one OpenAI-compatible chat-completions API.
///
/// Every request waits on a token-bucket rate limiter first. An HTTP 429
/// answer is the only thing that gets re-sent: the client honors a
/// `Retry-After` header when present and otherwise backs off exponentially
/// with jitter, up to `max_retries` times. Network errors and every other
/// non-success status are returned after the first attempt.
///
/// # Retry Timeline
///
/// ```text
/// attempt 1 ──429──► wait Retry-After or base × 1 ──► attempt 2
/// attempt 2 ──429──► wait Retry-After or base × 2 ──► attempt 3
/// attempt 3 ──429──► RateLimitExceeded              (max_retries = 2)
/// ```
///
/// Every wait is capped at [`MAX_RETRY_WAIT`], whatever the server asks for.
///
/// # Examples
///
/// ```ignore
/// use portfolio_report::{ApiClient, ChatMessage, ChatRequest, ClientSettings, ReportConfig};
///
/// let config = ReportConfig::from_env()?;
/// let client = ApiClient::new(ClientSettings::search(&config))?;
/// let request = ChatRequest::new("sonar-pro", vec![ChatMessage::user("VLCC rates 2025")]);
/// let text = client.chat(&request).await?.into_text()?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client with the bearer header installed
    pub(crate) client: reqwest::Client,

    /// Token bucket shared by clones of this client
    pub(crate) rate_limiter: Arc<Governor>,

    /// Base URL, without a trailing slash
    pub(crate) base_url: String,

    pub(crate) max_retries: u32,

    pub(crate) retry_backoff: Duration,
}

impl ApiClient {
    /// Builds the client.
    ///
    /// The API key is installed once as a sensitive `Authorization: Bearer`
    /// default header, so it never shows up in debug output. The rate limiter
    /// allows `rate_limit` requests per second with an equal burst.
    ///
    /// # Arguments
    ///
    /// * `settings` - Base URL, key, rate limit, timeout and retry policy,
    ///   usually from [`ClientSettings::generation`] or [`ClientSettings::search`]
    ///
    /// # Errors
    ///
    /// Returns `ReportError::ConfigError` if the key cannot be used as a header
    /// value, the rate limit is zero, or the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use portfolio_report::{ApiClient, ClientSettings, ReportConfig};
    ///
    /// let config = ReportConfig::new("sk-...", "pplx-...")?;
    /// let client = ApiClient::new(ClientSettings::generation(&config))?;
    /// assert_eq!(client.base_url(), "https://api.openai.com/v1");
    /// # Ok::<(), portfolio_report::ReportError>(())
    /// ```
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
            .map_err(|e| ReportError::ConfigError(format!("Invalid API key: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                ReportError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(settings.rate_limit).ok_or_else(|| {
                ReportError::ConfigError("Rate limit must be greater than zero".to_string())
            })?,
        )));

        Ok(ApiClient {
            client,
            rate_limiter,
            base_url: settings.base_url,
            max_retries: settings.max_retries,
            retry_backoff: settings.retry_backoff,
        })
    }

    /// Exponential backoff with ±20% jitter: `2^retry × base`, capped at
    /// [`MAX_RETRY_WAIT`].
    fn calculate_backoff(base: Duration, retry: u32) -> Duration {
        let factor = 2_u64.checked_pow(retry).unwrap_or(u64::MAX);
        let backoff_ms = u64::try_from(base.as_millis())
            .unwrap_or(u64::MAX)
            .saturating_mul(factor) as f64;
        let jittered = backoff_ms + backoff_ms * 0.2 * (fastrand::f64() - 0.5);
        Duration::from_millis(jittered.clamp(0.0, MAX_RETRY_WAIT.as_millis() as f64) as u64)
    }

    /// Wait before re-send number `retry`: the server's `Retry-After` seconds
    /// when given, otherwise the jittered backoff. Never above [`MAX_RETRY_WAIT`].
    fn retry_wait(retry_after: Option<&str>, base: Duration, retry: u32) -> Duration {
        retry_after
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Self::calculate_backoff(base, retry))
            .min(MAX_RETRY_WAIT)
    }

    /// Sends a chat-completions request and decodes the response.
    ///
    /// Posts to `{base_url}/chat/completions`. Rate-limited answers are re-sent
    /// as described on [`ApiClient`]; nothing else is retried.
    ///
    /// # Arguments
    ///
    /// * `request` - Model, messages and optional sampling fields
    ///
    /// # Errors
    ///
    /// * `ReportError::RequestError` - network failure or timeout
    /// * `ReportError::RateLimitExceeded` - 429 answers persisted after all re-sends
    /// * `ReportError::ApiError` - any other non-success status, with a body preview
    /// * `ReportError::JsonError` - the body is not a chat-completions response
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.post_json(&url, request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POSTs a JSON body and returns the response text.
    pub async fn post_json<T>(&self, url: &str, body: &T) -> Result<String>
    where
        T: serde::Serialize + ?Sized,
    {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;

            let response = self
                .client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(ReportError::RequestError)?;

            let status = response.status();

            if status.is_success() {
                return response.text().await.map_err(ReportError::RequestError);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if retries >= self.max_retries {
                    return Err(ReportError::RateLimitExceeded);
                }

                let retry_after = Self::retry_wait(
                    response
                        .headers()
                        .get("retry-after")
                        .and_then(|h| h.to_str().ok()),
                    self.retry_backoff,
                    retries,
                );

                tracing::warn!(
                    "Rate limit hit (429) for {}. Attempt {}/{}. Waiting for {:?} before retry.",
                    url,
                    retries + 1,
                    self.max_retries.saturating_add(1),
                    retry_after
                );
                sleep(retry_after).await;
                retries += 1;
                continue;
            }

            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            return Err(ReportError::ApiError {
                status: status.as_u16(),
                body: error_body.chars().take(200).collect(),
            });
        }
    }

    /// Returns the base URL this client posts to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_backoff() {
        let base = Duration::from_millis(1000);
        let backoff0 = ApiClient::calculate_backoff(base, 0);
        let backoff1 = ApiClient::calculate_backoff(base, 1);
        let backoff2 = ApiClient::calculate_backoff(base, 2);

        assert!(backoff0 < backoff1);
        assert!(backoff1 < backoff2);

        assert!(backoff0.as_millis() >= 800 && backoff0.as_millis() <= 1200);
        assert!(backoff1.as_millis() >= 1600 && backoff1.as_millis() <= 2400);
        assert!(backoff2.as_millis() >= 3200 && backoff2.as_millis() <= 4800);
    }

    #[test]
    fn test_backoff_is_capped_for_large_retry_counts() {
        let base = Duration::from_millis(1000);
        assert_eq!(ApiClient::calculate_backoff(base, 7), MAX_RETRY_WAIT);
        assert_eq!(ApiClient::calculate_backoff(base, 64), MAX_RETRY_WAIT);
        assert_eq!(ApiClient::calculate_backoff(Duration::MAX, u32::MAX), MAX_RETRY_WAIT);
    }

    #[test]
    fn test_retry_wait() {
        let base = Duration::from_millis(10);
        assert_eq!(ApiClient::retry_wait(Some("3"), base, 0), Duration::from_secs(3));
        assert_eq!(ApiClient::retry_wait(Some("86400"), base, 0), MAX_RETRY_WAIT);
        assert!(ApiClient::retry_wait(Some("soon"), base, 0) <= Duration::from_millis(12));
        assert!(ApiClient::retry_wait(None, base, 1) >= Duration::from_millis(16));
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let settings = ClientSettings {
            base_url: "http://localhost".to_string(),
            api_key: "sk-test".to_string(),
            rate_limit: 0,
            timeout: Duration::from_secs(5),
            max_retries: 0,
            retry_backoff: Duration::from_millis(10),
        };
        assert!(matches!(
            ApiClient::new(settings),
            Err(ReportError::ConfigError(_))
        ));
    }

    #[test]
    fn test_settings_strip_trailing_slash() {
        let config = ReportConfig::new("sk-test", "pplx-test")
            .unwrap()
            .with_base_urls(crate::ApiUrls {
                generation: "http://localhost:8080/v1/".to_string(),
                search: "http://localhost:8081".to_string(),
            });
        assert_eq!(
            ClientSettings::generation(&config).base_url,
            "http://localhost:8080/v1"
        );
        assert_eq!(ClientSettings::search(&config).api_key, "pplx-test");
    }
}
