//! Bucket-gated REST client implementation.

use std::sync::Arc;

use crate::auth::Credential;
use crate::clients::request::{Method, RestRequest};
use crate::clients::retry::RetryPolicy;
use crate::clients::{ApiError, ACCESS_TOKEN_HEADER};

/// Header carrying the REST bucket usage as `"used/max"`.
pub const CALL_LIMIT_HEADER: &str = "X-Shopify-Shop-Api-Call-Limit";

/// Rate limit usage parsed from the [`CALL_LIMIT_HEADER`] header.
///
/// # Example
///
/// ```rust
/// use shopify_admin_api::clients::rest::CallLimit;
///
/// let limit = CallLimit::parse("32/40").unwrap();
/// assert_eq!(limit.used, 32);
/// assert_eq!(limit.bucket_size, 40);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallLimit {
    /// Calls currently counted against the bucket.
    pub used: u32,
    /// The bucket capacity.
    pub bucket_size: u32,
}

impl CallLimit {
    /// Parses a `"used/max"` header value. Returns `None` on any deviation
    /// from that format.
    #[must_use]
    pub fn parse(header_value: &str) -> Option<Self> {
        let (used, bucket_size) = header_value.split_once('/')?;
        Some(Self {
            used: used.parse().ok()?,
            bucket_size: bucket_size.parse().ok()?,
        })
    }
}

/// REST Admin API client for one credential.
///
/// Each call acquires a slot from the credential's REST bucket before going
/// on the wire, so any number of concurrent calls through any number of
/// clients sharing the credential stay inside Shopify's limit. Failures are
/// classified into [`ApiError`] and retried per [`RetryPolicy`] when the
/// classification allows it; HTTP 429 is absorbed internally by draining the
/// bucket and waiting, and never surfaces to the caller.
///
/// # Thread Safety
///
/// `RestClient` is `Send + Sync` and cheap to clone-per-task via the shared
/// `Arc<Credential>` and `reqwest::Client`.
#[derive(Debug)]
pub struct RestClient {
    transport: reqwest::Client,
    credential: Arc<Credential>,
    retry: RetryPolicy,
    api_base: String,
}

// Verify RestClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestClient>();
};

impl RestClient {
    /// Creates a REST client with its own transport.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be created, which only
    /// happens when TLS initialization fails.
    #[must_use]
    pub fn new(credential: Arc<Credential>) -> Self {
        let transport = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");
        Self::with_transport(credential, transport)
    }

    /// Creates a REST client on an explicitly provided transport.
    ///
    /// Sharing one `reqwest::Client` across clients and credentials reuses
    /// its connection pool.
    #[must_use]
    pub fn with_transport(credential: Arc<Credential>, transport: reqwest::Client) -> Self {
        let api_base = credential.api_url();
        Self {
            transport,
            credential,
            retry: RetryPolicy::default(),
            api_base,
        }
    }

    /// Overrides the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Overrides the Admin API base URL.
    ///
    /// Intended for proxy setups and tests; requests go to
    /// `{api_base}{endpoint}` instead of the store's own domain.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Returns the credential this client executes against.
    #[must_use]
    pub const fn credential(&self) -> &Arc<Credential> {
        &self.credential
    }

    /// Executes a REST request and returns the parsed JSON response body.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ApiError`]:
    /// - [`ApiError::CallerFault`] for 4xx responses (not retried)
    /// - [`ApiError::PlatformFault`] for other unexpected statuses (retried)
    /// - [`ApiError::MissingAccessToken`] when the credential has no token
    /// - [`ApiError::Network`] / [`ApiError::InvalidResponseBody`] for
    ///   transport and parse failures (retried)
    ///
    /// HTTP 429 never surfaces: the bucket is drained and the call waits for
    /// refill before being reissued.
    pub async fn execute(&self, request: RestRequest) -> Result<serde_json::Value, ApiError> {
        self.retry
            .run(ApiError::retryable_for_rest, || self.execute_once(&request))
            .await
    }

    /// Shorthand for `execute(RestRequest::get(endpoint))`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn get(&self, endpoint: &str) -> Result<serde_json::Value, ApiError> {
        self.execute(RestRequest::get(endpoint)).await
    }

    /// Shorthand for `execute(RestRequest::post(endpoint, body))`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn post(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.execute(RestRequest::post(endpoint, body)).await
    }

    /// Shorthand for `execute(RestRequest::put(endpoint, body))`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn put(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.execute(RestRequest::put(endpoint, body)).await
    }

    /// Shorthand for `execute(RestRequest::delete(endpoint))`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn delete(&self, endpoint: &str) -> Result<serde_json::Value, ApiError> {
        self.execute(RestRequest::delete(endpoint)).await
    }

    // One attempt from the retry orchestrator's point of view. The 429 loop
    // is internal: exhaustion is not a failure, just a longer wait on the
    // bucket.
    async fn execute_once(&self, request: &RestRequest) -> Result<serde_json::Value, ApiError> {
        loop {
            self.credential.acquire_rest().await;

            let access_token = self.credential.require_access_token()?;
            let url = format!("{}{}", self.api_base, request.endpoint);

            let mut builder = match request.method {
                Method::Get => self.transport.get(&url),
                Method::Post => self.transport.post(&url),
                Method::Put => self.transport.put(&url),
                Method::Delete => self.transport.delete(&url),
            };
            builder = builder.header(ACCESS_TOKEN_HEADER, access_token);
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();

            if status == 429 {
                tracing::warn!(
                    store = %self.credential.store(),
                    endpoint = %request.endpoint,
                    "REST call limit hit, draining bucket and waiting for refill"
                );
                self.credential.drain_rest().await;
                continue;
            }

            if status >= 400 || status != request.expected_status {
                return Err(self.classify_failure(request, status, response).await);
            }

            let call_limit = response
                .headers()
                .get(CALL_LIMIT_HEADER)
                .and_then(|value| value.to_str().ok())
                .and_then(CallLimit::parse);

            let body = response
                .json::<serde_json::Value>()
                .await
                .map_err(|_| ApiError::InvalidResponseBody)?;

            // The platform may change the limit per plan tier without notice,
            // so every successful response recalibrates the bucket.
            if let Some(limit) = call_limit {
                self.credential.recalibrate_rest(limit.bucket_size).await;
            } else {
                tracing::debug!(
                    store = %self.credential.store(),
                    endpoint = %request.endpoint,
                    "response carried no parseable call limit header, keeping current throttle"
                );
            }

            return Ok(body);
        }
    }

    async fn classify_failure(
        &self,
        request: &RestRequest,
        status: u16,
        response: reqwest::Response,
    ) -> ApiError {
        let mut message = format!(
            "ERROR in store {}: {}\nAPI response code: {status}\nAPI endpoint: {}\n",
            self.credential.store(),
            request.debug,
            request.endpoint,
        );
        if let Ok(json) = response.json::<serde_json::Value>().await {
            message.push_str(&format!("API response json: {json}\n"));
        }

        if (400..500).contains(&status) {
            ApiError::CallerFault { message }
        } else {
            ApiError::PlatformFault { message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_limit_parses_used_over_max() {
        let limit = CallLimit::parse("32/40").unwrap();
        assert_eq!(limit.used, 32);
        assert_eq!(limit.bucket_size, 40);

        let limit = CallLimit::parse("1/80").unwrap();
        assert_eq!(limit.used, 1);
        assert_eq!(limit.bucket_size, 80);
    }

    #[test]
    fn test_call_limit_rejects_malformed_values() {
        assert!(CallLimit::parse("").is_none());
        assert!(CallLimit::parse("40").is_none());
        assert!(CallLimit::parse("40/").is_none());
        assert!(CallLimit::parse("/80").is_none());
        assert!(CallLimit::parse("a/b").is_none());
        assert!(CallLimit::parse("40/80/120").is_none());
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RestClient>();
    }
}
