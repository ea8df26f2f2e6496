//! Cost-aware GraphQL client implementation.

use std::sync::Arc;

use serde_json::Value;

use crate::auth::Credential;
use crate::clients::graphql::CostEnvelope;
use crate::clients::retry::RetryPolicy;
use crate::clients::{ApiError, ACCESS_TOKEN_HEADER};

/// Extension code Shopify uses when a query's cost can never fit the bucket.
pub const MAX_COST_EXCEEDED_ERROR_CODE: &str = "MAX_COST_EXCEEDED";
/// Extension code Shopify uses when the cost bucket is currently exhausted.
pub const THROTTLED_ERROR_CODE: &str = "THROTTLED";
/// Error message when a multi-operation document was sent without a name.
pub const OPERATION_NAME_REQUIRED_ERROR_MESSAGE: &str = "An operation name is required";
/// Substring Shopify includes when the access token is rejected.
const INVALID_ACCESS_TOKEN_MARKER: &str = "Invalid API key or access token";

/// GraphQL Admin API client for one credential.
///
/// Unlike the REST path, throttling is server-driven: the client does not
/// gate calls locally, but tracks the server-reported cost budget on the
/// credential and, when a query is throttled, sleeps exactly long enough for
/// the bucket to cover the requested cost before retrying.
///
/// # Thread Safety
///
/// `GraphqlClient` is `Send + Sync`.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use shopify_admin_api::{Credential, GraphqlClient, ShopDomain};
///
/// let credential = Arc::new(Credential::offline(
///     ShopDomain::new("my-store").unwrap(),
///     "shpat_abc123",
///     "read_products".parse().unwrap(),
/// ));
///
/// let client = GraphqlClient::new(Arc::clone(&credential));
/// let data = client
///     .execute("query { shop { name } }", None, None, false)
///     .await?;
/// println!("shop: {}", data["shop"]["name"]);
/// ```
#[derive(Debug)]
pub struct GraphqlClient {
    transport: reqwest::Client,
    credential: Arc<Credential>,
    retry: RetryPolicy,
    api_base: String,
}

// Verify GraphqlClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlClient>();
};

impl GraphqlClient {
    /// Creates a GraphQL client with its own transport.
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

    /// Creates a GraphQL client on an explicitly provided transport.
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
    /// Intended for proxy setups and tests; queries go to
    /// `{api_base}/graphql.json` instead of the store's own domain.
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

    /// Executes a GraphQL query and returns the response's `data` field.
    ///
    /// # Arguments
    ///
    /// * `query` - The GraphQL document
    /// * `variables` - Optional variables object
    /// * `operation_name` - Required when the document contains multiple
    ///   named operations
    /// * `suppress_errors` - When `true`, a response carrying both `data` and
    ///   `errors` is not failed outright; the error list is still inspected
    ///   for throttling, cost and operation-name causes
    ///
    /// # Errors
    ///
    /// Returns a classified [`ApiError`]. Throttled queries, corrupt response
    /// bodies and intermittent 500/503 responses are retried per the
    /// [`RetryPolicy`]; everything else is terminal on first occurrence, and
    /// an invalid token additionally flips the credential's
    /// `access_token_invalid` flag.
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<Value>,
        operation_name: Option<&str>,
        suppress_errors: bool,
    ) -> Result<Value, ApiError> {
        self.retry
            .run(ApiError::retryable_for_graphql, || {
                self.execute_once(query, variables.as_ref(), operation_name, suppress_errors)
            })
            .await
    }

    async fn execute_once(
        &self,
        query: &str,
        variables: Option<&Value>,
        operation_name: Option<&str>,
        suppress_errors: bool,
    ) -> Result<Value, ApiError> {
        let access_token = self.credential.require_access_token()?;
        let url = format!("{}/graphql.json", self.api_base);

        let body = serde_json::json!({
            "query": query,
            "variables": variables.cloned().unwrap_or_else(|| serde_json::json!({})),
            "operationName": operation_name,
        });

        let response = self
            .transport
            .post(&url)
            .header(ACCESS_TOKEN_HEADER, access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(Self::classify_non_200(status, response).await);
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|_| ApiError::InvalidResponseBody)?;
        if !payload.is_object() {
            return Err(ApiError::PlatformFault {
                message: format!("GraphQL response body is not a JSON object: {payload}"),
            });
        }

        // The envelope is authoritative whenever present, throttled or not.
        let envelope = CostEnvelope::from_response(&payload);
        if let Some(envelope) = &envelope {
            self.credential
                .sync_graphql(envelope.available_points(), envelope.restore_rate_points())
                .await;
        }

        self.inspect_errors(&payload, envelope.as_ref(), operation_name, suppress_errors)
            .await?;

        payload
            .get("data")
            .cloned()
            .ok_or_else(|| ApiError::PlatformFault {
                message: format!("GraphQL response has no data field: {payload}"),
            })
    }

    // 500/503 are worth retrying; any other non-200 is a hard protocol
    // failure whose message is preserved for diagnostics.
    async fn classify_non_200(status: u16, response: reqwest::Response) -> ApiError {
        if status == 500 || status == 503 {
            return ApiError::Intermittent { status };
        }

        let detail = match response.json::<Value>().await {
            Ok(json) => json
                .get("errors")
                .map_or_else(|| format!("{status}."), |errors| format!("{status}. {errors}")),
            Err(_) => format!("{status}."),
        };
        ApiError::PlatformFault {
            message: format!("GQL query failed, status code: {detail}"),
        }
    }

    async fn inspect_errors(
        &self,
        payload: &Value,
        envelope: Option<&CostEnvelope>,
        operation_name: Option<&str>,
        suppress_errors: bool,
    ) -> Result<(), ApiError> {
        let errors = match payload.get("errors") {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Array(list)) if list.is_empty() => return Ok(()),
            Some(Value::String(text)) if text.is_empty() => return Ok(()),
            Some(errors) => errors,
        };

        // A response with both data and errors is ambiguous partial success;
        // only the caller can decide what to do with it.
        if payload.get("data").is_some() && !suppress_errors {
            return Err(ApiError::PlatformFault {
                message: payload.to_string(),
            });
        }

        match errors {
            Value::String(text) => {
                if text.contains(INVALID_ACCESS_TOKEN_MARKER) {
                    self.credential.mark_access_token_invalid();
                    tracing::warn!(
                        store = %self.credential.store(),
                        "the Shopify API token is invalid, flagging the access token"
                    );
                    return Err(ApiError::InvalidAccessToken {
                        store: self.credential.store().to_string(),
                    });
                }
                Err(ApiError::PlatformFault {
                    message: format!("Unknown errors string: {payload}"),
                })
            }
            Value::Array(list) => {
                self.inspect_error_list(list, envelope, payload, operation_name)
                    .await
            }
            other => Err(ApiError::PlatformFault {
                message: format!("Unexpected errors field: {other}"),
            }),
        }
    }

    // Classification looks at the first error only; the generic fallback
    // still reports every message.
    async fn inspect_error_list(
        &self,
        errors: &[Value],
        envelope: Option<&CostEnvelope>,
        payload: &Value,
        operation_name: Option<&str>,
    ) -> Result<(), ApiError> {
        let first = &errors[0];

        if let Some(code) = first.pointer("/extensions/code").and_then(Value::as_str) {
            if code == MAX_COST_EXCEEDED_ERROR_CODE {
                let cost_ceiling = self.credential.graphql_state().await.bucket_max();
                return Err(ApiError::ExceedingMaxCost {
                    message: format!(
                        "Store {}: this query was rejected by the Shopify API and will \
                         never run as written, as the query cost is larger than the max \
                         possible query size (>{cost_ceiling}) for Shopify",
                        self.credential.store(),
                    ),
                });
            }

            if code == THROTTLED_ERROR_CODE {
                let Some(envelope) = envelope else {
                    return Err(ApiError::PlatformFault {
                        message: format!("throttled response carried no cost envelope: {payload}"),
                    });
                };
                let wait = envelope.throttle_wait();
                tracing::debug!(
                    store = %self.credential.store(),
                    requested_cost = envelope.requested_query_cost,
                    wait_secs = wait.as_secs(),
                    "GraphQL query throttled, waiting for the cost bucket to refill"
                );
                tokio::time::sleep(wait).await;
                return Err(ApiError::Throttled);
            }
        }

        if let Some(message) = first.get("message").and_then(Value::as_str) {
            if message == OPERATION_NAME_REQUIRED_ERROR_MESSAGE {
                return Err(ApiError::CallerFault {
                    message: format!(
                        "Store {}: an operation name is required for this query. This \
                         likely means the document contains multiple operations and one \
                         must be selected",
                        self.credential.store(),
                    ),
                });
            }

            if let Some(name) = operation_name {
                if message == format!("No operation named \"{name}\"") {
                    return Err(ApiError::CallerFault {
                        message: format!(
                            "Store {}: no operation named \"{name}\" exists in the query",
                            self.credential.store(),
                        ),
                    });
                }
            }
        }

        let all_messages = errors
            .iter()
            .filter_map(|error| error.get("message").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n");
        Err(ApiError::PlatformFault {
            message: format!("GraphQL query is incorrect:\n{all_messages}"),
        })
    }
}
