//! Classified failure taxonomy for Shopify API calls.
//!
//! Classification happens at the lowest layer that has the information (the
//! HTTP status code or the parsed error body); the retry orchestrator only
//! inspects the classification, never the payload. Terminal errors carry the
//! original diagnostic message so callers can log it verbatim.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_admin_api::ApiError;
//!
//! match client.execute(request).await {
//!     Ok(body) => println!("result: {body}"),
//!     Err(ApiError::CallerFault { message }) => {
//!         // A client bug: fix the request, retrying will not help.
//!         eprintln!("bad request: {message}");
//!     }
//!     Err(ApiError::InvalidAccessToken { store }) => {
//!         // The credential was flagged invalid; trigger re-auth.
//!         eprintln!("token rejected for {store}");
//!     }
//!     Err(other) => eprintln!("call failed: {other}"),
//! }
//! ```

use thiserror::Error;

/// A classified failure from a Shopify Admin API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request is invalid as written (4xx REST responses, malformed
    /// GraphQL queries, missing or wrong operation names). Signals a client
    /// bug; never retried.
    #[error("{message}")]
    CallerFault {
        /// Diagnostic message including the original response payload.
        message: String,
    },

    /// Shopify failed to serve an otherwise valid request (REST 5xx, generic
    /// GraphQL error lists, partial-success responses).
    #[error("{message}")]
    PlatformFault {
        /// Diagnostic message including the original response payload.
        message: String,
    },

    /// Shopify returned a transient server error (GraphQL 500/503).
    #[error("the Shopify API returned an intermittent error: {status}")]
    Intermittent {
        /// The HTTP status code of the response.
        status: u16,
    },

    /// The response body could not be parsed as JSON. Shopify occasionally
    /// returns corrupt bodies transiently, so this is retryable.
    #[error("the Shopify API returned a response body that is not valid JSON")]
    InvalidResponseBody,

    /// The call was throttled by the GraphQL cost limiter. The required wait
    /// has already been served by the time this error is observed.
    #[error("the call was throttled by the Shopify API")]
    Throttled,

    /// The query's cost structurally exceeds the maximum possible bucket size
    /// and can never succeed as written. Never retried.
    #[error("{message}")]
    ExceedingMaxCost {
        /// Diagnostic message naming the store and the cost ceiling.
        message: String,
    },

    /// Shopify rejected the access token. The credential's
    /// `access_token_invalid` flag has been flipped; the caller should
    /// trigger re-auth.
    #[error("store {store}: the Shopify access token was rejected as invalid")]
    InvalidAccessToken {
        /// The store whose token was rejected.
        store: String,
    },

    /// The credential has no access token yet.
    #[error("store {store}: the access token has not been initialized")]
    MissingAccessToken {
        /// The store whose credential is uninitialized.
        store: String,
    },

    /// The request never produced a response (connection, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// Returns `true` if the REST retry loop may reissue a call that failed
    /// with this error.
    ///
    /// REST retries everything that is not attributable to the caller or to
    /// a structurally dead credential/query.
    #[must_use]
    pub const fn retryable_for_rest(&self) -> bool {
        !matches!(
            self,
            Self::CallerFault { .. }
                | Self::MissingAccessToken { .. }
                | Self::InvalidAccessToken { .. }
                | Self::ExceedingMaxCost { .. }
        )
    }

    /// Returns `true` if the GraphQL retry loop may reissue a call that
    /// failed with this error.
    ///
    /// GraphQL only retries throttling, corrupt bodies and intermittent
    /// server errors; everything else is terminal on first occurrence.
    #[must_use]
    pub const fn retryable_for_graphql(&self) -> bool {
        matches!(
            self,
            Self::Throttled | Self::InvalidResponseBody | Self::Intermittent { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_retries_platform_faults_but_not_caller_faults() {
        let platform = ApiError::PlatformFault {
            message: "boom".to_string(),
        };
        let caller = ApiError::CallerFault {
            message: "bad request".to_string(),
        };

        assert!(platform.retryable_for_rest());
        assert!(!caller.retryable_for_rest());
    }

    #[test]
    fn test_rest_never_retries_credential_or_cost_errors() {
        assert!(!ApiError::MissingAccessToken {
            store: "s.myshopify.com".to_string()
        }
        .retryable_for_rest());
        assert!(!ApiError::InvalidAccessToken {
            store: "s.myshopify.com".to_string()
        }
        .retryable_for_rest());
        assert!(!ApiError::ExceedingMaxCost {
            message: "too big".to_string()
        }
        .retryable_for_rest());
    }

    #[test]
    fn test_graphql_retries_only_transient_classifications() {
        assert!(ApiError::Throttled.retryable_for_graphql());
        assert!(ApiError::InvalidResponseBody.retryable_for_graphql());
        assert!(ApiError::Intermittent { status: 503 }.retryable_for_graphql());

        assert!(!ApiError::PlatformFault {
            message: "gql".to_string()
        }
        .retryable_for_graphql());
        assert!(!ApiError::CallerFault {
            message: "gql".to_string()
        }
        .retryable_for_graphql());
        assert!(!ApiError::ExceedingMaxCost {
            message: "gql".to_string()
        }
        .retryable_for_graphql());
        assert!(!ApiError::InvalidAccessToken {
            store: "s".to_string()
        }
        .retryable_for_graphql());
    }

    #[test]
    fn test_terminal_errors_preserve_diagnostic_message() {
        let error = ApiError::CallerFault {
            message: "ERROR in store test: fetch products\nAPI response code: 404\n".to_string(),
        };
        assert!(error.to_string().contains("API response code: 404"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ApiError::Throttled;
        let _: &dyn std::error::Error = &error;
    }
}
