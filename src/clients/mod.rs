//! Rate-limit-aware execution clients for the Shopify Admin API.
//!
//! # Overview
//!
//! Two clients share one [`Credential`](crate::auth::Credential) and its
//! throttle state:
//!
//! - [`RestClient`]: leaky-bucket-gated REST calls with status-code error
//!   classification and dynamic bucket recalibration from response headers
//! - [`GraphqlClient`]: cost-metered GraphQL queries with structured
//!   error-list interpretation
//!
//! Both wrap each logical call in the same retry orchestration
//! ([`RetryPolicy`]): a bounded number of attempts with a short random delay
//! in between, reissuing only failures whose [`ApiError`] classification is
//! transient for that protocol. Terminal classifications (caller faults,
//! rejected credentials, structurally oversized queries) surface on first
//! occurrence.
//!
//! # Control Flow
//!
//! ```text
//! execute(request)
//!   -> retry orchestrator
//!      -> throttle gate (REST) / nothing (GraphQL)
//!      -> network call
//!      -> classify response, update throttle state
//!   <- result, or classified ApiError
//! ```

mod errors;
pub mod graphql;
mod request;
mod retry;
pub mod rest;
pub mod throttle;

pub use errors::ApiError;
pub use graphql::{CostEnvelope, GraphqlClient, ThrottleStatus};
pub use request::{Method, RestRequest, RestRequestBuilder};
pub use retry::{RetryPolicy, API_CALL_RETRY_ATTEMPTS};
pub use rest::{CallLimit, RestClient, CALL_LIMIT_HEADER};
pub use throttle::ThrottleState;

/// Header carrying the access token on every authenticated Admin API call.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
