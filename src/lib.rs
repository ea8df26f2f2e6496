//! # Shopify Admin API Client
//!
//! An async Rust client for the Shopify Admin API, built around a
//! dual-protocol rate-limiting and retry engine: the REST and GraphQL Admin
//! APIs are throttled with two independent leaky buckets per credential, and
//! every call is wrapped in a retry policy that distinguishes transient
//! failures (retried) from caller faults (surfaced immediately).
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ShopifyConfig`] and validated newtypes
//! - OAuth access token exchange producing [`Credential`]s
//! - Per-credential leaky-bucket throttling for REST calls
//! - Server-reported cost throttling for GraphQL queries
//! - Classified errors ([`ApiError`]) with bounded, jittered retries
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use shopify_admin_api::{ApiVersion, Credential, ShopDomain};
//!
//! // A credential loaded from persistence or obtained via OAuth exchange
//! let credential = Arc::new(
//!     Credential::offline(
//!         ShopDomain::new("my-store").unwrap(),
//!         "shpat_abc123",
//!         "read_products,write_orders".parse().unwrap(),
//!     )
//!     .with_api_version(ApiVersion::latest()),
//! );
//!
//! assert!(credential.is_active());
//! ```
//!
//! ## Making API Requests
//!
//! ```rust,ignore
//! use shopify_admin_api::{GraphqlClient, RestClient, RestRequest};
//!
//! // REST: gated on the credential's call bucket
//! let rest = RestClient::new(Arc::clone(&credential));
//! let shop = rest.get("/shop.json").await?;
//!
//! // GraphQL: throttled by server-reported query cost
//! let graphql = GraphqlClient::new(Arc::clone(&credential));
//! let data = graphql
//!     .execute("query { shop { name } }", None, None, false)
//!     .await?;
//! ```
//!
//! ## Rate Limiting
//!
//! Both throttles live on the [`Credential`], so any number of clients and
//! tasks sharing one credential stay inside Shopify's limits together:
//!
//! - **REST**: a call bucket (default 80, refilled at `bucket_max / 20` per
//!   second) gates every request. HTTP 429 drains the bucket and the call
//!   waits for refill; the caller never sees a rate-limit error.
//! - **GraphQL**: the cost bucket (1000 points per API version) tracks the
//!   server-reported budget. A throttled query sleeps exactly
//!   `ceil((requested - available) / restore_rate)` seconds before retrying.
//!
//! ## Error Handling
//!
//! Every failure is classified once, at the layer that has the information,
//! into [`ApiError`]; the retry orchestrator dispatches on the classification
//! alone. Retryable failures are invisible to the caller unless attempts are
//! exhausted, in which case the last classified error surfaces unchanged.
//!
//! ## Design Principles
//!
//! - **No global state**: transports and configuration are passed explicitly
//! - **Fail-fast validation**: all newtypes validate on construction
//! - **Thread-safe**: all types are `Send + Sync`; credentials are designed
//!   to be shared behind an `Arc`
//! - **Async-first**: designed for the Tokio runtime; throttle waits suspend
//!   the one call without blocking others

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;

// Re-export public types at crate root for convenience
pub use auth::{
    exchange_access_token, AccessScopes, AssociatedUser, Credential, OfflineTokenStore,
    OnlineTokenStore, PrivateTokenStore,
};
pub use config::{ApiKey, ApiSecretKey, ApiVersion, ShopDomain, ShopifyConfig, ShopifyConfigBuilder};
pub use error::ConfigError;

// Re-export client types
pub use clients::{
    ApiError, CallLimit, CostEnvelope, GraphqlClient, Method, RestClient, RestRequest,
    RestRequestBuilder, RetryPolicy, ThrottleState, ThrottleStatus,
};
