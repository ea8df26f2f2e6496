//! GraphQL Admin API execution path.
//!
//! GraphQL calls are metered by query cost, not call count, and the budget is
//! server-reported: every response's `extensions.cost` envelope updates the
//! credential's cost throttle, and a throttled query sleeps exactly long
//! enough for the bucket to cover its cost before the retry. Error responses
//! arrive as HTTP 200 with a heterogeneous `errors` field (a list, or
//! sometimes a bare string), which this module interprets into the
//! [`ApiError`](crate::clients::ApiError) taxonomy.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopify_admin_api::{Credential, GraphqlClient, ShopDomain};
//! use serde_json::json;
//!
//! let credential = Arc::new(Credential::offline(
//!     ShopDomain::new("my-store").unwrap(),
//!     "shpat_abc123",
//!     "read_products".parse().unwrap(),
//! ));
//! let client = GraphqlClient::new(credential);
//!
//! let data = client
//!     .execute(
//!         "query GetProduct($id: ID!) { product(id: $id) { title } }",
//!         Some(json!({"id": "gid://shopify/Product/123"})),
//!         Some("GetProduct"),
//!         false,
//!     )
//!     .await?;
//! ```

mod client;
mod cost;

pub use client::{
    GraphqlClient, MAX_COST_EXCEEDED_ERROR_CODE, OPERATION_NAME_REQUIRED_ERROR_MESSAGE,
    THROTTLED_ERROR_CODE,
};
pub use cost::{CostEnvelope, ThrottleStatus};
