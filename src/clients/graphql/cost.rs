//! GraphQL query cost reporting.
//!
//! Shopify meters the GraphQL Admin API by query cost rather than call count
//! and reports the account's budget in the `extensions.cost` field of every
//! response. The envelope is consumed transiently: it updates the
//! credential's cost throttle and, on throttled responses, determines how
//! long to wait before the query can possibly succeed.

use std::time::Duration;

use serde::Deserialize;

use crate::clients::throttle::whole_tokens;

/// Server-reported cost metadata from `extensions.cost`.
///
/// # Example
///
/// ```rust
/// use shopify_admin_api::clients::graphql::CostEnvelope;
/// use serde_json::json;
///
/// let response = json!({
///     "errors": [{"extensions": {"code": "THROTTLED"}}],
///     "extensions": {
///         "cost": {
///             "requestedQueryCost": 100,
///             "actualQueryCost": null,
///             "throttleStatus": {
///                 "maximumAvailable": 1000.0,
///                 "currentlyAvailable": 50.0,
///                 "restoreRate": 50.0
///             }
///         }
///     }
/// });
///
/// let envelope = CostEnvelope::from_response(&response).unwrap();
/// assert_eq!(envelope.requested_query_cost, 100);
/// assert_eq!(envelope.throttle_wait().as_secs(), 1);
/// ```
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEnvelope {
    /// The cost Shopify computed for the query as written.
    pub requested_query_cost: u32,
    /// The cost actually incurred; `null` when the query did not run.
    #[serde(default)]
    pub actual_query_cost: Option<u32>,
    /// The account's current throttle budget.
    pub throttle_status: ThrottleStatus,
}

/// The budget portion of the cost envelope.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleStatus {
    /// The cost bucket's capacity.
    pub maximum_available: f64,
    /// Cost points currently available.
    pub currently_available: f64,
    /// Cost points restored per second.
    pub restore_rate: f64,
}

impl CostEnvelope {
    /// Extracts the envelope from a full GraphQL response body, if present
    /// and well-formed.
    #[must_use]
    pub fn from_response(payload: &serde_json::Value) -> Option<Self> {
        payload
            .pointer("/extensions/cost")
            .and_then(|cost| serde_json::from_value(cost.clone()).ok())
    }

    /// How long to wait until the bucket has leaked enough for the requested
    /// cost: `ceil((requested - available) / restore_rate)` seconds, floored
    /// at zero.
    #[must_use]
    pub fn throttle_wait(&self) -> Duration {
        let rate = self.throttle_status.restore_rate;
        if rate <= 0.0 {
            // A non-positive rate cannot be divided by; wait one second.
            return Duration::from_secs(1);
        }
        let deficit = f64::from(self.requested_query_cost) - self.throttle_status.currently_available;
        let seconds = (deficit / rate).ceil().max(0.0);
        Duration::from_secs_f64(seconds)
    }

    /// The currently available budget, truncated to whole cost points.
    #[must_use]
    pub fn available_points(&self) -> u32 {
        whole_tokens(self.throttle_status.currently_available)
    }

    /// The restore rate, truncated to whole cost points per second.
    #[must_use]
    pub fn restore_rate_points(&self) -> u32 {
        whole_tokens(self.throttle_status.restore_rate)
    }
}
