//! REST Admin API execution path.
//!
//! The REST API is metered per credential with a leaky call bucket. This
//! module gates every request on that bucket, classifies failures by status
//! code, and recalibrates the bucket size from the
//! `X-Shopify-Shop-Api-Call-Limit` header on every successful response.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopify_admin_api::{Credential, RestClient, RestRequest, ShopDomain};
//!
//! let credential = Arc::new(Credential::offline(
//!     ShopDomain::new("my-store").unwrap(),
//!     "shpat_abc123",
//!     "read_products".parse().unwrap(),
//! ));
//!
//! let client = RestClient::new(Arc::clone(&credential));
//! let shop = client.execute(RestRequest::get("/shop.json")).await?;
//! println!("shop: {}", shop["shop"]["name"]);
//! ```

mod client;

pub use client::{CallLimit, RestClient, CALL_LIMIT_HEADER};
