//! Configuration types for the Shopify Admin API client.
//!
//! The main types in this module are:
//!
//! - [`ShopifyConfig`]: App-level configuration (credentials + API version)
//! - [`ShopifyConfigBuilder`]: A builder for constructing [`ShopifyConfig`]
//! - [`ApiKey`] / [`ApiSecretKey`]: Validated credential newtypes
//! - [`ShopDomain`]: A validated Shopify shop domain
//! - [`ApiVersion`]: The Shopify API version to use
//!
//! # Example
//!
//! ```rust
//! use shopify_admin_api::{ShopifyConfig, ApiKey, ApiSecretKey, ApiVersion};
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiKey, ApiSecretKey, ShopDomain};
pub use version::ApiVersion;

use crate::error::ConfigError;

/// App-level configuration for the Shopify Admin API client.
///
/// Holds the app credentials used for OAuth token exchange and the API version
/// used when building Admin API URLs. Configuration is instance-based and
/// passed explicitly; there is no process-wide state.
///
/// # Example
///
/// ```rust
/// use shopify_admin_api::{ShopifyConfig, ApiKey, ApiSecretKey};
///
/// let config = ShopifyConfig::builder()
///     .api_key(ApiKey::new("your-api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("your-secret").unwrap())
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct ShopifyConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    api_version: ApiVersion,
}

impl ShopifyConfig {
    /// Creates a new builder for constructing a `ShopifyConfig`.
    #[must_use]
    pub fn builder() -> ShopifyConfigBuilder {
        ShopifyConfigBuilder::new()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }
}

// Verify ShopifyConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyConfig>();
};

/// Builder for constructing [`ShopifyConfig`] instances.
///
/// Required fields are `api_key` and `api_secret_key`; `api_version` defaults
/// to the latest stable version.
///
/// # Example
///
/// ```rust
/// use shopify_admin_api::{ShopifyConfig, ApiKey, ApiSecretKey, ApiVersion};
///
/// let config = ShopifyConfig::builder()
///     .api_key(ApiKey::new("key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .api_version(ApiVersion::V2025_01)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct ShopifyConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    api_version: Option<ApiVersion>,
}

impl ShopifyConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the API version (defaults to [`ApiVersion::latest`]).
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Builds the [`ShopifyConfig`], validating required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key` or
    /// `api_secret_key` has not been set.
    pub fn build(self) -> Result<ShopifyConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self.api_secret_key.ok_or(ConfigError::MissingRequiredField {
            field: "api_secret_key",
        })?;

        Ok(ShopifyConfig {
            api_key,
            api_secret_key,
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
        })
    }
}
