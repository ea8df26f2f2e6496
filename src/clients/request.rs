//! REST request descriptors.

use std::fmt;

/// HTTP methods supported by the REST Admin API, each with the status code
/// Shopify returns on success.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// HTTP GET; succeeds with 200.
    Get,
    /// HTTP POST; succeeds with 201.
    Post,
    /// HTTP PUT; succeeds with 200.
    Put,
    /// HTTP DELETE; succeeds with 200.
    Delete,
}

impl Method {
    /// Returns the status code Shopify reports for a successful call.
    #[must_use]
    pub const fn default_expected_status(self) -> u16 {
        match self {
            Self::Post => 201,
            Self::Get | Self::Put | Self::Delete => 200,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
            Self::Put => f.write_str("PUT"),
            Self::Delete => f.write_str("DELETE"),
        }
    }
}

/// One REST Admin API request, immutable per call.
///
/// The expected status defaults per method and can be overridden for
/// endpoints with unusual success codes. The `debug` label is free-form
/// context that ends up in error diagnostics.
///
/// # Example
///
/// ```rust
/// use shopify_admin_api::{Method, RestRequest};
/// use serde_json::json;
///
/// let request = RestRequest::builder(Method::Post, "/products.json")
///     .body(json!({"product": {"title": "A Mirror"}}))
///     .debug("create product")
///     .build();
///
/// assert_eq!(request.expected_status, 201);
/// ```
#[derive(Clone, Debug)]
pub struct RestRequest {
    /// The HTTP method for this request.
    pub method: Method,
    /// The endpoint path appended to the Admin API base URL,
    /// e.g. `/products.json`.
    pub endpoint: String,
    /// The status code that counts as success for this call.
    pub expected_status: u16,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
    /// Free-form label included in error diagnostics.
    pub debug: String,
}

impl RestRequest {
    /// Creates a new builder for the given method and endpoint.
    #[must_use]
    pub fn builder(method: Method, endpoint: impl Into<String>) -> RestRequestBuilder {
        RestRequestBuilder {
            method,
            endpoint: endpoint.into(),
            expected_status: None,
            body: None,
            debug: String::new(),
        }
    }

    /// Shorthand for a GET request with defaults.
    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::builder(Method::Get, endpoint).build()
    }

    /// Shorthand for a POST request with a JSON body.
    #[must_use]
    pub fn post(endpoint: impl Into<String>, body: serde_json::Value) -> Self {
        Self::builder(Method::Post, endpoint).body(body).build()
    }

    /// Shorthand for a PUT request with a JSON body.
    #[must_use]
    pub fn put(endpoint: impl Into<String>, body: serde_json::Value) -> Self {
        Self::builder(Method::Put, endpoint).body(body).build()
    }

    /// Shorthand for a DELETE request with defaults.
    #[must_use]
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::builder(Method::Delete, endpoint).build()
    }
}

/// Builder for [`RestRequest`].
#[derive(Debug)]
pub struct RestRequestBuilder {
    method: Method,
    endpoint: String,
    expected_status: Option<u16>,
    body: Option<serde_json::Value>,
    debug: String,
}

impl RestRequestBuilder {
    /// Sets the JSON body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Overrides the status code that counts as success.
    #[must_use]
    pub const fn expected_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    /// Sets the debug label included in error diagnostics.
    #[must_use]
    pub fn debug(mut self, label: impl Into<String>) -> Self {
        self.debug = label.into();
        self
    }

    /// Builds the request, filling the expected status from the method when
    /// not overridden.
    #[must_use]
    pub fn build(self) -> RestRequest {
        RestRequest {
            expected_status: self
                .expected_status
                .unwrap_or_else(|| self.method.default_expected_status()),
            method: self.method,
            endpoint: self.endpoint,
            body: self.body,
            debug: self.debug,
        }
    }
}
