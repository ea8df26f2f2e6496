//! OAuth access token acquisition.
//!
//! Implements the final step of Shopify's authorization code flow: exchanging
//! the callback `code` for an access token and wrapping the result in a
//! [`Credential`]. Callback routing, HMAC verification and state handling are
//! the embedding application's concern; this module only speaks to the token
//! endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_admin_api::{exchange_access_token, ShopDomain, ShopifyConfig};
//!
//! let transport = reqwest::Client::new();
//! let shop = ShopDomain::new("my-store").unwrap();
//! let credential = exchange_access_token(&transport, &config, &shop, "auth-code").await?;
//! assert!(credential.is_active());
//! ```

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AccessScopes, AssociatedUser, Credential};
use crate::clients::ApiError;
use crate::config::{ShopDomain, ShopifyConfig};

/// Request body for the authorization code exchange.
#[derive(Debug, Serialize)]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Shopify's access token response.
///
/// Offline tokens carry only `access_token` and `scope`; online tokens add
/// the associated user, the user-scoped grant and an expiry.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    scope: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    associated_user_scope: Option<String>,
    #[serde(default)]
    associated_user: Option<AssociatedUser>,
}

/// Exchanges an authorization code for an access token.
///
/// Issues a POST to the store's `/admin/oauth/access_token` endpoint and
/// builds a [`Credential`] from the response: an online credential when
/// Shopify reports an associated user, an offline credential otherwise. The
/// credential inherits the API version from `config`.
///
/// # Errors
///
/// - [`ApiError::CallerFault`] for 4xx responses (bad code, bad credentials)
/// - [`ApiError::PlatformFault`] for other non-2xx responses
/// - [`ApiError::InvalidResponseBody`] when the body is not the token payload
/// - [`ApiError::Network`] when the request never completes
pub async fn exchange_access_token(
    transport: &reqwest::Client,
    config: &ShopifyConfig,
    shop: &ShopDomain,
    code: &str,
) -> Result<Credential, ApiError> {
    let token_url = format!("https://{shop}/admin/oauth/access_token");

    let request_body = AccessTokenRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        code,
    };

    let response = transport.post(&token_url).json(&request_body).send().await?;
    let status = response.status().as_u16();

    if !(200..300).contains(&status) {
        let body = response.text().await.unwrap_or_default();
        let message = format!(
            "ERROR in store {shop}: access token exchange failed\n\
             API response code: {status}\nAPI response body: {body}\n"
        );
        return if (400..500).contains(&status) {
            Err(ApiError::CallerFault { message })
        } else {
            Err(ApiError::PlatformFault { message })
        };
    }

    let token_response = response
        .json::<AccessTokenResponse>()
        .await
        .map_err(|_| ApiError::InvalidResponseBody)?;

    credential_from_token_response(config, shop.clone(), token_response)
}

fn credential_from_token_response(
    config: &ShopifyConfig,
    shop: ShopDomain,
    response: AccessTokenResponse,
) -> Result<Credential, ApiError> {
    let credential = match response.associated_user {
        Some(user) => {
            // Online grants are scoped to the user, not the app install.
            let scope_source = response
                .associated_user_scope
                .as_deref()
                .unwrap_or(&response.scope);
            let scopes = parse_scopes(&shop, scope_source)?;
            let expires = Utc::now() + Duration::seconds(response.expires_in.unwrap_or(0));
            Credential::online(shop, response.access_token, scopes, user, expires)
        }
        None => {
            let scopes = parse_scopes(&shop, &response.scope)?;
            Credential::offline(shop, response.access_token, scopes)
        }
    };

    Ok(credential.with_api_version(config.api_version().clone()))
}

fn parse_scopes(shop: &ShopDomain, scope: &str) -> Result<AccessScopes, ApiError> {
    scope.parse().map_err(|error| ApiError::PlatformFault {
        message: format!("ERROR in store {shop}: token response carried unusable scopes: {error}"),
    })
}
