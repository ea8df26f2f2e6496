//! Credentials, scopes and token acquisition.
//!
//! # Overview
//!
//! - [`Credential`]: an access token for one store plus the throttle state
//!   Shopify meters it with
//! - [`AccessScopes`]: granted OAuth scopes with implied-scope expansion
//! - [`AssociatedUser`]: the store user an online credential is tied to
//! - [`oauth`]: exchanging an authorization code for a token
//! - [`OfflineTokenStore`] / [`OnlineTokenStore`] / [`PrivateTokenStore`]:
//!   persistence seams implemented by the application
//!
//! # Credential kinds
//!
//! Shopify distinguishes three kinds of tokens, which differ only in how
//! they are obtained and persisted:
//!
//! - **Offline**: app-level, long-lived, one per store.
//! - **Online**: user-scoped, expiring, one per store user.
//! - **Private**: configured out-of-band for a single store, never exchanged.
//!
//! The execution core is parametric over none of this: it only needs the
//! access token and the two throttle states every [`Credential`] carries.

mod associated_user;
mod credential;
pub mod oauth;
mod scopes;

pub use associated_user::AssociatedUser;
pub use credential::{
    Credential, OfflineTokenStore, OnlineTokenStore, PrivateTokenStore, GRAPHQL_BUCKET_MAX,
    GRAPHQL_LEAK_RATE, REST_BUCKET_MAX, REST_LEAK_RATE,
};
pub use oauth::exchange_access_token;
pub use scopes::AccessScopes;
