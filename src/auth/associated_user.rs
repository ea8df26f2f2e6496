//! Associated user information for online credentials.

use serde::{Deserialize, Serialize};

/// The Shopify user an online credential is scoped to.
///
/// Online access tokens are tied to a specific store user; Shopify reports
/// that user in the OAuth access token response and this struct captures it.
///
/// # Example
///
/// ```rust
/// use shopify_admin_api::AssociatedUser;
///
/// let json = r#"{
///     "id": 902541635,
///     "first_name": "John",
///     "last_name": "Smith",
///     "email": "john@example.com",
///     "email_verified": true,
///     "account_owner": true,
///     "locale": "en",
///     "collaborator": false
/// }"#;
///
/// let user: AssociatedUser = serde_json::from_str(json).unwrap();
/// assert_eq!(user.id, 902_541_635);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedUser {
    /// The Shopify user ID.
    pub id: u64,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's email address.
    pub email: String,
    /// Whether the user's email has been verified.
    pub email_verified: bool,
    /// Whether the user is the account owner.
    pub account_owner: bool,
    /// The user's locale preference (e.g., "en", "fr").
    pub locale: String,
    /// Whether the user is a collaborator.
    pub collaborator: bool,
}

// Verify AssociatedUser is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AssociatedUser>();
};
