//! Store credentials and their per-protocol throttle state.
//!
//! A [`Credential`] is the unit of authentication against one Shopify store:
//! the access token, its granted scopes, and the two leaky buckets Shopify
//! meters that token with (one for the REST Admin API, one for GraphQL query
//! cost). Every executed call mutates the relevant bucket, so credentials are
//! designed to be shared: wrap one in an [`Arc`](std::sync::Arc) and hand it
//! to as many clients and tasks as needed.
//!
//! Persistence is a seam, not a feature: the [`OfflineTokenStore`],
//! [`OnlineTokenStore`] and [`PrivateTokenStore`] traits describe how an
//! application saves and loads credentials, and implementations live entirely
//! on the caller's side.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::auth::{AccessScopes, AssociatedUser};
use crate::clients::throttle::ThrottleState;
use crate::clients::ApiError;
use crate::config::{ApiVersion, ShopDomain};

/// Default REST bucket capacity for a standard Shopify plan.
pub const REST_BUCKET_MAX: u32 = 80;
/// Default REST refill rate in calls per second.
pub const REST_LEAK_RATE: u32 = 4;
/// GraphQL cost bucket capacity, fixed per API version.
pub const GRAPHQL_BUCKET_MAX: u32 = 1000;
/// Default GraphQL cost refill rate in points per second.
pub const GRAPHQL_LEAK_RATE: u32 = 50;

/// Shopify empties a REST bucket over 20 seconds regardless of its size, so
/// the refill rate is always `bucket_max / 20`.
pub(crate) const REST_BUCKET_DRAIN_WINDOW_SECS: u32 = 20;

/// How long an exhausted caller sleeps before re-checking the bucket.
const REFILL_QUANTUM: Duration = Duration::from_secs(1);

/// An access token for one Shopify store, with its throttle state.
///
/// Credentials are created by [`exchange_access_token`](crate::auth::oauth::exchange_access_token)
/// or loaded from persistence through one of the token store traits. The core
/// never disposes of a credential; the caller owns its lifecycle.
///
/// # Concurrency
///
/// Both throttle buckets sit behind async mutexes, and the invalid-token flag
/// is atomic. The lock around a bucket is held only for the refill-and-take
/// critical section, never across a sleep, so one waiting call does not block
/// other calls on the same credential.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use shopify_admin_api::{Credential, ShopDomain};
///
/// let credential = Arc::new(Credential::offline(
///     ShopDomain::new("my-store").unwrap(),
///     "shpat_abc123",
///     "read_products".parse().unwrap(),
/// ));
///
/// assert_eq!(credential.api_url(), "https://my-store.myshopify.com/admin");
/// assert!(!credential.access_token_invalid());
/// ```
#[derive(Debug)]
pub struct Credential {
    store: ShopDomain,
    api_version: Option<ApiVersion>,
    access_token: Option<String>,
    scopes: AccessScopes,
    access_token_invalid: AtomicBool,
    associated_user: Option<AssociatedUser>,
    expires: Option<DateTime<Utc>>,
    rest_throttle: Mutex<ThrottleState>,
    graphql_throttle: Mutex<ThrottleState>,
}

impl Credential {
    /// Creates an offline (app-level) credential. Offline tokens do not expire.
    #[must_use]
    pub fn offline(
        store: ShopDomain,
        access_token: impl Into<String>,
        scopes: AccessScopes,
    ) -> Self {
        Self::build(store, Some(access_token.into()), scopes, None, None)
    }

    /// Creates an online (user-scoped) credential with an expiry.
    #[must_use]
    pub fn online(
        store: ShopDomain,
        access_token: impl Into<String>,
        scopes: AccessScopes,
        associated_user: AssociatedUser,
        expires: DateTime<Utc>,
    ) -> Self {
        Self::build(
            store,
            Some(access_token.into()),
            scopes,
            Some(associated_user),
            Some(expires),
        )
    }

    /// Creates a credential with no access token yet.
    ///
    /// Executing calls against it fails with
    /// [`ApiError::MissingAccessToken`] until the token is obtained.
    #[must_use]
    pub fn uninitialized(store: ShopDomain) -> Self {
        Self::build(store, None, AccessScopes::new(), None, None)
    }

    fn build(
        store: ShopDomain,
        access_token: Option<String>,
        scopes: AccessScopes,
        associated_user: Option<AssociatedUser>,
        expires: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            store,
            api_version: None,
            access_token,
            scopes,
            access_token_invalid: AtomicBool::new(false),
            associated_user,
            expires,
            rest_throttle: Mutex::new(ThrottleState::new(REST_BUCKET_MAX, REST_LEAK_RATE)),
            graphql_throttle: Mutex::new(ThrottleState::new(
                GRAPHQL_BUCKET_MAX,
                GRAPHQL_LEAK_RATE,
            )),
        }
    }

    /// Pins the credential to a specific Admin API version.
    ///
    /// Without a version, API URLs omit the version segment and Shopify serves
    /// the oldest supported version.
    #[must_use]
    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Returns the shop this credential belongs to.
    #[must_use]
    pub const fn store(&self) -> &ShopDomain {
        &self.store
    }

    /// Returns the pinned API version, if any.
    #[must_use]
    pub const fn api_version(&self) -> Option<&ApiVersion> {
        self.api_version.as_ref()
    }

    /// Returns the granted access scopes.
    #[must_use]
    pub const fn scopes(&self) -> &AccessScopes {
        &self.scopes
    }

    /// Returns the access token, if one has been obtained.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the associated user for online credentials.
    #[must_use]
    pub const fn associated_user(&self) -> Option<&AssociatedUser> {
        self.associated_user.as_ref()
    }

    /// Returns the expiry time for online credentials.
    #[must_use]
    pub const fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Returns `true` if the server has rejected this credential's token.
    ///
    /// The flag is flipped by the GraphQL client when Shopify reports an
    /// invalid API key or access token; the caller should trigger re-auth.
    #[must_use]
    pub fn access_token_invalid(&self) -> bool {
        self.access_token_invalid.load(Ordering::Relaxed)
    }

    /// Returns `true` if this credential has passed its expiry time.
    ///
    /// Credentials without an expiry (offline tokens) never expire.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() > expires)
    }

    /// Returns `true` if this credential holds a token that is neither
    /// expired nor flagged invalid.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.access_token.is_some() && !self.expired() && !self.access_token_invalid()
    }

    /// Returns the OAuth token endpoint for this store.
    #[must_use]
    pub fn oauth_url(&self) -> String {
        format!("https://{}/admin/oauth/access_token", self.store)
    }

    /// Returns the Admin API base URL for this store.
    #[must_use]
    pub fn api_url(&self) -> String {
        match &self.api_version {
            None => format!("https://{}/admin", self.store),
            Some(version) => format!("https://{}/admin/api/{version}", self.store),
        }
    }

    /// Returns a snapshot of the REST throttle state.
    pub async fn rest_state(&self) -> ThrottleState {
        *self.rest_throttle.lock().await
    }

    /// Returns a snapshot of the GraphQL cost throttle state.
    pub async fn graphql_state(&self) -> ThrottleState {
        *self.graphql_throttle.lock().await
    }

    pub(crate) fn require_access_token(&self) -> Result<&str, ApiError> {
        self.access_token().ok_or_else(|| ApiError::MissingAccessToken {
            store: self.store.to_string(),
        })
    }

    pub(crate) fn mark_access_token_invalid(&self) {
        self.access_token_invalid.store(true, Ordering::Relaxed);
    }

    /// Suspends until the REST bucket yields a call slot, then takes it.
    ///
    /// The bucket lock is released before each sleep; refill and decrement
    /// happen under one lock acquisition so concurrent callers can never
    /// double-spend a token. [`RestClient`](crate::clients::RestClient) calls
    /// this before every request; it is public so callers routing their own
    /// REST traffic can share the same gate.
    pub async fn acquire_rest(&self) {
        loop {
            {
                let mut throttle = self.rest_throttle.lock().await;
                throttle.refill(Instant::now());
                if throttle.try_take() {
                    return;
                }
            }
            tokio::time::sleep(REFILL_QUANTUM).await;
        }
    }

    /// Empties the REST bucket, as after a server-reported exhaustion
    /// (HTTP 429).
    pub async fn drain_rest(&self) {
        self.rest_throttle.lock().await.drain();
    }

    /// Re-derives the REST bucket from the server-reported size.
    ///
    /// Shopify may change the limit per plan tier without notice, so every
    /// successful REST response recalibrates.
    pub(crate) async fn recalibrate_rest(&self, bucket_max: u32) {
        // Floor at one token per second so acquisition can always make
        // progress, whatever the server reports.
        let leak_rate = (bucket_max / REST_BUCKET_DRAIN_WINDOW_SECS).max(1);
        let mut throttle = self.rest_throttle.lock().await;
        if throttle.bucket_max() != bucket_max {
            tracing::debug!(
                store = %self.store,
                bucket_max,
                leak_rate,
                "recalibrated REST call limit from response header"
            );
        }
        throttle.recalibrate(bucket_max, leak_rate);
    }

    /// Overwrites the GraphQL cost bucket from a server-reported throttle
    /// status.
    pub(crate) async fn sync_graphql(&self, currently_available: u32, restore_rate: u32) {
        self.graphql_throttle
            .lock()
            .await
            .sync(currently_available, restore_rate, Instant::now());
    }
}

// Verify Credential is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Credential>();
};

/// Persistence seam for offline (app-level) credentials.
///
/// The client never calls these hooks itself; they exist so applications can
/// plug in their own storage (database, secret manager, config file) behind a
/// uniform interface.
pub trait OfflineTokenStore {
    /// The storage backend's error type.
    type Error;

    /// Persists the credential for its store.
    fn save(&self, credential: &Credential) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Loads the credential previously saved for `store`.
    fn load(
        &self,
        store: &ShopDomain,
    ) -> impl Future<Output = Result<Credential, Self::Error>> + Send;
}

/// Persistence seam for online (user-scoped) credentials.
///
/// Online tokens are keyed by store *and* user, since each store user
/// authorizes the app separately.
pub trait OnlineTokenStore {
    /// The storage backend's error type.
    type Error;

    /// Persists the credential for its store and associated user.
    fn save(&self, credential: &Credential) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Loads the credential previously saved for `store` and `user_id`.
    fn load(
        &self,
        store: &ShopDomain,
        user_id: u64,
    ) -> impl Future<Output = Result<Credential, Self::Error>> + Send;
}

/// Persistence seam for private-app credentials.
///
/// Private tokens come from configuration rather than an OAuth exchange, so
/// there is nothing to save.
pub trait PrivateTokenStore {
    /// The storage backend's error type.
    type Error;

    /// Loads the configured credential for `store`.
    fn load(
        &self,
        store: &ShopDomain,
    ) -> impl Future<Output = Result<Credential, Self::Error>> + Send;
}
