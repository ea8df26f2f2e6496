//! Leaky-bucket throttle state shared by the REST and GraphQL clients.
//!
//! Shopify rate-limits both Admin APIs with leaky buckets: a capacity-bounded
//! counter drains on use and refills continuously over time. The REST bucket
//! counts calls and its size is re-read from response headers; the GraphQL
//! bucket counts query cost and its refill rate is reported by the server.
//! [`ThrottleState`] holds the arithmetic common to both; the per-protocol
//! acquisition and recalibration logic lives on
//! [`Credential`](crate::auth::Credential).

use tokio::time::Instant;

/// Leaky-bucket state for one protocol of one credential.
///
/// The state itself is plain data; callers are expected to guard it with a
/// per-credential lock so that a refill and the decrement it permits happen
/// atomically. The throttle never fails: given a positive leak rate, waiting
/// long enough always makes a token available.
///
/// Invariant: `0 <= tokens <= bucket_max` at every observation point, and
/// refilling never removes tokens.
#[derive(Clone, Copy, Debug)]
pub struct ThrottleState {
    bucket_max: u32,
    tokens: u32,
    leak_rate: u32,
    last_update: Instant,
}

impl ThrottleState {
    /// Creates a full bucket with the given capacity and refill rate.
    ///
    /// `last_update` is anchored to the current instant, so a freshly created
    /// bucket never refills retroactively.
    #[must_use]
    pub fn new(bucket_max: u32, leak_rate: u32) -> Self {
        Self {
            bucket_max,
            tokens: bucket_max,
            leak_rate,
            last_update: Instant::now(),
        }
    }

    /// Returns the current number of available tokens.
    #[must_use]
    pub const fn tokens(&self) -> u32 {
        self.tokens
    }

    /// Returns the bucket capacity.
    #[must_use]
    pub const fn bucket_max(&self) -> u32 {
        self.bucket_max
    }

    /// Returns the refill rate in tokens per second.
    #[must_use]
    pub const fn leak_rate(&self) -> u32 {
        self.leak_rate
    }

    /// Returns the instant of the last effective refill.
    #[must_use]
    pub const fn last_update(&self) -> Instant {
        self.last_update
    }

    /// Credits tokens leaked back into the bucket since the last update.
    ///
    /// `last_update` only advances when at least one whole token was added;
    /// fractional accumulation keeps its original anchor so that repeated
    /// refills in quick succession do not lose time.
    pub fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_update);
        let leaked = whole_tokens(elapsed.as_secs_f64() * f64::from(self.leak_rate));
        if leaked < 1 {
            return;
        }
        self.tokens = self.tokens.saturating_add(leaked).min(self.bucket_max);
        self.last_update = now;
    }

    /// Takes one token if the bucket holds more than one.
    ///
    /// Acquisition never drains the bucket below one token; callers that see
    /// `false` must wait for a refill and try again.
    pub fn try_take(&mut self) -> bool {
        if self.tokens > 1 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Empties the bucket. Used when the server reports exhaustion (HTTP 429).
    pub fn drain(&mut self) {
        self.tokens = 0;
    }

    /// Resizes the bucket from server-reported limits.
    ///
    /// Current tokens are clamped into the new capacity; `last_update` is left
    /// alone so in-flight fractional refill is not lost.
    pub fn recalibrate(&mut self, bucket_max: u32, leak_rate: u32) {
        self.bucket_max = bucket_max;
        self.leak_rate = leak_rate;
        self.tokens = self.tokens.min(bucket_max);
    }

    /// Overwrites the available tokens and refill rate from a server report.
    ///
    /// Unlike [`refill`](Self::refill), this re-anchors `last_update` to `now`:
    /// the server's number is authoritative as of the response, and local
    /// leaking resumes from there.
    pub fn sync(&mut self, tokens: u32, leak_rate: u32, now: Instant) {
        self.tokens = tokens.min(self.bucket_max);
        self.leak_rate = leak_rate;
        self.last_update = now;
    }
}

/// Truncates a non-negative token quantity to a whole count, saturating at
/// the `u32` bounds.
pub(crate) fn whole_tokens(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let truncated = value.floor() as u32;
        truncated
    }
}
