//! OAuth scope handling for the Shopify Admin API.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A set of OAuth access scopes granted to a credential.
///
/// Parses Shopify's comma-separated scope strings, deduplicates, and expands
/// implied scopes (`write_products` implies `read_products`).
///
/// # Serialization
///
/// `AccessScopes` serializes to and deserializes from a comma-separated string,
/// matching the `scope` field of Shopify's access token responses:
///
/// ```rust
/// use shopify_admin_api::AccessScopes;
///
/// let scopes: AccessScopes = "write_orders,read_products".parse().unwrap();
/// let json = serde_json::to_string(&scopes).unwrap();
/// assert_eq!(json, "\"read_orders,read_products,write_orders\"");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AccessScopes {
    scopes: BTreeSet<String>,
}

impl AccessScopes {
    /// Creates an empty scope set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scopes: BTreeSet::new(),
        }
    }

    /// Returns `true` if the scope set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns `true` if the set contains the given scope.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Returns `true` if this scope set covers all scopes in `other`.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.scopes.iter().all(|s| self.scopes.contains(s))
    }

    /// Returns an iterator over the scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    // write_foo implies read_foo; same for the unauthenticated_ prefix.
    fn implied_scope(scope: &str) -> Option<String> {
        scope
            .strip_prefix("unauthenticated_write_")
            .map(|rest| format!("unauthenticated_read_{rest}"))
            .or_else(|| {
                scope
                    .strip_prefix("write_")
                    .map(|rest| format!("read_{rest}"))
            })
    }
}

impl FromStr for AccessScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = BTreeSet::new();

        for scope in s.split(',') {
            let scope = scope.trim();
            if scope.is_empty() {
                continue;
            }
            if scope.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("scope '{scope}' contains whitespace"),
                });
            }
            if let Some(implied) = Self::implied_scope(scope) {
                scopes.insert(implied);
            }
            scopes.insert(scope.to_string());
        }

        Ok(Self { scopes })
    }
}

impl fmt::Display for AccessScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for scope in &self.scopes {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(scope)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for AccessScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccessScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_comma_separated_string() {
        let scopes: AccessScopes = "read_products,read_orders".parse().unwrap();
        assert!(scopes.contains("read_products"));
        assert!(scopes.contains("read_orders"));
        assert!(!scopes.contains("write_products"));
    }

    #[test]
    fn test_trims_whitespace_and_skips_empty_entries() {
        let scopes: AccessScopes = " read_products , ,read_orders, ".parse().unwrap();
        assert_eq!(scopes.iter().count(), 2);
    }

    #[test]
    fn test_write_scope_implies_read_scope() {
        let scopes: AccessScopes = "write_products".parse().unwrap();
        assert!(scopes.contains("write_products"));
        assert!(scopes.contains("read_products"));
    }

    #[test]
    fn test_unauthenticated_write_implies_unauthenticated_read() {
        let scopes: AccessScopes = "unauthenticated_write_checkouts".parse().unwrap();
        assert!(scopes.contains("unauthenticated_read_checkouts"));
    }

    #[test]
    fn test_rejects_scope_with_internal_whitespace() {
        let result: Result<AccessScopes, _> = "read products".parse();
        assert!(matches!(result, Err(ConfigError::InvalidScopes { .. })));
    }

    #[test]
    fn test_display_is_sorted_and_comma_joined() {
        let scopes: AccessScopes = "write_orders,read_products".parse().unwrap();
        assert_eq!(scopes.to_string(), "read_orders,read_products,write_orders");
    }

    #[test]
    fn test_covers() {
        let granted: AccessScopes = "write_products,read_orders".parse().unwrap();
        let required: AccessScopes = "read_products".parse().unwrap();
        assert!(granted.covers(&required));
        assert!(!required.covers(&granted));
    }

    #[test]
    fn test_serde_round_trip() {
        let scopes: AccessScopes = "write_products".parse().unwrap();
        let json = serde_json::to_string(&scopes).unwrap();
        let restored: AccessScopes = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, scopes);
    }

    #[test]
    fn test_empty_string_parses_to_empty_set() {
        let scopes: AccessScopes = "".parse().unwrap();
        assert!(scopes.is_empty());
    }
}
