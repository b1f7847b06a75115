//! Newtype IDs for type-safe entity references.
//!
//! Identity-provider UIDs and document IDs are opaque strings minted by the
//! remote services, so the wrappers here are string-backed. Use the
//! `define_id!` macro to create wrappers that prevent accidentally passing
//! a product document ID where a UID is expected.

use uuid::Uuid;

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Accessors: `new()`, `as_str()`, `into_inner()`
/// - `generate()` for minting a fresh random ID (in-memory backends)
/// - `Display`, `FromStr`, `From<String>`, `From<&str>`, and `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use pharma_direct_core::define_id;
/// define_id!(Uid);
/// define_id!(ProductId);
///
/// let uid = Uid::new("abc123");
/// let product = ProductId::generate();
///
/// // These are different types, so this won't compile:
/// // let _: Uid = product;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an ID from an existing string value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mint a fresh random ID.
            ///
            /// Real backends assign their own identifiers; this is for
            /// in-memory backends and test fixtures.
            #[must_use]
            pub fn generate() -> Self {
                Self($crate::types::id::random_id())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Produce a random identifier in the compact form remote backends use.
#[must_use]
pub fn random_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// Standard entity IDs
define_id!(Uid);
define_id!(ProductId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_and_as_str() {
        let uid = Uid::new("user-1");
        assert_eq!(uid.as_str(), "user-1");
        assert_eq!(uid.to_string(), "user-1");
    }

    #[test]
    fn generate_is_unique() {
        let a = Uid::generate();
        let b = Uid::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn serde_is_transparent() {
        let uid = Uid::new("abc123");
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, "\"abc123\"");

        let parsed: Uid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, uid);
    }

    #[test]
    fn distinct_types_compare_by_value() {
        let uid = Uid::new("x");
        let product = ProductId::new("x");
        assert_eq!(uid.as_str(), product.as_str());
    }

    #[test]
    fn from_str_never_fails() {
        let uid: Uid = "anything".parse().unwrap();
        assert_eq!(uid.as_str(), "anything");
    }
}
