//! Newtype IDs for type-safe document references.
//!
//! CMS documents are keyed by opaque string identifiers (`_id`). Use the
//! `define_id!` macro to create wrappers that prevent accidentally mixing
//! IDs from different document types.

use thiserror::Error;

/// Errors that can occur when parsing an ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input string is empty or whitespace.
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `parse()`, `as_str()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use tienda_core::define_id;
/// define_id!(ProductId);
/// define_id!(OrderId);
///
/// let product_id = ProductId::new("p-1");
/// let order_id = OrderId::new("p-1");
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = order_id;
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
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID without validation.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Parse an ID, rejecting empty or whitespace-only input.
            ///
            /// # Errors
            ///
            /// Returns `IdError::Empty` if the trimmed input is empty.
            pub fn parse(id: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                let id = id.trim();
                if id.is_empty() {
                    return Err($crate::types::id::IdError::Empty(stringify!($name)));
                }
                Ok(Self(id.to_string()))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard document IDs
define_id!(ProductId);
define_id!(CategoryId);
define_id!(OrderId);
// Identity-provider user id (orders are filed under it)
define_id!(UserId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = UserId::parse("  user_2abc ").unwrap();
        assert_eq!(id.as_str(), "user_2abc");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(UserId::parse(""), Err(IdError::Empty("UserId")));
        assert_eq!(UserId::parse("   "), Err(IdError::Empty("UserId")));
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProductId::new("a1b2");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"a1b2\"");
        let back: ProductId = serde_json::from_str("\"a1b2\"").unwrap();
        assert_eq!(back, id);
    }
}
