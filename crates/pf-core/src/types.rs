//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The default dwell duration was negative, NaN or infinite.
    #[error("default dwell must be a finite, non-negative number of seconds, got {value}")]
    InvalidDwell { value: f64 },
}

/// Generates a validated string ID newtype with common trait implementations.
///
/// IDs order lexicographically by their string value.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated session identifier.
    ///
    /// Session IDs are opaque, non-empty strings. All page views sharing one
    /// session ID belong to the same user visit.
    SessionId, "session_id"
);

define_string_id!(
    /// A validated screen identifier.
    ///
    /// Screen IDs are opaque, non-empty strings naming a logical page or view.
    /// No further semantics are checked.
    ScreenId, "screen_id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_rejects_empty() {
        assert!(SessionId::new("").is_err());
        assert!(SessionId::new("userA").is_ok());
    }

    #[test]
    fn screen_id_rejects_empty() {
        let err = ScreenId::new("").unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "screen_id" });
        assert_eq!(err.to_string(), "screen_id cannot be empty");
    }

    #[test]
    fn screen_id_keeps_whitespace_and_unicode() {
        let id = ScreenId::new(" 产品详情 ").unwrap();
        assert_eq!(id.as_str(), " 产品详情 ");
    }

    #[test]
    fn session_id_serde_roundtrip() {
        let id = SessionId::new("session-abc").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"session-abc\"");
        let parsed: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn screen_id_serde_rejects_empty() {
        let result: Result<ScreenId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn ids_order_lexicographically() {
        let mut ids = vec![
            SessionId::new("s10").unwrap(),
            SessionId::new("s2").unwrap(),
            SessionId::new("S1").unwrap(),
        ];
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(SessionId::as_str).collect();
        assert_eq!(ordered, ["S1", "s10", "s2"]);
    }

    #[test]
    fn screen_id_as_ref() {
        let id = ScreenId::new("home").unwrap();
        let s: &str = id.as_ref();
        assert_eq!(s, "home");
    }
}
