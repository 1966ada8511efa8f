//! Typed IDs for type-safe entity references.
//!
//! Every table in the ledger uses a 64-bit serial key. Wrapping those keys
//! keeps an `AccountId` from being passed where a `PersonId` is expected.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers over `i64` keys.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wraps a raw key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for an authenticated user.");
typed_id!(BuildingId, "Unique identifier for a building (the ledger scope).");
typed_id!(UnitId, "Unique identifier for a rentable unit inside a building.");
typed_id!(PersonId, "Unique identifier for a tenant, customer, or vendor.");
typed_id!(AccountId, "Unique identifier for a chart of accounts entry.");
typed_id!(AccountTypeId, "Unique identifier for an account type.");
typed_id!(ItemId, "Unique identifier for a catalog item.");
typed_id!(TransactionId, "Unique identifier for a ledger transaction.");
typed_id!(SplitId, "Unique identifier for a split (one side of a posting).");
typed_id!(DocumentId, "Unique identifier for a business document header.");
typed_id!(
    AppliedCreditId,
    "Unique identifier for a credit memo application against an invoice."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_id_display_and_parse() {
        let id = AccountId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(" 42 ".parse::<AccountId>().unwrap(), id);
        assert!("abc".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_typed_id_serde_is_transparent() {
        let json = serde_json::to_string(&DocumentId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: DocumentId = serde_json::from_str("7").unwrap();
        assert_eq!(back.get(), 7);
    }
}
