//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Key of a purchase requisition (the header row).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseRequisitionId(i32);

/// Key of a line item, unique within its purchase requisition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseRequisitionItemId(i32);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $t {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i32 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i32>()
                    .map(Self)
                    .map_err(|e| DomainError::validation(format!("{}: {e}", $name)))
            }
        }
    };
}

impl_int_newtype!(PurchaseRequisitionId, "PurchaseRequisition");
impl_int_newtype!(PurchaseRequisitionItemId, "PurchaseRequisitionItem");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_integer_keys() {
        let id: PurchaseRequisitionId = " 100 ".parse().unwrap();
        assert_eq!(id.get(), 100);
        assert_eq!(id.to_string(), "100");
    }

    #[test]
    fn rejects_non_numeric_keys() {
        let err = "ten".parse::<PurchaseRequisitionItemId>().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.starts_with("PurchaseRequisitionItem")));
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_value(PurchaseRequisitionItemId::new(10)).unwrap();
        assert_eq!(json, serde_json::json!(10));
    }
}
