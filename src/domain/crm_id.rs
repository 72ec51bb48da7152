//! Type-safe CRM record identifiers.
//!
//! The CRM assigns positive integer ids to every record it owns. Each
//! record kind gets its own newtype so that a deal id cannot be passed
//! where a contact id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! crm_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        #[schema(value_type = u64)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw CRM id.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw CRM id.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

crm_id!(
    /// Identifier of a CRM contact. Looked up by phone, never deleted.
    ContactId
);

crm_id!(
    /// Identifier of a CRM deal. Created exactly once per lead.
    DealId
);

crm_id!(
    /// Identifier of a CRM activity (follow-up task or reminder).
    ActivityId
);
