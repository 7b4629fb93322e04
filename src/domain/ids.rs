//! Opaque string identities.
//!
//! User identities come from the external identity provider and are taken
//! as-is. Board, entry and payout identities are generated here as a type
//! prefix followed by 12 hex characters of a v4 UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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
    };
}

macro_rules! generated_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            pub fn generate() -> Self {
                let hex = Uuid::new_v4().simple().to_string();
                Self(format!(concat!($prefix, "_{}"), &hex[..12]))
            }
        }
    };
}

define_id! {
    /// Verified identity of a user, resolved outside the engine.
    UserId
}

define_id! {
    /// Identity of a board.
    BoardId
}

define_id! {
    /// Identity of a paid claim on one square.
    EntryId
}

define_id! {
    /// Identity of a quarter payout record.
    PayoutId
}

generated_id!(BoardId, "board");
generated_id!(EntryId, "entry");
generated_id!(PayoutId, "payout");

impl UserId {
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}
