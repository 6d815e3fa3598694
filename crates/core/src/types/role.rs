//! Account roles reported by the catalog service.

use serde::{Deserialize, Serialize};

/// Role attached to a catalog user profile.
///
/// Unknown roles deserialize to [`UserRole::Other`] instead of failing the
/// whole profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
    #[serde(other)]
    Other,
}

impl UserRole {
    /// Label shown on the account dashboard.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
