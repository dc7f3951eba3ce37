use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Coarse permission tier carried in every access token.
///
/// Serialized exactly as `"ADMIN"` or `"USER"`; any other spelling is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0} (expected ADMIN or USER)")]
    Unknown(String),
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}
