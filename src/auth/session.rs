//! Session data persisted between runs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role attached to an account by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Parent,
    Eleve,
    Enseignant,
    Direction,
    /// Any role string this client does not know about, kept verbatim
    Other(String),
}

impl Role {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            Role::Parent => "parent",
            Role::Eleve => "eleve",
            Role::Enseignant => "enseignant",
            Role::Direction => "direction",
            Role::Other(s) => s,
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value {
            "parent" => Role::Parent,
            "eleve" => Role::Eleve,
            "enseignant" => Role::Enseignant,
            "direction" => Role::Direction,
            other => Role::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated session: bearer token plus role.
///
/// There is no expiry or refresh; a session lives until logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// The bearer token
    pub token: String,

    /// The account role
    pub role: Role,
}

impl AuthSession {
    /// Create a new session
    pub fn new(token: impl Into<String>, role: impl Into<Role>) -> Self {
        Self {
            token: token.into(),
            role: role.into(),
        }
    }
}
