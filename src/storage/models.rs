use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authorization role carried by an account and by its session tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub created_at: DateTime<Utc>,
    /// Unique, used as the secondary login identifier
    pub email: String,
    /// bcrypt digest; the clear secret is never stored
    pub password_digest: String,
    pub role: Role,
    /// Unique primary identifier, used as the token subject
    pub username: String,
}

/// A catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sweet {
    pub category: String,
    /// Server-assigned, monotonic, never reused
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

/// The caller-supplied fields of a sweet (everything but the id)
#[derive(Debug, Clone, PartialEq)]
pub struct SweetDraft {
    pub category: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl SweetDraft {
    pub fn into_sweet(self, id: u64) -> Sweet {
        Sweet {
            category: self.category,
            id,
            name: self.name,
            price: self.price,
            quantity: self.quantity,
        }
    }
}
