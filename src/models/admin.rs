use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An administrative account. Only the Admin Identity Service creates these
/// and mutates their credentials and last-login timestamp.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Master,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Master => "master",
        }
    }

    /// Strict parse; an unknown role in a token is a verification failure,
    /// not a fail-open case.
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "master" => Some(Role::Master),
            _ => None,
        }
    }
}
