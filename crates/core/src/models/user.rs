//! Users and registration.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{City, Role, UserId};

/// A user as exposed over the API (no credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub id_number: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub city: City,
    pub street: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration payload, assembled from both registration steps.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id_number: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub city: Option<City>,
    pub street: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id_number", &self.id_number)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("city", &self.city)
            .field("street", &self.street)
            .finish()
    }
}
