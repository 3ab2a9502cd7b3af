// ── User domain type ──

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::validate;
use crate::error::CoreError;
use crate::resource::{Draft, Resource, ResourceKind, text_cell};

/// Backend role of a managed account.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum UserRole {
    User,
    ParkingAdmin,
    Admin,
}

/// A managed account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Kept raw so unknown roles survive decoding.
    #[serde(default)]
    pub role: Option<String>,
}

impl Resource for User {
    type Draft = CreateUser;
    type Update = UpdateUser;

    const KIND: ResourceKind = ResourceKind::Users;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_key(&self) -> Option<&str> {
        self.full_name.as_deref().filter(|s| !s.is_empty())
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        [&self.full_name, &self.email, &self.phone_number]
            .into_iter()
            .flatten()
            .map(|s| Cow::Borrowed(s.as_str()))
            .collect()
    }

    fn category(&self) -> Option<&str> {
        self.role.as_deref()
    }

    fn cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.to_string(),
            "full_name" => text_cell(self.full_name.as_deref()),
            "email" => text_cell(self.email.as_deref()),
            "phone_number" => text_cell(self.phone_number.as_deref()),
            "role" => text_cell(self.role.as_deref()),
            _ => String::new(),
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────

/// `POST /users`. `contact` is an email address or a phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub full_name: String,
    pub contact: String,
    pub password: String,
    pub role: UserRole,
}

impl Draft for CreateUser {
    fn validate(&self) -> Result<(), CoreError> {
        validate::required("full_name", &self.full_name)?;
        validate::required("contact", &self.contact)?;
        validate::required("password", &self.password)?;
        Ok(())
    }
}

/// `PUT /users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone_number: String,
}

impl Draft for UpdateUser {
    fn validate(&self) -> Result<(), CoreError> {
        validate::required("full_name", &self.full_name)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            validate::email("email", email)?;
        }
        validate::required("phone_number", &self.phone_number)?;
        Ok(())
    }
}
