use std::fmt;

use models::errors::ModelError;
use models::user::{validate_email, validate_name, validate_password};
use serde::{Deserialize, Serialize};

/// Create request. Carries the only plaintext password the system sees.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInsertInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

impl fmt::Debug for UserInsertInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInsertInput")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role_ids", &self.role_ids)
            .finish()
    }
}

impl UserInsertInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_name("firstName", &self.first_name)?;
        validate_name("lastName", &self.last_name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

/// Update request: profile fields and the full role set, never the password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

impl UserUpdateInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_name("firstName", &self.first_name)?;
        validate_name("lastName", &self.last_name)?;
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDto {
    pub id: i64,
    pub authority: String,
}

impl From<models::role::Model> for RoleDto {
    fn from(m: models::role::Model) -> Self { Self { id: m.id, authority: m.authority } }
}

/// Outward projection of a user; never carries the password or its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<RoleDto>,
}

impl UserDetail {
    pub fn role_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.roles.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids
    }
}

/// Persisted user as returned by a repository, roles resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<RoleDto>,
}

impl From<UserRecord> for UserDetail {
    fn from(r: UserRecord) -> Self {
        Self { id: r.id, first_name: r.first_name, last_name: r.last_name, email: r.email, roles: r.roles }
    }
}

/// Row to insert; `password_hash` is already encoder output.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_ids: Vec<i64>,
}

/// Replacement values for an existing row. `role_ids` is the complete new set.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_ids: Vec<i64>,
}

impl From<UserUpdateInput> for UserChanges {
    fn from(i: UserUpdateInput) -> Self {
        Self { first_name: i.first_name, last_name: i.last_name, email: i.email, role_ids: i.role_ids }
    }
}

/// Sortable user properties, accepted in camelCase or snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortKey {
    Id,
    FirstName,
    LastName,
    Email,
}

impl UserSortKey {
    pub fn from_property(p: &str) -> Option<Self> {
        match p {
            "id" => Some(Self::Id),
            "firstName" | "first_name" => Some(Self::FirstName),
            "lastName" | "last_name" => Some(Self::LastName),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}
