use serde::{Deserialize, Serialize};

use super::asset::FieldErrors;
use crate::types::Role;

/// Stored account; the username is the document ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub branch: String,
    pub hashed_password: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// What clients see of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub branch: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            roles: user.roles,
            branch: user.branch,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub roles: Vec<String>,
    pub branch: String,
    pub password: String,
}

/// Admin edit of profile fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEdit {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub roles: Vec<String>,
    pub branch: String,
}

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_password(password: &str, field: &str, errors: &mut FieldErrors) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            field.to_string(),
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
}

/// Roles must all be known; stored upper-cased
pub fn normalize_roles(roles: &[String], errors: &mut FieldErrors) -> Vec<String> {
    let mut normalized = Vec::with_capacity(roles.len());
    for role in roles {
        match Role::parse(role) {
            Some(r) if !normalized.contains(&r.as_str().to_string()) => {
                normalized.push(r.as_str().to_string())
            }
            Some(_) => {}
            None => {
                errors.insert("roles".to_string(), format!("Unknown role: {}", role));
            }
        }
    }
    normalized
}

impl RegisterInput {
    pub fn validate(&self, errors: &mut FieldErrors) {
        let id = self.id.trim();
        if id.len() < 3 || id.len() > 50 {
            errors.insert("id".to_string(), "Username must be 3 to 50 characters".to_string());
        } else if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-') {
            errors.insert(
                "id".to_string(),
                "Username can only contain letters, numbers, '.', '_' and '-'".to_string(),
            );
        }
        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "This field is required".to_string());
        }
        if self.branch.trim().is_empty() {
            errors.insert("branch".to_string(), "This field is required".to_string());
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            errors.insert("email".to_string(), "Invalid email format".to_string());
        }
        validate_password(&self.password, "password", errors);
    }
}
