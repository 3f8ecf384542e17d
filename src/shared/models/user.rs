use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{register_request::RegisterRequest, user_edit_request::UserEditRequest, user_get_response::UserGetResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored lowercased; the login key.
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Expects a request that already passed `RegisterRequest::validate`.
    pub fn new(request: RegisterRequest) -> Result<Self, argon2::password_hash::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: normalize_email(&request.email),
            password_hash: hash_password(&request.password)?,
            created_at: Utc::now(),
        })
    }

    pub fn edit(self, request: UserEditRequest) -> Self {
        Self {
            name: request.name.map(|n| n.trim().to_string()).unwrap_or(self.name),
            email: request.email.map(|e| normalize_email(&e)).unwrap_or(self.email),
            ..self
        }
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(&self.password_hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    pub fn to_get_dto(&self) -> UserGetResponse {
        UserGetResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}
