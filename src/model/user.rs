use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub nama: String,
    pub email: String,
    /// argon2 PHC string
    pub password: String,
    pub role: Role,
}

/// Raw `users` row; `role` comes back from the ENUM column as text.
#[derive(sqlx::FromRow)]
pub struct UserSql {
    pub id: u64,
    pub nama: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl TryFrom<UserSql> for User {
    type Error = strum::ParseError;

    fn try_from(row: UserSql) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            nama: row.nama,
            email: row.email,
            password: row.password,
            role: Role::from_str(&row.role)?,
        })
    }
}

pub struct NewUser {
    pub nama: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Public view of an account, never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Rina")]
    pub nama: String,
    #[schema(example = "rina@kampus.ac.id")]
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            nama: user.nama.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}
