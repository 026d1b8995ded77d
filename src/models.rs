use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;
use crate::model::user::UserProfile;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "Rina")]
    pub nama: String,
    #[schema(example = "rina@kampus.ac.id")]
    pub email: String,
    #[schema(example = "rahasia123")]
    pub password: String,
}

/// Account created by an admin, who picks the role.
#[derive(Deserialize, ToSchema)]
pub struct CreateUserReq {
    #[schema(example = "Dewi")]
    pub nama: String,
    #[schema(example = "dewi@kampus.ac.id")]
    pub email: String,
    #[schema(example = "rahasia123")]
    pub password: String,
    pub role: Role,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "rina@kampus.ac.id")]
    pub email: String,
    #[schema(example = "rahasia123")]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub id: u64,
    pub nama: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}
