use crate::{
    auth::{
        auth::AuthUser,
        jwt::generate_token,
        password::{hash_password, verify_password},
    },
    config::{AdminSeed, Config},
    error::AppError,
    model::{
        role::Role,
        user::{NewUser, User, UserProfile},
    },
    models::{CreateUserReq, LoginReqDto, LoginResponse, RegisterReq},
    store::{StoreError, UserStore},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, instrument};

/// Validates and hashes the fields of a new account.
fn new_account(nama: &str, email: &str, password: &str, role: Role) -> Result<NewUser, AppError> {
    let nama = nama.trim();
    let email = email.trim().to_lowercase();

    if nama.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::invalid("nama, email and password must not be empty"));
    }
    if !email.contains('@') {
        return Err(AppError::invalid("email is not valid"));
    }

    let password_hash = hash_password(password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        AppError::Internal(e.to_string())
    })?;

    Ok(NewUser {
        nama: nama.to_string(),
        email,
        password_hash,
        role,
    })
}

async fn create_account(users: &dyn UserStore, new: NewUser) -> Result<User, AppError> {
    users.create_user(new).await.map_err(|e| match e {
        StoreError::Duplicate => AppError::EmailTaken,
        other => other.into(),
    })
}

/// Creates the configured admin account unless that email is already registered.
///
/// Returns whether an account was created.
pub async fn seed_admin(users: &dyn UserStore, seed: &AdminSeed) -> Result<bool, AppError> {
    let email = seed.email.trim().to_lowercase();
    if users.find_by_email(&email).await?.is_some() {
        debug!(%email, "Admin account already present");
        return Ok(false);
    }

    let new = new_account(&seed.nama, &email, &seed.password, Role::Admin)?;
    let user = create_account(users, new).await?;
    info!(user_id = user.id, "Admin account seeded");
    Ok(true)
}

/// Self-service registration. Accounts created here are always `mahasiswa`.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User registered", body = UserProfile),
        (status = 400, description = "Missing or invalid fields", body = Object, example = json!({
            "message": "nama, email and password must not be empty"
        })),
        (status = 409, description = "Email already registered", body = Object, example = json!({
            "message": "Email already registered"
        }))
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(users, body), fields(email = %body.email))]
pub async fn register(
    body: web::Json<RegisterReq>,
    users: web::Data<dyn UserStore>,
) -> Result<impl Responder, AppError> {
    let new = new_account(&body.nama, &body.email, &body.password, Role::Mahasiswa)?;
    let user = create_account(users.get_ref(), new).await?;

    info!(user_id = user.id, role = %user.role, "User registered");

    Ok(HttpResponse::Created().json(UserProfile::from(&user)))
}

/// Admin-only account creation with an explicit role
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "User created", body = UserProfile),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
#[instrument(name = "create_user", skip_all, fields(admin_id = auth.user_id))]
pub async fn create_user(
    auth: AuthUser,
    users: web::Data<dyn UserStore>,
    body: Result<web::Json<CreateUserReq>, actix_web::Error>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;
    let body = body.map_err(|e| AppError::invalid(e.to_string()))?;

    let new = new_account(&body.nama, &body.email, &body.password, body.role)?;
    let user = create_account(users.get_ref(), new).await?;

    info!(user_id = user.id, role = %user.role, "User created by admin");

    Ok(HttpResponse::Created().json(UserProfile::from(&user)))
}

/// Exchanges email + password for a bearer token valid for `TOKEN_TTL` seconds.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "message": "Invalid email or password"
        }))
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(users, config, body), fields(email = %body.email))]
pub async fn login(
    body: web::Json<LoginReqDto>,
    users: web::Data<dyn UserStore>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    info!("Login request received");

    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.password.is_empty() {
        return Err(AppError::invalid("Email and password are required"));
    }

    let user = match users.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            info!("Invalid credentials: user not found");
            return Err(AppError::InvalidLogin);
        }
    };

    if let Err(e) = verify_password(&body.password, &user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::InvalidLogin);
    }

    debug!(user_id = user.id, "Password verified, issuing token");

    let principal = AuthUser {
        user_id: user.id,
        nama: user.nama.clone(),
        role: user.role,
    };
    let token = generate_token(&principal, &config.jwt_secret, config.token_ttl, Utc::now())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(user_id = user.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserProfile::from(&user),
    }))
}

/// Removes an account and every attendance record it owns.
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = u64, Path, description = "ID of the user to remove")
    ),
    responses(
        (status = 200, description = "User deleted", body = Object, example = json!({
            "message": "User deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn delete_user(
    auth: AuthUser,
    users: web::Data<dyn UserStore>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    let user_id = path.into_inner();
    if !users.delete_user(user_id).await? {
        return Err(AppError::UserNotFound);
    }

    info!(admin_id = auth.user_id, user_id, "User deleted with attendance history");

    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted" })))
}
