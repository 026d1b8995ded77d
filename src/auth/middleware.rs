use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::{debug, warn};

/// Resolves the bearer token into an [`AuthUser`] stored in request extensions.
///
/// Missing or non-Bearer header answers 401, a token that fails verification
/// (bad signature, expired, undecodable) answers 403.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| AppError::Internal("App config missing".into()))?;

    let token = match bearer_token(&req) {
        Ok(t) => t.to_owned(),
        Err(e) => {
            debug!(path = %req.path(), reason = %e, "Rejected unauthenticated request");
            return Ok(req.into_response(e.error_response()));
        }
    };

    let claims = match verify_token(&token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %req.path(), error = %e, "Rejected invalid token");
            return Ok(req.into_response(AppError::InvalidCredential.error_response()));
        }
    };

    req.extensions_mut().insert(AuthUser::from(claims));

    next.call(req).await
}

fn bearer_token(req: &ServiceRequest) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".into()))?;

    let value = header.to_str().map_err(|_| {
        AppError::Unauthenticated("Invalid Authorization header encoding".into())
    })?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(AppError::Unauthenticated(
            "Authorization header must use the format \"Bearer <token>\"".into(),
        )),
    }
}
