use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::store::StoreError;

/// Every failure a handler can surface to a client.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    Unauthenticated(String),

    #[display(fmt = "Invalid or expired token")]
    InvalidCredential,

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "Attendance record not found")]
    NotFound,

    #[display(fmt = "You have already checked in today")]
    AlreadyCheckedIn,

    #[display(fmt = "No active check-in found for today")]
    NoActiveCheckIn,

    #[display(fmt = "{}", _0)]
    InvalidRequest(String),

    #[display(fmt = "Invalid email or password")]
    InvalidLogin,

    #[display(fmt = "Email already registered")]
    EmailTaken,

    #[display(fmt = "User not found")]
    UserNotFound,

    #[display(fmt = "Storage failure: {}", _0)]
    Storage(String),

    #[display(fmt = "Internal error: {}", _0)]
    Internal(String),
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidRequest(msg.into())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) | AppError::InvalidLogin => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredential | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyCheckedIn
            | AppError::NoActiveCheckIn
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::EmailTaken => StatusCode::CONFLICT,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // detail stays in the logs
            AppError::Storage(detail) | AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn storage_detail_is_not_leaked() {
        let err = AppError::Storage("connection refused to 10.0.0.3".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "Internal Server Error");
    }

    #[test]
    fn business_conflicts_are_client_errors() {
        assert_eq!(AppError::AlreadyCheckedIn.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoActiveCheckIn.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredential.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Unauthenticated("Missing Authorization header".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
