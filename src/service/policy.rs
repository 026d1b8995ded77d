//! Authorization rules shared by the HTTP edge and the attendance service.

use crate::{
    auth::auth::AuthUser, error::AppError, model::attendance::AttendanceRecord,
    model::role::Role,
};

pub fn is_admin(principal: &AuthUser) -> bool {
    principal.role == Role::Admin
}

pub fn require_admin(principal: &AuthUser) -> Result<(), AppError> {
    if is_admin(principal) {
        Ok(())
    } else {
        Err(AppError::forbidden("Access denied: admin only"))
    }
}

/// Owner or admin.
pub fn can_modify(principal: &AuthUser, record: &AttendanceRecord) -> bool {
    record.user_id == principal.user_id || is_admin(principal)
}

pub fn authorize_record(principal: &AuthUser, record: &AttendanceRecord) -> Result<(), AppError> {
    if can_modify(principal, record) {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Access denied: you are not allowed to change this attendance record",
        ))
    }
}
