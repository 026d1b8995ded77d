use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::attendance::{AttendanceView, DayState, UpdateAttendance},
    service::AttendanceService,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct StampResponse {
    #[schema(example = "Hello Rina, your check-in was recorded at 08:00:00 (UTC+07:00)")]
    pub message: String,
    pub data: AttendanceView,
}

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: DayState,
    pub data: Option<AttendanceView>,
}

#[derive(Serialize, ToSchema)]
pub struct UpdatedResponse {
    #[schema(example = "Attendance record updated")]
    pub message: String,
    pub data: AttendanceView,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    responses(
        (status = 201, description = "Checked in successfully", body = StampResponse),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "You have already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid or expired token"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "check_in", skip_all, fields(user_id = auth.user_id))]
pub async fn check_in(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> Result<impl Responder, AppError> {
    let stamped = service.check_in(&auth).await?;

    Ok(HttpResponse::Created().json(StampResponse {
        message: stamped.message,
        data: AttendanceView::localized(&stamped.record, service.zone()).with_nama(&auth.nama),
    }))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = StampResponse),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid or expired token"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "check_out", skip_all, fields(user_id = auth.user_id))]
pub async fn check_out(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> Result<impl Responder, AppError> {
    let stamped = service.check_out(&auth).await?;

    Ok(HttpResponse::Ok().json(StampResponse {
        message: stamped.message,
        data: AttendanceView::localized(&stamped.record, service.zone()).with_nama(&auth.nama),
    }))
}

/// Caller's own status for today
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's attendance state", body = TodayResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> Result<impl Responder, AppError> {
    let (date, status, record) = service.today_state(&auth).await?;

    Ok(HttpResponse::Ok().json(TodayResponse {
        date,
        status,
        data: record.map(|r| AttendanceView::localized(&r, service.zone())),
    }))
}

/// Get one attendance record (owner or admin)
#[utoipa::path(
    get,
    path = "/api/attendance/{record_id}",
    params(
        ("record_id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Record found", body = AttendanceView),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let record = service.find(&auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(AttendanceView::localized(&record, service.zone())))
}

/// Correct the timestamps of a record (admin)
#[utoipa::path(
    put,
    path = "/api/attendance/{record_id}",
    params(
        ("record_id" = u64, Path, description = "Attendance record ID")
    ),
    request_body = UpdateAttendance,
    responses(
        (status = 200, description = "Record updated", body = UpdatedResponse),
        (status = 400, description = "Body names no field or times are inconsistent", body = Object, example = json!({
            "message": "Request body must contain checkInTime or checkOutTime"
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "update_attendance", skip_all, fields(user_id = auth.user_id, record_id = *path))]
pub async fn update_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
    body: Result<web::Json<UpdateAttendance>, actix_web::Error>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;
    let body = body.map_err(|e| AppError::invalid(e.to_string()))?;

    let record = service
        .update(&auth, path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(UpdatedResponse {
        message: "Attendance record updated".to_string(),
        data: AttendanceView::localized(&record, service.zone()),
    }))
}

/// Delete a record permanently (admin)
#[utoipa::path(
    delete,
    path = "/api/attendance/{record_id}",
    params(
        ("record_id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Attendance record deleted"
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "delete_attendance", skip_all, fields(user_id = auth.user_id, record_id = *path))]
pub async fn delete_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    auth.require_admin()?;

    service.delete(&auth, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance record deleted"
    })))
}
