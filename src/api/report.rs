use crate::{
    auth::auth::AuthUser, error::AppError, model::attendance::AttendanceView,
    service::AttendanceService,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Case-insensitive substring of the user's name
    #[param(example = "rina")]
    pub nama: Option<String>,
    /// First day included (YYYY-MM-DD)
    #[param(value_type = Option<String>, format = "date", example = "2026-01-01")]
    pub start_date: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD)
    #[param(value_type = Option<String>, format = "date", example = "2026-01-31")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[schema(value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    pub reports: Vec<AttendanceView>,
}

/// Attendance report for admins, filtered by date range and name
#[utoipa::path(
    get,
    path = "/api/reports/daily",
    params(ReportQuery),
    responses(
        (status = 200, description = "Matching attendance records", body = ReportResponse),
        (status = 400, description = "startDate after endDate"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
#[instrument(name = "daily_report", skip_all, fields(user_id = auth.user_id))]
pub async fn daily_report(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<ReportQuery>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    debug!(?query, "Report requested");

    let (filter, entries) = service
        .report(&auth, query.nama, query.start_date, query.end_date)
        .await?;

    let zone = service.zone();
    Ok(HttpResponse::Ok().json(ReportResponse {
        start_date: filter.start_date,
        end_date: filter.end_date,
        reports: entries
            .iter()
            .map(|e| AttendanceView::from_report(e, zone))
            .collect(),
    }))
}
