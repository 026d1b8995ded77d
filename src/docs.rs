use crate::api::attendance::{StampResponse, TodayResponse, UpdatedResponse};
use crate::api::report::ReportResponse;
use crate::model::attendance::{AttendanceView, DayState, UpdateAttendance};
use crate::model::role::Role;
use crate::model::user::UserProfile;
use crate::models::{CreateUserReq, LoginReqDto, LoginResponse, RegisterReq};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presensi API",
        version = "0.1.0",
        description = r#"
## Attendance (presensi) service

Students and staff record one check-in and one check-out per calendar day.
Administrators list, correct and delete attendance records.

### Security
All `/api` endpoints need `Authorization: Bearer <token>` from `/auth/login`.
A missing or malformed header answers **401**, an invalid or expired token **403**.

### Days
The calendar day of a check-in is taken in the service timezone
(`TIMEZONE_OFFSET_HOURS`, WIB by default) at the moment of the request.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::create_user,
        crate::auth::handlers::delete_user,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today,
        crate::api::attendance::get_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::report::daily_report
    ),
    components(
        schemas(
            Role,
            RegisterReq,
            CreateUserReq,
            LoginReqDto,
            LoginResponse,
            UserProfile,
            AttendanceView,
            DayState,
            UpdateAttendance,
            StampResponse,
            TodayResponse,
            UpdatedResponse,
            ReportResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and admin account management"),
        (name = "Attendance", description = "Daily check-in and check-out"),
        (name = "Report", description = "Admin attendance reports"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
