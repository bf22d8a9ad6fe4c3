use crate::api::attendance::{
    AttendanceActionResponse, DashboardResponse, HistoryResponse, StatsResponse, TodayResponse,
};
use crate::api::profile::ProfileUpdated;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, MonthlyStats, TodayState};
use crate::model::profile::{ProfileUpdate, UserProfile};
use crate::models::{LoginReqDto, LoginResponse, TokenPair};
use crate::service::history::DisplayRow;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presensi API",
        version = "0.1.0",
        description = r#"
## Employee attendance (presensi)

Backend for the attendance app: employees sign in, check in and out once per day,
see this month's totals and the last week of history, and edit their own profile.

### Rules
- One attendance row per employee per day
- A check-in strictly after the cutoff (08:00 by default, server time) is **terlambat**
- Check-out needs a check-in first and can only happen once

### Security
All `/api` endpoints need `Authorization: Bearer <access_token>` from `/auth/login`.
A 401 response carries `"redirect": "/login"`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::session,

        crate::api::attendance::today,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::stats,
        crate::api::attendance::history,
        crate::api::attendance::dashboard,

        crate::api::profile::get_profile,
        crate::api::profile::update_profile
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            TokenPair,
            AttendanceRecord,
            AttendanceStatus,
            TodayState,
            MonthlyStats,
            DisplayRow,
            TodayResponse,
            AttendanceActionResponse,
            StatsResponse,
            HistoryResponse,
            DashboardResponse,
            UserProfile,
            ProfileUpdate,
            ProfileUpdated
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Session", description = "Sign in, token refresh and sign out"),
        (name = "Attendance", description = "Daily check-in / check-out, totals and history"),
        (name = "Profile", description = "Own profile"),
    )
)]
pub struct ApiDoc;

/// Prefix written into the protected `#[utoipa::path]` attributes.
const DOC_PREFIX: &str = "/api";

impl ApiDoc {
    /// Document with the protected paths moved under the configured `API_PREFIX`.
    pub fn with_prefix(prefix: &str) -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        let prefix = prefix.trim_end_matches('/');
        if prefix == DOC_PREFIX {
            return doc;
        }

        doc.paths.paths = std::mem::take(&mut doc.paths.paths)
            .into_iter()
            .map(|(path, item)| {
                let moved = path
                    .strip_prefix(DOC_PREFIX)
                    .filter(|rest| rest.starts_with('/'))
                    .map(|rest| format!("{}{}", prefix, rest));
                (moved.unwrap_or(path), item)
            })
            .collect();
        doc
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}
