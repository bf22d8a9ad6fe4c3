use crate::{
    api::profile::load_profile,
    auth::auth::AuthUser,
    config::Config,
    error::AppError,
    model::attendance::{AttendanceRecord, MonthlyStats, TodayState},
    service::{
        attendance::{get_today_state, record_check_in, record_check_out},
        history::{DisplayRow, EMPTY_HISTORY_MESSAGE, format_recent_history},
        stats::{compute_monthly_stats, first_of_month},
    },
    state::AppState,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

const MAX_HISTORY_DAYS: u32 = 31;

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    #[schema(example = "2026-05-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub state: TodayState,
    pub record: Option<AttendanceRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceActionResponse {
    #[schema(example = "Check-in berhasil")]
    pub message: String,
    pub record: AttendanceRecord,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Reference date (defaults to today)
    #[param(value_type = Option<String>, format = Date, example = "2026-05-10")]
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    #[schema(example = "2026-05-01", format = "date", value_type = String)]
    pub month_start: NaiveDate,
    #[schema(example = "2026-05-10", format = "date", value_type = String)]
    pub until: NaiveDate,
    #[serde(flatten)]
    pub stats: MonthlyStats,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Window in days, 1..=31 (defaults to 7)
    #[param(example = 7)]
    pub days: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    pub rows: Vec<DisplayRow>,
    /// Present only when `rows` is empty
    #[schema(example = "Belum ada riwayat kehadiran")]
    pub empty_message: Option<String>,
}

impl HistoryResponse {
    fn new(rows: Vec<DisplayRow>) -> Self {
        let empty_message = rows.is_empty().then(|| EMPTY_HISTORY_MESSAGE.to_string());
        Self {
            rows,
            empty_message,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    #[schema(example = "Ahmad Firdaus")]
    pub greeting_name: Option<String>,
    #[schema(example = "07:58:12")]
    pub server_time: String,
    pub today: TodayResponse,
    pub stats: StatsResponse,
    pub history: HistoryResponse,
}

async fn today_response(
    state: &AppState,
    user_id: u64,
    date: NaiveDate,
) -> Result<TodayResponse, AppError> {
    let (flags, record) = get_today_state(state.attendance.as_ref(), user_id, date)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "Failed to fetch today's attendance");
            e
        })?;

    Ok(TodayResponse {
        date,
        state: flags,
        record,
    })
}

async fn stats_response(
    state: &AppState,
    user_id: u64,
    reference: NaiveDate,
) -> Result<StatsResponse, AppError> {
    let stats = compute_monthly_stats(state.attendance.as_ref(), user_id, reference)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "Failed to compute monthly stats");
            e
        })?;

    Ok(StatsResponse {
        month_start: first_of_month(reference),
        until: reference,
        stats,
    })
}

async fn history_response(
    state: &AppState,
    user_id: u64,
    as_of: NaiveDate,
    days: u32,
) -> Result<HistoryResponse, AppError> {
    let rows = format_recent_history(state.attendance.as_ref(), user_id, as_of, days)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "Failed to fetch attendance history");
            e
        })?;

    Ok(HistoryResponse::new(rows))
}

/// Today's check-in / check-out state
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "State for the current day", body = TodayResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let date = state.clock.now().date();
    let body = today_response(&state, auth.user_id, date).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = AttendanceActionResponse),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "error": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    let now = state.clock.now();

    let record = record_check_in(
        state.attendance.as_ref(),
        auth.user_id,
        now,
        config.late_cutoff,
    )
    .await
    .inspect_err(|e| {
        if matches!(e, AppError::Store(_)) {
            error!(error = %e, user_id = auth.user_id, "Check-in failed");
        }
    })?;

    Ok(HttpResponse::Ok().json(AttendanceActionResponse {
        message: "Check-in berhasil".to_string(),
        record,
    }))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = AttendanceActionResponse),
        (status = 409, description = "Not checked in, or already checked out", body = Object, example = json!({
            "error": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let now = state.clock.now();

    let record = record_check_out(state.attendance.as_ref(), auth.user_id, now)
        .await
        .inspect_err(|e| {
            if matches!(e, AppError::Store(_)) {
                error!(error = %e, user_id = auth.user_id, "Check-out failed");
            }
        })?;

    Ok(HttpResponse::Ok().json(AttendanceActionResponse {
        message: "Check-out berhasil".to_string(),
        record,
    }))
}

/// Monthly totals
#[utoipa::path(
    get,
    path = "/api/attendance/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Counts for the month of the reference date", body = StatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn stats(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<StatsQuery>,
) -> Result<impl Responder, AppError> {
    let reference = query.date.unwrap_or_else(|| state.clock.now().date());
    debug!(user_id = auth.user_id, %reference, "Computing monthly stats");

    let body = stats_response(&state, auth.user_id, reference).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Recent attendance history
#[utoipa::path(
    get,
    path = "/api/attendance/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Most recent first", body = HistoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    query: web::Query<HistoryQuery>,
) -> Result<impl Responder, AppError> {
    let days = query
        .days
        .unwrap_or(config.history_window_days)
        .clamp(1, MAX_HISTORY_DAYS);
    let as_of = state.clock.now().date();

    let body = history_response(&state, auth.user_id, as_of, days).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Landing page data in one round trip
#[utoipa::path(
    get,
    path = "/api/attendance/dashboard",
    responses(
        (status = 200, description = "Today, month totals and recent history", body = DashboardResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn dashboard(
    auth: AuthUser,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    let now = state.clock.now();
    let date = now.date();
    let user_id = auth.user_id;

    let profile = load_profile(&state, user_id).await?;
    let today = today_response(&state, user_id, date).await?;
    let stats = stats_response(&state, user_id, date).await?;
    let history = history_response(&state, user_id, date, config.history_window_days).await?;

    Ok(HttpResponse::Ok().json(DashboardResponse {
        greeting_name: profile.map(|p| p.name),
        server_time: now.format("%H:%M:%S").to_string(),
        today,
        stats,
        history,
    }))
}
