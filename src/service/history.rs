use crate::{error::StoreError, model::attendance::AttendanceRecord, store::AttendanceStore};
use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const EMPTY_HISTORY_MESSAGE: &str = "Belum ada riwayat kehadiran";

/// Shown for missing times and for statuses outside the known set.
const PLACEHOLDER: &str = "-";

const DAY_NAMES: [&str; 7] = ["Sen", "Sel", "Rab", "Kam", "Jum", "Sab", "Min"];
const MONTH_NAMES: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

/// One line of the recent-history table.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DisplayRow {
    #[schema(example = "2026-05-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Sen, 4 Mei 2026")]
    pub date_label: String,
    #[schema(example = "07:45")]
    pub check_in: String,
    #[schema(example = "-")]
    pub check_out: String,
    #[schema(example = "hadir")]
    pub status: String,
    #[schema(example = "Hadir")]
    pub status_label: String,
}

pub fn status_label(raw: &str) -> &'static str {
    raw.parse::<crate::model::attendance::AttendanceStatus>()
        .map(|s| s.label())
        .unwrap_or(PLACEHOLDER)
}

pub fn format_time(time: Option<NaiveTime>) -> String {
    match time {
        Some(t) => t.format("%H:%M").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Indonesian short form, e.g. `Sen, 4 Mei 2026`.
pub fn date_label(date: NaiveDate) -> String {
    let day = DAY_NAMES[date.weekday().num_days_from_monday() as usize];
    let month = MONTH_NAMES[date.month0() as usize];
    format!("{}, {} {} {}", day, date.day(), month, date.year())
}

/// Most recent first, whatever order the rows arrive in.
pub fn format_rows(mut records: Vec<AttendanceRecord>) -> Vec<DisplayRow> {
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
        .into_iter()
        .map(|r| DisplayRow {
            date: r.date,
            date_label: date_label(r.date),
            check_in: format_time(r.check_in),
            check_out: format_time(r.check_out),
            status_label: status_label(&r.status).to_string(),
            status: r.status,
        })
        .collect()
}

/// Rows with `as_of - window_days <= date <= as_of`.
pub async fn format_recent_history(
    store: &dyn AttendanceStore,
    user_id: u64,
    as_of: NaiveDate,
    window_days: u32,
) -> Result<Vec<DisplayRow>, StoreError> {
    let from = as_of
        .checked_sub_days(Days::new(window_days as u64))
        .unwrap_or(NaiveDate::MIN);
    let records = store.list_between(user_id, from, as_of).await?;
    Ok(format_rows(records))
}
