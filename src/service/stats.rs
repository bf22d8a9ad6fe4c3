use crate::{
    error::StoreError,
    model::attendance::{AttendanceRecord, AttendanceStatus, MonthlyStats},
    store::AttendanceStore,
};
use chrono::{Datelike, NaiveDate};

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Counts over an already-fetched month of rows.
pub fn aggregate(records: &[AttendanceRecord]) -> MonthlyStats {
    records.iter().fold(MonthlyStats::default(), |mut stats, r| {
        stats.total += 1;
        match r.status() {
            Some(AttendanceStatus::Late) => stats.late += 1,
            Some(AttendanceStatus::Absent) => stats.absent += 1,
            _ => {}
        }
        stats
    })
}

/// Totals for `[first of month, reference]`, both ends inclusive.
pub async fn compute_monthly_stats(
    store: &dyn AttendanceStore,
    user_id: u64,
    reference: NaiveDate,
) -> Result<MonthlyStats, StoreError> {
    let records = store
        .list_between(user_id, first_of_month(reference), reference)
        .await?;
    Ok(aggregate(&records))
}
