use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Classification of a day's attendance. Stored as the original column values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum AttendanceStatus {
    #[strum(serialize = "hadir")]
    #[serde(rename = "hadir")]
    Present,
    #[strum(serialize = "terlambat")]
    #[serde(rename = "terlambat")]
    Late,
    #[strum(serialize = "absen")]
    #[serde(rename = "absen")]
    Absent,
}

impl AttendanceStatus {
    /// Label shown in the history table.
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Hadir",
            AttendanceStatus::Late => "Terlambat",
            AttendanceStatus::Absent => "Absen",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "07:45:12", value_type = Option<String>)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "16:02:40", value_type = Option<String>)]
    pub check_out: Option<NaiveTime>,
    /// raw column value; anything outside the known set is kept as-is
    #[schema(example = "hadir")]
    pub status: String,
}

impl AttendanceRecord {
    pub fn status(&self) -> Option<AttendanceStatus> {
        AttendanceStatus::from_str(&self.status).ok()
    }
}

/// Row to insert on check-in.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub user_id: u64,
    pub date: NaiveDate,
    pub check_in: NaiveTime,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TodayState {
    pub checked_in: bool,
    pub checked_out: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyStats {
    #[schema(example = 23)]
    pub total: u32,
    #[schema(example = 2)]
    pub late: u32,
    #[schema(example = 0)]
    pub absent: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_stored_column_values() {
        assert_eq!(AttendanceStatus::Late.as_ref(), "terlambat");
        assert_eq!(
            AttendanceStatus::from_str("absen").ok(),
            Some(AttendanceStatus::Absent)
        );
        assert!(AttendanceStatus::from_str("cuti").is_err());
    }

    #[test]
    fn status_serializes_as_column_value() {
        let json = serde_json::to_string(&AttendanceStatus::Present).unwrap();
        assert_eq!(json, "\"hadir\"");
    }
}
