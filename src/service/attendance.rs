//! Today's attendance state and the check-in / check-out transitions.

use crate::{
    error::{AppError, StoreError, ValidationError},
    model::attendance::{AttendanceRecord, AttendanceStatus, NewAttendance, TodayState},
    store::AttendanceStore,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, info};

pub fn default_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default()
}

/// Late only when strictly after the cutoff; exactly on the cutoff is on time.
pub fn classify(check_in: NaiveTime, cutoff: NaiveTime) -> AttendanceStatus {
    if check_in > cutoff {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

/// Wall-clock time at second precision, as stored in the TIME columns.
fn time_of_day(now: NaiveDateTime) -> NaiveTime {
    let time = now.time();
    time.with_nanosecond(0).unwrap_or(time)
}

impl TodayState {
    pub fn from_record(record: Option<&AttendanceRecord>) -> Self {
        match record {
            Some(r) => TodayState {
                checked_in: r.check_in.is_some(),
                checked_out: r.check_out.is_some(),
            },
            None => TodayState::default(),
        }
    }
}

/// Flags for `(user, today)` along with the row they were derived from.
pub async fn get_today_state(
    store: &dyn AttendanceStore,
    user_id: u64,
    today: NaiveDate,
) -> Result<(TodayState, Option<AttendanceRecord>), StoreError> {
    let record = store.find_by_date(user_id, today).await?;
    Ok((TodayState::from_record(record.as_ref()), record))
}

pub async fn record_check_in(
    store: &dyn AttendanceStore,
    user_id: u64,
    now: NaiveDateTime,
    cutoff: NaiveTime,
) -> Result<AttendanceRecord, AppError> {
    let date = now.date();
    let check_in = time_of_day(now);
    let status = classify(check_in, cutoff);

    match store.find_by_date(user_id, date).await? {
        Some(existing) if existing.check_in.is_some() => {
            Err(ValidationError::AlreadyCheckedIn.into())
        }
        Some(existing) => {
            // row written earlier without a check-in (e.g. by an absence job)
            debug!(user_id, record_id = existing.id, "Filling check-in on existing row");
            if !store.fill_check_in(existing.id, check_in, status).await? {
                return Err(ValidationError::AlreadyCheckedIn.into());
            }
            let record = store
                .get(existing.id)
                .await?
                .ok_or(StoreError::NotFound { entity: "Attendance" })?;
            info!(user_id, %date, %check_in, status = %status, "Checked in");
            Ok(record)
        }
        None => {
            let new = NewAttendance {
                user_id,
                date,
                check_in,
                status,
            };
            match store.insert(&new).await {
                Ok(record) => {
                    info!(user_id, %date, %check_in, status = %status, "Checked in");
                    Ok(record)
                }
                // another client won the race for today's row
                Err(StoreError::Conflict(_)) => Err(ValidationError::AlreadyCheckedIn.into()),
                Err(e) => Err(e.into()),
            }
        }
    }
}

pub async fn record_check_out(
    store: &dyn AttendanceStore,
    user_id: u64,
    now: NaiveDateTime,
) -> Result<AttendanceRecord, AppError> {
    let date = now.date();
    let check_out = time_of_day(now);

    let record = match store.find_by_date(user_id, date).await? {
        Some(r) if r.check_in.is_some() => r,
        _ => return Err(ValidationError::NotCheckedIn.into()),
    };

    if record.check_out.is_some() {
        return Err(ValidationError::AlreadyCheckedOut.into());
    }

    if !store.set_check_out(record.id, check_out).await? {
        return Err(ValidationError::AlreadyCheckedOut.into());
    }

    let record = store
        .get(record.id)
        .await?
        .ok_or(StoreError::NotFound { entity: "Attendance" })?;
    info!(user_id, %date, %check_out, "Checked out");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;

    /// Answers `find_by_date` from a snapshot taken before another request
    /// wrote the row, so writes hit the store's own guards.
    struct StaleRead {
        inner: MemoryStore,
        snapshot: Option<AttendanceRecord>,
    }

    #[async_trait]
    impl AttendanceStore for StaleRead {
        async fn find_by_date(
            &self,
            _user_id: u64,
            _date: NaiveDate,
        ) -> Result<Option<AttendanceRecord>, StoreError> {
            Ok(self.snapshot.clone())
        }

        async fn list_between(
            &self,
            user_id: u64,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<Vec<AttendanceRecord>, StoreError> {
            self.inner.list_between(user_id, from, to).await
        }

        async fn insert(&self, new: &NewAttendance) -> Result<AttendanceRecord, StoreError> {
            self.inner.insert(new).await
        }

        async fn fill_check_in(
            &self,
            id: u64,
            check_in: NaiveTime,
            status: AttendanceStatus,
        ) -> Result<bool, StoreError> {
            self.inner.fill_check_in(id, check_in, status).await
        }

        async fn set_check_out(&self, id: u64, check_out: NaiveTime) -> Result<bool, StoreError> {
            self.inner.set_check_out(id, check_out).await
        }

        async fn get(&self, id: u64) -> Result<Option<AttendanceRecord>, StoreError> {
            self.inner.get(id).await
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn blank_row(user_id: u64, status: &str) -> AttendanceRecord {
        AttendanceRecord {
            id: 0,
            user_id,
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            check_in: None,
            check_out: None,
            status: status.to_string(),
        }
    }

    #[test]
    fn cutoff_is_exclusive() {
        let cutoff = default_cutoff();
        assert_eq!(classify(at(7, 59, 59).time(), cutoff), AttendanceStatus::Present);
        assert_eq!(classify(at(8, 0, 0).time(), cutoff), AttendanceStatus::Present);
        assert_eq!(classify(at(8, 0, 1).time(), cutoff), AttendanceStatus::Late);
    }

    #[actix_web::test]
    async fn check_in_before_cutoff_is_present() {
        let store = MemoryStore::new();
        let record = record_check_in(&store, 1, at(7, 59, 59), default_cutoff())
            .await
            .unwrap();
        assert_eq!(record.status(), Some(AttendanceStatus::Present));
        assert_eq!(record.check_in, Some(at(7, 59, 59).time()));
        assert_eq!(record.check_out, None);
    }

    #[actix_web::test]
    async fn check_in_after_cutoff_is_late() {
        let store = MemoryStore::new();
        let record = record_check_in(&store, 1, at(8, 0, 1), default_cutoff())
            .await
            .unwrap();
        assert_eq!(record.status(), Some(AttendanceStatus::Late));
    }

    #[actix_web::test]
    async fn sub_second_past_cutoff_is_still_on_time() {
        let store = MemoryStore::new();
        let now = at(8, 0, 0) + chrono::Duration::milliseconds(400);
        let record = record_check_in(&store, 1, now, default_cutoff()).await.unwrap();
        assert_eq!(record.check_in, Some(at(8, 0, 0).time()));
        assert_eq!(record.status(), Some(AttendanceStatus::Present));
    }

    #[actix_web::test]
    async fn second_check_in_is_rejected_and_leaves_record() {
        let store = MemoryStore::new();
        let first = record_check_in(&store, 1, at(7, 30, 0), default_cutoff())
            .await
            .unwrap();

        let err = record_check_in(&store, 1, at(9, 0, 0), default_cutoff())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::AlreadyCheckedIn)
        ));

        let rows = store.attendance_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].check_in, first.check_in);
        assert_eq!(rows[0].status, "hadir");
    }

    #[actix_web::test]
    async fn check_out_without_check_in_fails() {
        let store = MemoryStore::new();
        let err = record_check_out(&store, 1, at(16, 0, 0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::NotCheckedIn)));
    }

    #[actix_web::test]
    async fn check_out_keeps_status() {
        let store = MemoryStore::new();
        record_check_in(&store, 1, at(8, 15, 0), default_cutoff())
            .await
            .unwrap();
        let record = record_check_out(&store, 1, at(16, 5, 0)).await.unwrap();
        assert_eq!(record.check_out, Some(at(16, 5, 0).time()));
        assert_eq!(record.status(), Some(AttendanceStatus::Late));

        let err = record_check_out(&store, 1, at(17, 0, 0)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::AlreadyCheckedOut)
        ));
    }

    #[actix_web::test]
    async fn check_in_fills_row_without_check_in() {
        let store = MemoryStore::new();
        store.seed(blank_row(1, "absen"));

        let record = record_check_in(&store, 1, at(7, 45, 0), default_cutoff())
            .await
            .unwrap();
        assert_eq!(record.status(), Some(AttendanceStatus::Present));
        assert_eq!(store.attendance_rows().len(), 1);
    }

    #[actix_web::test]
    async fn check_out_on_row_without_check_in_fails() {
        let store = MemoryStore::new();
        store.seed(blank_row(1, "absen"));

        let err = record_check_out(&store, 1, at(16, 0, 0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::NotCheckedIn)));
    }

    #[actix_web::test]
    async fn today_state_follows_transitions() {
        let store = MemoryStore::new();
        let today = at(0, 0, 0).date();

        let (state, record) = get_today_state(&store, 1, today).await.unwrap();
        assert_eq!(state, TodayState { checked_in: false, checked_out: false });
        assert!(record.is_none());

        record_check_in(&store, 1, at(7, 0, 0), default_cutoff())
            .await
            .unwrap();
        let (state, _) = get_today_state(&store, 1, today).await.unwrap();
        assert_eq!(state, TodayState { checked_in: true, checked_out: false });

        record_check_out(&store, 1, at(15, 0, 0)).await.unwrap();
        let (state, _) = get_today_state(&store, 1, today).await.unwrap();
        assert_eq!(state, TodayState { checked_in: true, checked_out: true });
    }

    #[actix_web::test]
    async fn store_failure_propagates_without_writing() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = record_check_in(&store, 1, at(7, 0, 0), default_cutoff())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Connectivity(_))));

        store.set_offline(false);
        assert!(store.attendance_rows().is_empty());
    }

    #[actix_web::test]
    async fn users_do_not_share_rows() {
        let store = MemoryStore::new();
        record_check_in(&store, 1, at(7, 0, 0), default_cutoff())
            .await
            .unwrap();
        record_check_in(&store, 2, at(7, 5, 0), default_cutoff())
            .await
            .unwrap();
        assert_eq!(store.attendance_rows().len(), 2);
    }

    #[actix_web::test]
    async fn concurrent_insert_loses_to_unique_key() {
        let inner = MemoryStore::new();
        record_check_in(&inner, 1, at(7, 30, 0), default_cutoff())
            .await
            .unwrap();
        let store = StaleRead {
            inner,
            snapshot: None,
        };

        let err = record_check_in(&store, 1, at(7, 30, 1), default_cutoff())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::AlreadyCheckedIn)
        ));

        let rows = store.inner.attendance_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].check_in, Some(at(7, 30, 0).time()));
    }

    #[actix_web::test]
    async fn concurrent_fill_keeps_first_check_in() {
        let inner = MemoryStore::new();
        let blank = inner.seed(blank_row(1, "absen"));
        record_check_in(&inner, 1, at(7, 40, 0), default_cutoff())
            .await
            .unwrap();
        let store = StaleRead {
            inner,
            snapshot: Some(blank),
        };

        let err = record_check_in(&store, 1, at(8, 30, 0), default_cutoff())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::AlreadyCheckedIn)
        ));

        let rows = store.inner.attendance_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].check_in, Some(at(7, 40, 0).time()));
        assert_eq!(rows[0].status, "hadir");
    }

    #[actix_web::test]
    async fn concurrent_check_out_keeps_first_time() {
        let inner = MemoryStore::new();
        let checked_in = record_check_in(&inner, 1, at(7, 50, 0), default_cutoff())
            .await
            .unwrap();
        record_check_out(&inner, 1, at(16, 0, 0)).await.unwrap();
        let store = StaleRead {
            inner,
            snapshot: Some(checked_in),
        };

        let err = record_check_out(&store, 1, at(16, 0, 5)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::AlreadyCheckedOut)
        ));

        let rows = store.inner.attendance_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].check_out, Some(at(16, 0, 0).time()));
    }
}
