//! Trait seams over the remote tables. Handlers only see these traits; the
//! MySQL implementation lives in [`mysql`].

use crate::{
    error::StoreError,
    model::{
        attendance::{AttendanceRecord, AttendanceStatus, NewAttendance},
        profile::{ProfileUpdate, UserProfile},
        user::Credential,
    },
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

pub mod mysql;

#[cfg(test)]
pub mod memory;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Point lookup by `(user, date)`.
    async fn find_by_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Rows with `from <= date <= to`, ordered by date ascending.
    async fn list_between(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Inserts a row. A second row for the same `(user, date)` must fail with
    /// [`StoreError::Conflict`].
    async fn insert(&self, new: &NewAttendance) -> Result<AttendanceRecord, StoreError>;

    /// Sets check-in on a row that has none yet. Returns false if nothing changed.
    async fn fill_check_in(
        &self,
        id: u64,
        check_in: NaiveTime,
        status: AttendanceStatus,
    ) -> Result<bool, StoreError>;

    /// Sets check-out on a checked-in row that has none yet. Returns false if nothing changed.
    async fn set_check_out(&self, id: u64, check_out: NaiveTime) -> Result<bool, StoreError>;

    async fn get(&self, id: u64) -> Result<Option<AttendanceRecord>, StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find(&self, user_id: u64) -> Result<Option<UserProfile>, StoreError>;

    /// Partial update of the mutable fields. Returns false when no profile exists.
    async fn update(&self, user_id: u64, update: &ProfileUpdate) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
pub struct RefreshTokenRow {
    pub user_id: u64,
    pub revoked: bool,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError>;

    async fn store_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        expires_at: i64,
    ) -> Result<(), StoreError>;

    async fn find_refresh_token(&self, jti: &str) -> Result<Option<RefreshTokenRow>, StoreError>;

    /// Idempotent. Returns true when a live token was revoked by this call.
    async fn revoke_refresh_token(&self, jti: &str) -> Result<bool, StoreError>;
}
