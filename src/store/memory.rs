use super::{AttendanceStore, CredentialStore, ProfileStore, RefreshTokenRow};
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
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Tables {
    attendance: Vec<AttendanceRecord>,
    profiles: HashMap<u64, UserProfile>,
    credentials: Vec<Credential>,
    refresh_tokens: HashMap<String, RefreshTokenRow>,
    next_id: u64,
}

/// In-process stand-in for the MySQL tables, with the same uniqueness rules.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`StoreError::Connectivity`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn add_profile(&self, profile: UserProfile) {
        self.tables.lock().unwrap().profiles.insert(profile.id, profile);
    }

    pub fn add_credential(&self, credential: Credential) {
        self.tables.lock().unwrap().credentials.push(credential);
    }

    /// Inserts a row as-is, e.g. an absence written by a batch job.
    pub fn seed(&self, mut record: AttendanceRecord) -> AttendanceRecord {
        let mut tables = self.tables.lock().unwrap();
        tables.next_id += 1;
        record.id = tables.next_id;
        tables.attendance.push(record.clone());
        record
    }

    pub fn attendance_rows(&self) -> Vec<AttendanceRecord> {
        self.tables.lock().unwrap().attendance.clone()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Connectivity("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_by_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        self.check_online()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .attendance
            .iter()
            .find(|r| r.user_id == user_id && r.date == date)
            .cloned())
    }

    async fn list_between(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.check_online()?;
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<_> = tables
            .attendance
            .iter()
            .filter(|r| r.user_id == user_id && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }

    async fn insert(&self, new: &NewAttendance) -> Result<AttendanceRecord, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        if tables
            .attendance
            .iter()
            .any(|r| r.user_id == new.user_id && r.date == new.date)
        {
            return Err(StoreError::Conflict("Duplicate entry for user/date".into()));
        }
        tables.next_id += 1;
        let record = AttendanceRecord {
            id: tables.next_id,
            user_id: new.user_id,
            date: new.date,
            check_in: Some(new.check_in),
            check_out: None,
            status: new.status.to_string(),
        };
        tables.attendance.push(record.clone());
        Ok(record)
    }

    async fn fill_check_in(
        &self,
        id: u64,
        check_in: NaiveTime,
        status: AttendanceStatus,
    ) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        match tables
            .attendance
            .iter_mut()
            .find(|r| r.id == id && r.check_in.is_none())
        {
            Some(row) => {
                row.check_in = Some(check_in);
                row.status = status.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_check_out(&self, id: u64, check_out: NaiveTime) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        match tables
            .attendance
            .iter_mut()
            .find(|r| r.id == id && r.check_in.is_some() && r.check_out.is_none())
        {
            Some(row) => {
                row.check_out = Some(check_out);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, id: u64) -> Result<Option<AttendanceRecord>, StoreError> {
        self.check_online()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.attendance.iter().find(|r| r.id == id).cloned())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find(&self, user_id: u64) -> Result<Option<UserProfile>, StoreError> {
        self.check_online()?;
        Ok(self.tables.lock().unwrap().profiles.get(&user_id).cloned())
    }

    async fn update(&self, user_id: u64, update: &ProfileUpdate) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        match tables.profiles.get_mut(&user_id) {
            Some(profile) => {
                update.apply(profile);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        self.check_online()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .credentials
            .iter()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn store_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        _expires_at: i64,
    ) -> Result<(), StoreError> {
        self.check_online()?;
        self.tables.lock().unwrap().refresh_tokens.insert(
            jti.to_string(),
            RefreshTokenRow {
                user_id,
                revoked: false,
            },
        );
        Ok(())
    }

    async fn find_refresh_token(&self, jti: &str) -> Result<Option<RefreshTokenRow>, StoreError> {
        self.check_online()?;
        Ok(self.tables.lock().unwrap().refresh_tokens.get(jti).cloned())
    }

    async fn revoke_refresh_token(&self, jti: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        match tables.refresh_tokens.get_mut(jti) {
            Some(row) if !row.revoked => {
                row.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
