use super::{AttendanceStore, CredentialStore, ProfileStore, RefreshTokenRow};
use crate::{
    error::StoreError,
    model::{
        attendance::{AttendanceRecord, AttendanceStatus, NewAttendance},
        profile::{ProfileUpdate, UserProfile},
        user::Credential,
    },
    utils::db_utils::{SqlValue, build_update_sql, execute_update},
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;

const ATTENDANCE_COLUMNS: &str = "id, user_id, date, check_in, check_out, status";

/// All three stores backed by one MySQL pool.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find_by_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM attendance WHERE user_id = ? AND date = ?",
            ATTENDANCE_COLUMNS
        );
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_between(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM attendance
            WHERE user_id = ?
            AND date BETWEEN ? AND ?
            ORDER BY date ASC
            "#,
            ATTENDANCE_COLUMNS
        );
        let rows = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, new: &NewAttendance) -> Result<AttendanceRecord, StoreError> {
        // uq_attendance_user_date rejects a second row for the same day
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (user_id, date, check_in, status)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.date)
        .bind(new.check_in)
        .bind(new.status.as_ref())
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_id())
            .await?
            .ok_or(StoreError::NotFound { entity: "Attendance" })
    }

    async fn fill_check_in(
        &self,
        id: u64,
        check_in: NaiveTime,
        status: AttendanceStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_in = ?, status = ?
            WHERE id = ?
            AND check_in IS NULL
            "#,
        )
        .bind(check_in)
        .bind(status.as_ref())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_check_out(&self, id: u64, check_out: NaiveTime) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?
            WHERE id = ?
            AND check_in IS NOT NULL
            AND check_out IS NULL
            "#,
        )
        .bind(check_out)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: u64) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!("SELECT {} FROM attendance WHERE id = ?", ATTENDANCE_COLUMNS);
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl ProfileStore for MySqlStore {
    async fn find(&self, user_id: u64) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT
                id,
                name,
                email,
                employee_number,
                position,
                department,
                join_date,
                phone
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, user_id: u64, update: &ProfileUpdate) -> Result<bool, StoreError> {
        let mut fields = Vec::new();
        if let Some(name) = &update.name {
            fields.push(("name", SqlValue::String(name.clone())));
        }
        if let Some(email) = &update.email {
            fields.push(("email", SqlValue::String(email.clone())));
        }
        if let Some(phone) = &update.phone {
            fields.push(("phone", SqlValue::String(phone.clone())));
        }

        let update = build_update_sql("profiles", fields, "id", user_id)
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let affected = execute_update(&self.pool, update).await?;
        if affected > 0 {
            return Ok(true);
        }

        // MySQL reports 0 rows when the values did not change
        Ok(self.find(user_id).await?.is_some())
    }
}

#[async_trait]
impl CredentialStore for MySqlStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, email, password_hash
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn store_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        expires_at: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, jti, expires_at)
            VALUES (?, ?, FROM_UNIXTIME(?))
            "#,
        )
        .bind(user_id)
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_refresh_token(&self, jti: &str) -> Result<Option<RefreshTokenRow>, StoreError> {
        let row = sqlx::query_as::<_, (u64, bool)>(
            r#"
            SELECT user_id, revoked
            FROM refresh_tokens
            WHERE jti = ?
            "#,
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(user_id, revoked)| RefreshTokenRow { user_id, revoked }))
    }

    async fn revoke_refresh_token(&self, jti: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = 1
            WHERE jti = ?
            AND revoked = 0
            "#,
        )
        .bind(jti)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
