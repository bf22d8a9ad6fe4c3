use sqlx::FromRow;

/// Login credentials as stored by the session service.
#[derive(Debug, Clone, FromRow)]
pub struct Credential {
    pub id: u64, // BIGINT UNSIGNED
    pub email: String,
    pub password_hash: String,
}
