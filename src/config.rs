use anyhow::{Context, Result, anyhow};
use crate::service::history::DEFAULT_WINDOW_DAYS;
use chrono::{FixedOffset, NaiveTime};
use dotenvy::dotenv;
use std::{env, str::FromStr};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Attendance rules, evaluated on the server clock
    pub late_cutoff: NaiveTime,
    pub utc_offset: FixedOffset,
    pub history_window_days: u32,

    pub profile_cache_ttl: u64,
    pub log_dir: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{} must be set", key))
}

fn or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value {:?}: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_cutoff(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .with_context(|| format!("LATE_CUTOFF must be HH:MM or HH:MM:SS, got {:?}", raw))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let late_cutoff = match env::var("LATE_CUTOFF") {
            Ok(raw) => parse_cutoff(raw.trim())?,
            Err(_) => crate::service::attendance::default_cutoff(),
        };

        let offset_minutes: i32 = or_default("UTC_OFFSET_MINUTES", 7 * 60)?; // WIB
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60)
            .ok_or_else(|| anyhow!("UTC_OFFSET_MINUTES out of range: {}", offset_minutes))?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: or_default("ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: or_default("REFRESH_TOKEN_TTL", 604800)?, // 7 days

            rate_login_per_min: or_default("RATE_LOGIN_PER_MIN", 60)?,
            rate_refresh_per_min: or_default("RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: or_default("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            late_cutoff,
            utc_offset,
            history_window_days: or_default("HISTORY_WINDOW_DAYS", DEFAULT_WINDOW_DAYS)?,

            profile_cache_ttl: or_default("PROFILE_CACHE_TTL", 300)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            access_token_ttl: 900,
            refresh_token_ttl: 3600,
            rate_login_per_min: 10_000,
            rate_refresh_per_min: 10_000,
            rate_protected_per_min: 10_000,
            api_prefix: "/api".to_string(),
            late_cutoff: crate::service::attendance::default_cutoff(),
            utc_offset: FixedOffset::east_opt(7 * 3600).unwrap(),
            history_window_days: DEFAULT_WINDOW_DAYS,
            profile_cache_ttl: 60,
            log_dir: "logs".to_string(),
        }
    }
}
