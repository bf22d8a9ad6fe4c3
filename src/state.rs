use crate::{
    auth::session::SessionEvents,
    config::Config,
    store::{AttendanceStore, CredentialStore, ProfileStore},
    utils::profile_cache::ProfileCache,
};
use chrono::{FixedOffset, NaiveDateTime, Utc};
use std::{sync::Arc, time::Duration};

/// Source of "now" for attendance decisions.
pub trait Clock: Send + Sync {
    /// Local wall-clock time in the configured office offset.
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// Shared handles passed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub attendance: Arc<dyn AttendanceStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub profile_cache: ProfileCache,
    pub clock: Arc<dyn Clock>,
    pub sessions: SessionEvents,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, clock: Arc<dyn Clock>, config: &Config) -> Self
    where
        S: AttendanceStore + ProfileStore + CredentialStore + 'static,
    {
        Self {
            attendance: store.clone(),
            profiles: store.clone(),
            credentials: store,
            profile_cache: ProfileCache::new(Duration::from_secs(config.profile_cache_ttl)),
            clock,
            sessions: SessionEvents::new(64),
        }
    }
}
