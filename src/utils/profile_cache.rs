use crate::model::profile::UserProfile;
use moka::future::Cache;
use std::time::Duration;

/// Per-user profile cache in front of the profiles table.
/// Entries are dropped on every profile update.
#[derive(Clone)]
pub struct ProfileCache {
    inner: Cache<u64, UserProfile>,
}

impl ProfileCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(10_000) // tune based on headcount
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, user_id: u64) -> Option<UserProfile> {
        self.inner.get(&user_id).await
    }

    pub async fn put(&self, profile: UserProfile) {
        self.inner.insert(profile.id, profile).await;
    }

    pub async fn invalidate(&self, user_id: u64) {
        self.inner.invalidate(&user_id).await;
        log::debug!("Profile cache invalidated for user {}", user_id);
    }
}
