//! Redis cache of each user's tracked-job list.
//!
//! Best-effort: a Redis failure is logged and treated as a miss. Every
//! mutation of a user's jobs must call `invalidate` after it commits.
//!
//! Entries are not versioned. A list read from the database before a
//! concurrent commit and stored after that commit's `invalidate` stays stale
//! until the TTL expires, so `CACHE_TTL_SECS` bounds how long a list may lag.
//! Single-job reads and every mutation go to the database, never the cache.

use redis::AsyncCommands;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::tracked_job::TrackedJob;

#[derive(Clone)]
pub struct JobCache {
    client: redis::Client,
    ttl_secs: u64,
}

pub fn jobs_key(user_id: Uuid) -> String {
    format!("tracked_jobs:{user_id}")
}

impl JobCache {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    pub async fn get_jobs(&self, user_id: Uuid) -> Option<Vec<TrackedJob>> {
        match self.try_get(&jobs_key(user_id)).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(jobs) => {
                    debug!("Tracked-job cache hit for user {user_id}");
                    Some(jobs)
                }
                Err(e) => {
                    warn!("Discarding unreadable cache entry for user {user_id}: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Tracked-job cache read failed for user {user_id}: {e}");
                None
            }
        }
    }

    pub async fn put_jobs(&self, user_id: Uuid, jobs: &[TrackedJob]) {
        let payload = match serde_json::to_string(jobs) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to serialize tracked jobs for cache: {e}");
                return;
            }
        };
        if let Err(e) = self.try_put(&jobs_key(user_id), payload).await {
            warn!("Tracked-job cache write failed for user {user_id}: {e}");
        }
    }

    pub async fn invalidate(&self, user_id: Uuid) {
        if let Err(e) = self.try_del(&jobs_key(user_id)).await {
            warn!("Tracked-job cache invalidation failed for user {user_id}: {e}");
        }
    }

    async fn try_get(&self, key: &str) -> redis::RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(key).await
    }

    async fn try_put(&self, key: &str, payload: String) -> redis::RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await
    }

    async fn try_del(&self, key: &str) -> redis::RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del(key).await
    }
}
