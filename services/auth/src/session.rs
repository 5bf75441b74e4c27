//! Refresh-token sessions stored in Redis
//!
//! One session per user: the key holds the refresh token currently valid for
//! that user and expires with it.

use anyhow::Result;
use common::cache::RedisPool;
use tracing::{debug, info};
use uuid::Uuid;

/// Session manager for handling user sessions in Redis
#[derive(Clone)]
pub struct SessionManager {
    redis_pool: RedisPool,
    ttl_seconds: u64,
}

pub(crate) fn session_key(user_id: Uuid) -> String {
    format!("session:{}", user_id)
}

impl SessionManager {
    pub fn new(redis_pool: RedisPool, ttl_seconds: u64) -> Self {
        Self {
            redis_pool,
            ttl_seconds,
        }
    }

    /// Store `refresh_token` as the user's current session, replacing any previous one
    pub async fn store_session(&self, user_id: Uuid, refresh_token: &str) -> Result<()> {
        debug!("Storing session for user: {}", user_id);
        self.redis_pool
            .set(&session_key(user_id), refresh_token, Some(self.ttl_seconds))
            .await
    }

    /// Whether `refresh_token` is the one recorded for the user
    pub async fn is_session_valid(&self, user_id: Uuid, refresh_token: &str) -> Result<bool> {
        let stored = self.redis_pool.get(&session_key(user_id)).await?;
        Ok(stored.as_deref() == Some(refresh_token))
    }

    /// Delete a session for a user
    pub async fn delete_session(&self, user_id: Uuid) -> Result<()> {
        info!("Deleting session for user: {}", user_id);
        self.redis_pool.delete(&session_key(user_id)).await
    }
}
