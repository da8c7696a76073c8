//! Redis-based ephemeral token store.
//!
//! # Architecture
//!
//! Records are plain string values under namespaced keys
//! (`refresh_token:`, `email_verif:`, `email_verified:`, `password_verif:`),
//! written with SETEX so Redis itself enforces expiry. The per-member refresh
//! index `member_refresh_tokens:{id}` is a Redis set whose TTL is pushed out
//! on every add.
//!
//! # Atomicity
//!
//! - `take` is a single GETDEL
//! - `index_add` is SADD + EXPIRE in one MULTI
//! - `index_drain` is SMEMBERS + DEL in one MULTI
//!
//! # Example
//!
//! ```no_run
//! use pharmacy_auth::stores::RedisTokenStore;
//! use pharmacy_auth::providers::{TokenKey, TokenStore};
//! use chrono::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisTokenStore::new("redis://127.0.0.1:6379").await?;
//!
//! let key = TokenKey::PasswordReset("random-token".to_string());
//! store.put(&key, r#"{"memberId":1}"#, Duration::minutes(30)).await?;
//!
//! // Single use
//! assert!(store.take(&key).await?.is_some());
//! assert!(store.take(&key).await?.is_none());
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::{TokenKey, TokenStore};
use chrono::Duration;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// `Redis`-based token store.
///
/// Cloning is cheap; clones share one `ConnectionManager`.
#[derive(Clone)]
pub struct RedisTokenStore {
    conn_manager: ConnectionManager,
}

impl RedisTokenStore {
    /// Connect to `Redis`.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - `Redis` connection URL (e.g., "<redis://127.0.0.1:6379>")
    ///
    /// # Errors
    ///
    /// Returns `TokenStoreError` if the URL is malformed or the server is unreachable.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            AuthError::TokenStoreError(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AuthError::TokenStoreError(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!("RedisTokenStore initialized successfully");

        Ok(Self { conn_manager })
    }

    /// TTL in whole seconds, never below one (`SETEX 0` is an error).
    #[allow(clippy::cast_sign_loss)] // Clamped to >= 1
    fn ttl_seconds(ttl: Duration) -> u64 {
        ttl.num_seconds().max(1) as u64
    }

    fn store_error(action: &str, e: &redis::RedisError) -> AuthError {
        AuthError::TokenStoreError(format!("Failed to {action}: {e}"))
    }
}

impl TokenStore for RedisTokenStore {
    async fn put(&self, key: &TokenKey, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let ttl_seconds = Self::ttl_seconds(ttl);

        let _: () = conn
            .set_ex(key.to_string(), value, ttl_seconds)
            .await
            .map_err(|e| Self::store_error("store token", &e))?;

        tracing::debug!(namespace = key.prefix(), ttl_seconds, "Stored token in Redis");
        Ok(())
    }

    async fn get(&self, key: &TokenKey) -> Result<Option<String>> {
        let mut conn = self.conn_manager.clone();

        let value: Option<String> = conn
            .get(key.to_string())
            .await
            .map_err(|e| Self::store_error("read token", &e))?;

        tracing::trace!(namespace = key.prefix(), hit = value.is_some(), "Token lookup");
        Ok(value)
    }

    async fn take(&self, key: &TokenKey) -> Result<Option<String>> {
        let mut conn = self.conn_manager.clone();

        let value: Option<String> = conn
            .get_del(key.to_string())
            .await
            .map_err(|e| Self::store_error("consume token", &e))?;

        tracing::trace!(namespace = key.prefix(), hit = value.is_some(), "Token consumed");
        Ok(value)
    }

    async fn delete(&self, key: &TokenKey) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: i64 = conn
            .del(key.to_string())
            .await
            .map_err(|e| Self::store_error("delete token", &e))?;

        Ok(())
    }

    async fn index_add(&self, index: &TokenKey, member: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let key = index.to_string();

        #[allow(clippy::cast_possible_wrap)] // TTLs are far below i64::MAX seconds
        let ttl_seconds = Self::ttl_seconds(ttl) as i64;

        let _: () = redis::pipe()
            .atomic()
            .sadd(&key, member)
            .ignore()
            .expire(&key, ttl_seconds)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| Self::store_error("index token", &e))?;

        Ok(())
    }

    async fn index_remove(&self, index: &TokenKey, member: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: i64 = conn
            .srem(index.to_string(), member)
            .await
            .map_err(|e| Self::store_error("unindex token", &e))?;

        Ok(())
    }

    async fn index_drain(&self, index: &TokenKey) -> Result<Vec<String>> {
        let mut conn = self.conn_manager.clone();
        let key = index.to_string();

        let (members,): (Vec<String>,) = redis::pipe()
            .atomic()
            .smembers(&key)
            .del(&key)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| Self::store_error("drain token index", &e))?;

        Ok(members)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::state::MemberId;
    use crate::utils::generate_token;

    async fn store() -> RedisTokenStore {
        RedisTokenStore::new("redis://127.0.0.1:6379").await.unwrap()
    }

    #[test]
    fn test_ttl_seconds_clamped() {
        assert_eq!(RedisTokenStore::ttl_seconds(Duration::zero()), 1);
        assert_eq!(RedisTokenStore::ttl_seconds(Duration::minutes(30)), 1800);
    }

    #[tokio::test]
    #[ignore] // Requires Redis running at localhost:6379
    async fn test_put_get_take() {
        let store = store().await;
        let key = TokenKey::PasswordReset(generate_token(32));

        store.put(&key, "payload", Duration::minutes(30)).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("payload"));
        assert_eq!(store.take(&key).await.unwrap().as_deref(), Some("payload"));
        assert_eq!(store.take(&key).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_expiration() {
        let store = store().await;
        let key = TokenKey::EmailVerification(generate_token(32));

        store.put(&key, "payload", Duration::seconds(1)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_atomic_take() {
        let store = store().await;
        let key = TokenKey::PasswordReset(generate_token(32));
        store.put(&key, "payload", Duration::minutes(5)).await.unwrap();

        let mut handles = vec![];
        for _ in 0..10 {
            let store = store.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move { store.take(&key).await.unwrap() }));
        }

        let mut hits = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                hits += 1;
            }
        }
        assert_eq!(hits, 1);
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_idempotent_delete() {
        let store = store().await;
        let key = TokenKey::Refresh(generate_token(64));
        store.delete(&key).await.unwrap();
        store.delete(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_refresh_index() {
        let store = store().await;
        // Random high ID avoids clashing with other runs
        let index = TokenKey::MemberRefreshIndex(MemberId(i64::from(rand::random::<u32>()) + 1_000_000));

        store.index_add(&index, "a", Duration::days(7)).await.unwrap();
        store.index_add(&index, "b", Duration::days(7)).await.unwrap();
        store.index_remove(&index, "a").await.unwrap();

        assert_eq!(store.index_drain(&index).await.unwrap(), vec!["b".to_string()]);
        assert!(store.index_drain(&index).await.unwrap().is_empty());
    }
}
