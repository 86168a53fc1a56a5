// ============================================
// Redis Storage
// ============================================
//
// Redis-backed implementations of the engine-owned stores.
//
// Keys:
// - personalization:vector:{user_id}            - Hash tag -> weight
// - personalization:vector:{user_id}:updated_at - RFC3339 timestamp
// - personalization:vector_users                - Set of user ids with vectors
// - personalization:dedup:{listing}:{user}:{type} - TTL'd admission marker
// - personalization:counts:{listing}            - Hash event type -> count
//
// Vector deltas run as one Lua script per user so the clamped
// read-modify-write is a single atomic server-side operation. Event dedup is
// a SET NX EX on the triple key: the marker's TTL is the trailing window.

use super::{ActivityEventStore, InterestVectorStore, Result, StorageError};
use crate::models::{ActivityCounts, ActivityEvent, ListingEventType, TagVector};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

const DEFAULT_KEY_PREFIX: &str = "personalization";

const APPLY_DELTAS_SCRIPT: &str = r#"
for i = 1, #ARGV, 2 do
    local tag = ARGV[i]
    local delta = tonumber(ARGV[i + 1])
    local current = tonumber(redis.call('HGET', KEYS[1], tag)) or 0
    local updated = current + delta
    if updated < 0 then
        updated = 0
    end
    redis.call('HSET', KEYS[1], tag, updated)
end
return redis.status_reply('OK')
"#;

/// Interest vectors stored as Redis hashes.
pub struct RedisVectorStore {
    redis: redis::Client,
    key_prefix: String,
    apply_deltas: redis::Script,
}

impl RedisVectorStore {
    pub fn new(redis: redis::Client) -> Self {
        Self {
            redis,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            apply_deltas: redis::Script::new(APPLY_DELTAS_SCRIPT),
        }
    }

    fn vector_key(&self, user_id: Uuid) -> String {
        format!("{}:vector:{}", self.key_prefix, user_id)
    }

    fn updated_at_key(&self, user_id: Uuid) -> String {
        format!("{}:vector:{}:updated_at", self.key_prefix, user_id)
    }

    fn users_key(&self) -> String {
        format!("{}:vector_users", self.key_prefix)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))
    }

    async fn load_one(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
        user_id: Uuid,
    ) -> Result<Option<TagVector>> {
        let weights: HashMap<String, f64> = conn
            .hgetall(self.vector_key(user_id))
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))?;

        if weights.is_empty() {
            return Ok(None);
        }

        let updated_at: Option<String> = conn
            .get(self.updated_at_key(user_id))
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))?;

        let updated_at = updated_at
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(Some(TagVector {
            user_id,
            weights,
            updated_at,
        }))
    }
}

#[async_trait]
impl InterestVectorStore for RedisVectorStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<TagVector>> {
        let mut conn = self.connection().await?;
        self.load_one(&mut conn, user_id).await
    }

    async fn load_all(&self) -> Result<Vec<TagVector>> {
        let mut conn = self.connection().await?;

        let member_ids: Vec<String> = conn
            .smembers(self.users_key())
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))?;

        let mut vectors = Vec::with_capacity(member_ids.len());
        for raw_id in member_ids {
            let user_id = match Uuid::parse_str(&raw_id) {
                Ok(id) => id,
                Err(err) => {
                    warn!("Invalid UUID in vector user set {}: {}", raw_id, err);
                    continue;
                }
            };
            if let Some(vector) = self.load_one(&mut conn, user_id).await? {
                vectors.push(vector);
            }
        }

        Ok(vectors)
    }

    async fn apply_deltas(&self, user_id: Uuid, deltas: &[(String, f64)]) -> Result<()> {
        if deltas.is_empty() {
            return Ok(());
        }

        let mut conn = self.connection().await?;

        let mut invocation = self.apply_deltas.prepare_invoke();
        invocation.key(self.vector_key(user_id));
        for (tag, delta) in deltas {
            invocation.arg(tag).arg(*delta);
        }
        let _: () = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))?;

        let _: () = conn
            .sadd(self.users_key(), user_id.to_string())
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))?;

        let _: () = conn
            .set(self.updated_at_key(user_id), Utc::now().to_rfc3339())
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))?;

        Ok(())
    }
}

/// Activity events with TTL-marker dedup and hash counters.
pub struct RedisActivityStore {
    redis: redis::Client,
    key_prefix: String,
}

impl RedisActivityStore {
    pub fn new(redis: redis::Client) -> Self {
        Self {
            redis,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    fn dedup_key(&self, listing_id: Uuid, user_id: Uuid, event_type: ListingEventType) -> String {
        format!(
            "{}:dedup:{}:{}:{}",
            self.key_prefix, listing_id, user_id, event_type
        )
    }

    fn counts_key(&self, listing_id: Uuid) -> String {
        format!("{}:counts:{}", self.key_prefix, listing_id)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))
    }
}

#[async_trait]
impl ActivityEventStore for RedisActivityStore {
    async fn insert_unless_duplicate(
        &self,
        event: ActivityEvent,
        window_secs: i64,
    ) -> Result<bool> {
        let mut conn = self.connection().await?;

        // SET NX EX: succeeds only when no same-triple marker is alive.
        let admitted: Option<String> = redis::cmd("SET")
            .arg(self.dedup_key(event.listing_id, event.user_id, event.event_type))
            .arg(event.id.to_string())
            .arg("NX")
            .arg("EX")
            .arg(window_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))?;

        if admitted.is_none() {
            return Ok(false);
        }

        let _: () = conn
            .hincr(
                self.counts_key(event.listing_id),
                event.event_type.as_str(),
                1i64,
            )
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))?;

        Ok(true)
    }

    async fn counts_for(&self, listing_id: Uuid) -> Result<ActivityCounts> {
        let mut conn = self.connection().await?;

        let raw: HashMap<String, u64> = conn
            .hgetall(self.counts_key(listing_id))
            .await
            .map_err(|e| StorageError::RedisError(e.to_string()))?;

        Ok(ActivityCounts {
            views: raw.get("view").copied().unwrap_or(0),
            clicks: raw.get("click").copied().unwrap_or(0),
            offers: raw.get("offer").copied().unwrap_or(0),
        })
    }

    async fn bulk_counts(&self, listing_ids: &[Uuid]) -> Result<HashMap<Uuid, ActivityCounts>> {
        let mut result = HashMap::with_capacity(listing_ids.len());
        for listing_id in listing_ids {
            result.insert(*listing_id, self.counts_for(*listing_id).await?);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_key_format() {
        let client = redis::Client::open("redis://localhost:6379").expect("Redis client failed");
        let store = RedisVectorStore::new(client);
        let user_id = Uuid::nil();

        assert_eq!(
            store.vector_key(user_id),
            "personalization:vector:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(store.users_key(), "personalization:vector_users");
    }

    #[test]
    fn test_dedup_key_format() {
        let client = redis::Client::open("redis://localhost:6379").expect("Redis client failed");
        let store = RedisActivityStore::new(client);
        let listing_id = Uuid::nil();
        let user_id = Uuid::nil();

        assert_eq!(
            store.dedup_key(listing_id, user_id, ListingEventType::Offer),
            "personalization:dedup:00000000-0000-0000-0000-000000000000:00000000-0000-0000-0000-000000000000:offer"
        );
        assert_eq!(
            store.counts_key(listing_id),
            "personalization:counts:00000000-0000-0000-0000-000000000000"
        );
    }
}
