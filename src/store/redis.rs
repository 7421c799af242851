use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::CoordinateStore;
use crate::models::{CoordinateRecord, Label};

/// Redis-backed store holding one JSON document per label
///
/// The key is the label's wire name (e.g. `COUCH`), the value the serialized
/// [`CoordinateRecord`]. A `SET` replaces the previous position outright.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis at `url`.
    ///
    /// The connection manager multiplexes requests over one connection and
    /// reconnects on its own; connecting fails fast if Redis is unreachable at
    /// startup.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).context("Invalid REDIS_URL")?;
        let conn = client
            .get_connection_manager()
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Connected to Redis at: {}", url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl CoordinateStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn write(&self, record: &CoordinateRecord) -> Result<()> {
        let value = serde_json::to_string(record)
            .context("Failed to serialize coordinate record")?;

        let mut conn = self.conn.clone();
        let _: () = conn
            .set(record.label.as_str(), value)
            .await
            .context("Failed to SET coordinate in Redis")?;

        tracing::debug!("Stored coordinate in Redis for label: {}", record.label);
        Ok(())
    }

    async fn latest(&self, label: Label) -> Result<Option<CoordinateRecord>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(label.as_str())
            .await
            .context("Failed to GET coordinate from Redis")?;

        match value {
            Some(json) => {
                let record: CoordinateRecord = serde_json::from_str(&json)
                    .with_context(|| format!("Malformed record stored under key {}", label))?;
                Ok(Some(record))
            }
            None => {
                tracing::debug!("No Redis key for label: {}", label);
                Ok(None)
            }
        }
    }

    async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Failed to PING Redis")?;

        tracing::debug!("Redis health check replied: {}", pong);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
    }

    #[test]
    fn test_store_is_clonable_and_send_sync() {
        fn assert_clone<T: Clone>() {}
        fn assert_send_sync<T: Send + Sync>() {}
        assert_clone::<RedisStore>();
        assert_send_sync::<RedisStore>();
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let result = RedisStore::connect("not a url").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_write_and_read_back() {
        let store = RedisStore::connect(&redis_url()).await.unwrap();
        store.health_check().await.unwrap();

        let record = CoordinateRecord { label: Label::Plant, x: 0.5, y: -1.25, z: 7.0 };
        store.write(&record).await.unwrap();

        assert_eq!(store.latest(Label::Plant).await.unwrap(), Some(record));
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_second_write_overwrites_first() {
        let store = RedisStore::connect(&redis_url()).await.unwrap();

        let first = CoordinateRecord { label: Label::Screen, x: 1.0, y: 1.0, z: 1.0 };
        let second = CoordinateRecord { label: Label::Screen, x: 2.0, y: 3.0, z: 4.0 };
        store.write(&first).await.unwrap();
        store.write(&second).await.unwrap();

        assert_eq!(store.latest(Label::Screen).await.unwrap(), Some(second));
    }
}
