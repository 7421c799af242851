//! Backing stores for coordinate records.
//!
//! Every backend answers the same two questions: persist the newest position
//! of a label, and return the current position of a label if there is one.
//! Handlers only see [`CoordinateStore`]; the concrete backend is chosen once
//! at startup from [`Config::store_backend`](crate::config::Config).

mod influx;
mod memory;
mod redis;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{Config, StoreBackend};
use crate::models::{CoordinateRecord, Label};

pub use self::influx::InfluxStore;
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Interface to the store that owns coordinate state.
///
/// Implementations hold process-scoped client handles and must be safe to
/// share across concurrently running requests.
#[async_trait]
pub trait CoordinateStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Record `record` as the newest position of its label.
    ///
    /// Last write wins; ordering between concurrent writers is left to the
    /// store.
    async fn write(&self, record: &CoordinateRecord) -> Result<()>;

    /// Fetch the current position of `label`.
    ///
    /// Returns `None` when nothing has been written, or, for windowed
    /// backends, when the newest point is older than the window.
    async fn latest(&self, label: Label) -> Result<Option<CoordinateRecord>>;

    /// Verify the store is reachable.
    async fn health_check(&self) -> Result<()>;
}

/// Create the store selected by the configuration.
pub async fn connect(config: &Config) -> Result<Arc<dyn CoordinateStore>> {
    let store: Arc<dyn CoordinateStore> = match config.store_backend {
        StoreBackend::Redis => Arc::new(RedisStore::connect(&config.redis_url).await?),
        StoreBackend::InfluxDb => Arc::new(InfluxStore::new(config.influx.clone())?),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };

    tracing::info!("Using {} coordinate store", store.backend());
    Ok(store)
}
