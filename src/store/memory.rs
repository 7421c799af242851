use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CoordinateStore;
use crate::models::{CoordinateRecord, Label};

/// Keeps the latest record per label in process memory.
///
/// Same semantics as the Redis backend without the external service; used for
/// local runs and by the handler tests.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Label, CoordinateRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CoordinateStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn write(&self, record: &CoordinateRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.label, record.clone());
        tracing::debug!("Stored coordinate in memory for label: {}", record.label);
        Ok(())
    }

    async fn latest(&self, label: Label) -> Result<Option<CoordinateRecord>> {
        Ok(self.records.read().await.get(&label).cloned())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
