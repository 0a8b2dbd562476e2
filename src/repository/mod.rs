//! Repository layer for entity store access

pub mod equipment;
pub mod fixtures;
pub mod memory;
pub mod mongo;
pub mod store;

use std::{future::Future, sync::Arc, time::Duration};

use bson::{oid::ObjectId, Document};
use tokio::{
    sync::{OwnedSemaphorePermit, Semaphore},
    time::Instant,
};

pub use store::{Collection, EntityStore, FindQuery};
#[cfg(test)]
pub use store::MockEntityStore;

use crate::{
    config::{StoreBackend, StoreConfig},
    error::{AppError, AppResult},
    query::Projection,
};

/// Main repository struct holding the store handle
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn EntityStore>,
    query_timeout: Duration,
    sessions: Arc<Semaphore>,
}

impl Repository {
    /// Create a repository over an already connected store
    pub fn new(store: Arc<dyn EntityStore>, config: &StoreConfig) -> Self {
        Self {
            store,
            query_timeout: Duration::from_millis(config.query_timeout_ms),
            sessions: Arc::new(Semaphore::new(config.max_concurrent_reports.max(1))),
        }
    }

    /// Connect the configured backend
    pub async fn connect(config: &StoreConfig) -> AppResult<Self> {
        let store: Arc<dyn EntityStore> = match config.backend {
            StoreBackend::Memory => Arc::new(memory::MemoryStore::new()),
            StoreBackend::Mongodb => {
                Arc::new(mongo::MongoStore::connect(&config.url, &config.database).await?)
            }
        };
        Ok(Self::new(store, config))
    }

    /// Open a read session for one report run. The session is released when
    /// dropped, whichever way the run ends.
    pub async fn session(&self, report: &'static str) -> AppResult<StoreSession> {
        let permit = self
            .sessions
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::StoreUnavailable("store sessions closed".to_string()))?;
        tracing::debug!(report, "Store session acquired");
        Ok(StoreSession {
            store: self.store.clone(),
            query_timeout: self.query_timeout,
            report,
            started: Instant::now(),
            _permit: permit,
        })
    }

    pub async fn ping(&self) -> AppResult<()> {
        bounded(self.query_timeout, self.store.ping()).await
    }

    pub(crate) fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    pub(crate) fn query_timeout(&self) -> Duration {
        self.query_timeout
    }
}

/// Scoped, read-only handle used for the duration of one report run
pub struct StoreSession {
    store: Arc<dyn EntityStore>,
    query_timeout: Duration,
    report: &'static str,
    started: Instant,
    _permit: OwnedSemaphorePermit,
}

impl StoreSession {
    pub async fn find(&self, collection: Collection, query: &FindQuery) -> AppResult<Vec<Document>> {
        tracing::trace!(report = self.report, collection = collection.name(), "find");
        bounded(self.query_timeout, self.store.find(collection, query)).await
    }

    pub async fn fetch_by_ids(
        &self,
        collection: Collection,
        ids: &[ObjectId],
        projection: &Projection,
    ) -> AppResult<Vec<Document>> {
        tracing::trace!(
            report = self.report,
            collection = collection.name(),
            ids = ids.len(),
            "fetch_by_ids"
        );
        bounded(
            self.query_timeout,
            self.store.fetch_by_ids(collection, ids, projection),
        )
        .await
    }
}

impl Drop for StoreSession {
    fn drop(&mut self) {
        tracing::debug!(
            report = self.report,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Store session released"
        );
    }
}

/// Run one store round trip under the per-query timeout
pub(crate) async fn bounded<T, F>(timeout: Duration, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(timeout.as_millis() as u64)),
    }
}
