use std::sync::Arc;

use progress_core::Catalog;
use progress_core::model::StatusPolicy;
use progress_storage::{PersistenceCodec, Storage};

use crate::Clock;
use crate::config::{BackendConfig, EngineConfig};
use crate::error::{ConfigError, EngineError};
use crate::store::{LoadStatus, ProgressionStore};

/// Assembles the persistence stack and hands out namespace stores.
#[derive(Clone)]
pub struct ProgressEngine {
    clock: Clock,
    codec: PersistenceCodec,
    policy: StatusPolicy,
    strict_ids: bool,
    catalog: Option<Arc<Catalog>>,
}

impl ProgressEngine {
    /// Build the engine on the backend named by `config`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the backend cannot be opened or migrated.
    pub async fn from_config(config: &EngineConfig, clock: Clock) -> Result<Self, EngineError> {
        let storage = match &config.backend {
            BackendConfig::Memory => Storage::in_memory(),
            BackendConfig::File { dir } => Storage::file(dir.clone()).await?,
            BackendConfig::Sqlite { url } => Storage::sqlite(url).await?,
        };
        tracing::info!(
            backend = ?config.backend,
            policy = ?config.status_policy,
            strict_ids = config.strict_ids,
            "progress engine ready"
        );
        Ok(Self::with_storage(&storage, config, clock))
    }

    /// Build the engine on an already constructed storage.
    #[must_use]
    pub fn with_storage(storage: &Storage, config: &EngineConfig, clock: Clock) -> Self {
        Self {
            clock,
            codec: PersistenceCodec::new(Arc::clone(&storage.backend)),
            policy: config.status_policy,
            strict_ids: config.strict_ids,
            catalog: None,
        }
    }

    /// Provides the catalog used when `strict_ids` is enabled.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    #[must_use]
    pub fn codec(&self) -> &PersistenceCodec {
        &self.codec
    }

    /// Opens and loads the store for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCatalog` when `strict_ids` is enabled
    /// without a catalog, or `EngineError::Store` if the namespace cannot be
    /// loaded.
    pub async fn open_store(
        &self,
        identity: Option<&str>,
    ) -> Result<(ProgressionStore, LoadStatus), EngineError> {
        let (store, status) =
            ProgressionStore::open(identity, self.codec.clone(), self.clock).await?;
        let mut store = store.with_policy(self.policy);
        if self.strict_ids {
            let catalog = self.catalog.as_ref().ok_or(ConfigError::MissingCatalog)?;
            store = store.with_catalog(Arc::clone(catalog));
        }
        Ok((store, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::model::ModuleId;
    use progress_core::time::fixed_clock;

    #[tokio::test]
    async fn memory_engine_opens_guest_store() {
        let engine = ProgressEngine::from_config(&EngineConfig::default(), fixed_clock())
            .await
            .unwrap();
        let (store, status) = engine.open_store(None).await.unwrap();
        assert_eq!(store.namespace().as_str(), "guest");
        assert_eq!(status, LoadStatus::Fresh);
        assert_eq!(store.policy(), StatusPolicy::Monotonic);
    }

    #[tokio::test]
    async fn strict_ids_without_catalog_is_rejected() {
        let config = EngineConfig {
            strict_ids: true,
            ..EngineConfig::default()
        };
        let engine = ProgressEngine::from_config(&config, fixed_clock())
            .await
            .unwrap();
        let err = engine.open_store(Some("ana")).await.err().unwrap();
        assert!(matches!(err, EngineError::Config(ConfigError::MissingCatalog)));
    }

    #[tokio::test]
    async fn strict_ids_reject_unknown_modules() {
        let config = EngineConfig {
            strict_ids: true,
            ..EngineConfig::default()
        };
        let engine = ProgressEngine::from_config(&config, fixed_clock())
            .await
            .unwrap()
            .with_catalog(Catalog::new().with_modules([ModuleId::new("tech-m1")]));
        let (mut store, _) = engine.open_store(Some("ana")).await.unwrap();

        store.unlock_module(ModuleId::new("tech-m1")).await.unwrap();
        let err = store
            .unlock_module(ModuleId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::StoreError::Catalog(_)));
        assert_eq!(store.state().modules.len(), 1);
    }
}
