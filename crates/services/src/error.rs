//! Shared error types for the services crate.

use thiserror::Error;

use progress_core::CatalogError;
use progress_core::model::{Namespace, ScoreError, TicketError};
use progress_storage::{SqliteInitError, StorageError};

/// Errors emitted by `ProgressionStore`.
///
/// Validation variants, `NotLoaded` and `ReadOnly` mean the call was
/// rejected and nothing changed.
/// `Persistence` means the in-memory state was updated but could not be
/// written; the in-memory state stays authoritative.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Ticket(#[from] TicketError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("state for {namespace} has not been loaded yet")]
    NotLoaded { namespace: Namespace },
    #[error("state for {namespace} uses schema version {schema_version}; read-only")]
    ReadOnly {
        namespace: Namespace,
        schema_version: u32,
    },
    #[error("failed to load state for {namespace}: {source}")]
    Load {
        namespace: Namespace,
        #[source]
        source: StorageError,
    },
    #[error("failed to persist state for {namespace}: {source}")]
    Persistence {
        namespace: Namespace,
        #[source]
        source: StorageError,
    },
}

/// Errors emitted while reading engine configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unknown backend: {0} (expected memory, file or sqlite)")]
    UnknownBackend(String),
    #[error("unknown status policy: {0} (expected monotonic or legacy)")]
    UnknownStatusPolicy(String),
    #[error("invalid boolean for {key}: {raw}")]
    InvalidBool { key: &'static str, raw: String },
    #[error("{key} must be set for the {backend} backend")]
    MissingValue {
        key: &'static str,
        backend: &'static str,
    },
    #[error("strict id checking is enabled but no catalog was provided")]
    MissingCatalog,
}

/// Errors emitted while bootstrapping the engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
