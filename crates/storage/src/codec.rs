//! Encoding of a namespace's `ProgressState` into one key-value record.
//!
//! Records are JSON with camelCase fields. Decoding is tolerant: missing
//! fields take their defaults, unknown fields are ignored, and a record that
//! cannot be parsed at all is replaced by a default state. A state decoded
//! from a newer schema keeps its `schema_version`, so writers can tell it
//! must not be re-encoded over the original. The caller learns
//! which of these happened through [`LoadOutcome`].

use std::sync::Arc;

use progress_core::model::{CURRENT_SCHEMA_VERSION, Namespace, ProgressState};

use crate::repository::{PersistenceBackend, StorageError};

/// Prefix of every state key; the namespace follows verbatim.
pub const STORAGE_KEY_PREFIX: &str = "lms_state_";

/// Backend key holding the state of `namespace`.
#[must_use]
pub fn storage_key(namespace: &Namespace) -> String {
    format!("{STORAGE_KEY_PREFIX}{namespace}")
}

//
// ─── LOAD OUTCOME ─────────────────────────────────────────────────────────────
//

/// Result of loading a namespace, tagged by where the state came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored record was parsed successfully.
    Restored(ProgressState),
    /// Nothing was stored; the state is the namespace default.
    Fresh(ProgressState),
    /// A stored record was malformed and replaced by the namespace default.
    Recovered {
        state: ProgressState,
        reason: String,
    },
}

impl LoadOutcome {
    #[must_use]
    pub fn state(&self) -> &ProgressState {
        match self {
            LoadOutcome::Restored(state) | LoadOutcome::Fresh(state) => state,
            LoadOutcome::Recovered { state, .. } => state,
        }
    }

    #[must_use]
    pub fn into_state(self) -> ProgressState {
        match self {
            LoadOutcome::Restored(state) | LoadOutcome::Fresh(state) => state,
            LoadOutcome::Recovered { state, .. } => state,
        }
    }

    #[must_use]
    pub fn is_recovered(&self) -> bool {
        matches!(self, LoadOutcome::Recovered { .. })
    }
}

//
// ─── ENCODE / DECODE ──────────────────────────────────────────────────────────
//

/// Serializes a state record.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the state cannot be encoded.
pub fn encode(state: &ProgressState) -> Result<String, StorageError> {
    serde_json::to_string(state).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parses a stored record, falling back to the namespace default when it is
/// malformed. Never fails.
#[must_use]
pub fn decode(namespace: &Namespace, raw: &str) -> LoadOutcome {
    match serde_json::from_str::<ProgressState>(raw) {
        Ok(mut state) => {
            if state.schema_version > CURRENT_SCHEMA_VERSION {
                tracing::warn!(
                    %namespace,
                    stored = state.schema_version,
                    supported = CURRENT_SCHEMA_VERSION,
                    "stored record has a newer schema version; unknown fields are not kept"
                );
            }
            state.backfill(namespace);
            LoadOutcome::Restored(state)
        }
        Err(err) => {
            tracing::warn!(%namespace, error = %err, "malformed stored record replaced by defaults");
            LoadOutcome::Recovered {
                state: ProgressState::new(namespace),
                reason: err.to_string(),
            }
        }
    }
}

//
// ─── CODEC ────────────────────────────────────────────────────────────────────
//

/// Loads and saves namespace state through a [`PersistenceBackend`].
#[derive(Clone)]
pub struct PersistenceCodec {
    backend: Arc<dyn PersistenceBackend>,
}

impl PersistenceCodec {
    #[must_use]
    pub fn new(backend: Arc<dyn PersistenceBackend>) -> Self {
        Self { backend }
    }

    /// Loads the state of `namespace`.
    ///
    /// Absent and malformed records are not errors; see [`LoadOutcome`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the backend itself cannot be read, so
    /// a caller never mistakes an unreachable record for an empty one.
    pub async fn load(&self, namespace: &Namespace) -> Result<LoadOutcome, StorageError> {
        let key = storage_key(namespace);
        let outcome = match self.backend.get(&key).await? {
            Some(raw) => decode(namespace, &raw),
            None => LoadOutcome::Fresh(ProgressState::new(namespace)),
        };
        Ok(outcome)
    }

    /// Encodes and writes the state of `namespace`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    pub async fn save(&self, namespace: &Namespace, state: &ProgressState) -> Result<(), StorageError> {
        let key = storage_key(namespace);
        let raw = encode(state)?;
        self.backend.set(&key, &raw).await?;
        tracing::debug!(%namespace, bytes = raw.len(), "state saved");
        Ok(())
    }
}
