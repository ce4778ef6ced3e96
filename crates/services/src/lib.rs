#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod store;

pub use progress_core::Clock;

pub use config::{BackendConfig, EngineConfig};
pub use engine::ProgressEngine;
pub use error::{ConfigError, EngineError, StoreError};
pub use identity::{IdentityProvider, StaticIdentity};
pub use store::{LoadStatus, ProgressionStore};
