#![forbid(unsafe_code)]

pub mod codec;
pub mod file;
pub mod repository;
pub mod sqlite;

pub use codec::{LoadOutcome, PersistenceCodec, storage_key};
pub use file::FileBackend;
pub use repository::{InMemoryBackend, PersistenceBackend, Storage, StorageError};
pub use sqlite::{SqliteBackend, SqliteInitError};
