#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod gating;
pub mod identity;
pub mod model;
pub mod time;

pub use catalog::{Catalog, CatalogError};
pub use error::Error;
pub use identity::{GUEST_NAMESPACE, resolve_namespace};
pub use time::Clock;
