//! Host side of the SAGE reader: session lifecycle, configuration and the
//! default output catalogue.

pub mod catalog;
pub mod config;
pub mod session;

pub use catalog::{Catalog, CatalogError, CatalogField, SqlType};
pub use config::{max_rows_from_arg, SessionConfig, DEFAULT_BLOCK_SIZE};
pub use session::Session;
