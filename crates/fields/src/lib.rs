//! # Fields
//!
//! Turns a decoded [`sagefile::GalaxyRecord`] into the named, typed values
//! an ingestion host writes out.
//!
//! The host owns the field catalogue: which names exist, their widths and
//! whether each is a constant, a header item or a per-row data item. This
//! crate owns only the derivations, a table keyed by field name. A name
//! missing from the table is a recoverable [`FieldError`], never a crash.
//!
//! ## Example
//! ```rust
//! use fields::{FieldDispatcher, FieldRequest, ProcessState, Row, Value, Width};
//! use sagefile::GalaxyRecord;
//!
//! let dispatcher = FieldDispatcher::new(ProcessState::new(3));
//! let record = GalaxyRecord { mvir: 1.5, ..GalaxyRecord::default() };
//! let row = Row { record: &record, number: 1 };
//!
//! let mass = dispatcher
//!     .extract(&FieldRequest::data("HaloMass", Width::F32), Some(row))
//!     .unwrap();
//! assert_eq!(mass.value, Value::F32(1.5e10));
//!
//! assert!(dispatcher
//!     .extract(&FieldRequest::data("NoSuchField", Width::F32), Some(row))
//!     .is_err());
//! ```

mod dispatch;
mod error;
mod request;
mod state;
mod value;

pub use dispatch::{Derivation, FieldDispatcher, Row};
pub use error::FieldError;
pub use request::{FieldKind, FieldRequest};
pub use state::{ProcessState, UNKNOWN_REDSHIFT};
pub use value::{ExtractedValue, Value, Width};
