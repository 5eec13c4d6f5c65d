//! # sagefile: SAGE galaxy catalogue reader
//!
//! Decodes the binary output of the SAGE semi-analytic galaxy model into
//! typed [`GalaxyRecord`]s, one row at a time.
//!
//! ## File layout
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ HEADER                                        │
//! │                                               │
//! │ tree_count (i32) | total_rows (i32)           │
//! │ rows_per_tree (i32 * tree_count)              │
//! ├───────────────────────────────────────────────┤
//! │ RECORDS (total_rows * 236 bytes, no padding)  │
//! │                                               │
//! │ SnapNum (i32) | Type (i32) | GalaxyIndex (i64)│
//! │ ... see [`GalaxyRecord::layout`] ...          │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! The whole file shares one byte order, that of the machine that wrote it.
//! Readers are told whether to swap with a single flag
//! ([`ReaderOptions::swap`]); [`needs_swap`] derives it from the file's
//! endianness.
//!
//! Rows are treated as one flat stream following the header. The per-tree
//! counts are parsed but not used for ordering.

mod error;
mod format;
mod reader;
mod record;
mod swap;
mod writer;

pub use error::{Result, SageError};
pub use format::{read_header, write_header, FileHeader, HEADER_FIXED_BYTES};
pub use reader::{CursorState, ReaderOptions, SageReader, DEFAULT_BLOCK_SIZE};
pub use record::{FieldLayout, GalaxyRecord, RECORD_BYTES};
pub use swap::{needs_swap, swap32, swap64, Scalar};
pub use writer::SageWriter;
