//! Reader session tying together the SAGE file reader and the field
//! dispatcher.
use std::fs::File;

use fields::{ExtractedValue, FieldDispatcher, FieldError, FieldRequest, Row};
use sagefile::{FileHeader, Result, SageReader};
use tracing::info;

use crate::config::SessionConfig;

/// One open SAGE file and the derived-field state that goes with it.
///
/// # Read Path
///
/// 1. [`next_row`](Session::next_row) advances the cursor, pulling a new
///    block from disk when the current one is used up.
/// 2. [`extract_field`](Session::extract_field) computes any number of
///    fields from the row the cursor sits on.
/// 3. Repeat until `next_row` returns `false`.
///
/// Field errors are scoped to the single call and never move the cursor.
/// Sessions share nothing; read files in parallel by opening one per file.
pub struct Session {
    reader: SageReader<File>,
    dispatcher: FieldDispatcher,
}

impl Session {
    /// Opens the file named in `config` and parses its header.
    ///
    /// The file handle and block buffers are owned by the session and
    /// released on drop, including when this call fails part-way.
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let reader = SageReader::open(&config.path, config.reader_options())?;
        info!(
            path = %config.path.display(),
            rows = reader.row_limit(),
            trees = reader.header().tree_count,
            "session opened"
        );
        Ok(Self {
            reader,
            dispatcher: FieldDispatcher::new(config.process),
        })
    }

    /// Moves to the next row. Returns `false` once the row limit is reached.
    pub fn next_row(&mut self) -> Result<bool> {
        self.reader.advance()
    }

    /// Extracts one field from the current row.
    pub fn extract_field(
        &self,
        request: &FieldRequest,
    ) -> std::result::Result<ExtractedValue, FieldError> {
        let row = self.reader.current().map(|record| Row {
            record,
            number: self.reader.current_row(),
        });
        self.dispatcher.extract(request, row)
    }

    pub fn header(&self) -> &FileHeader {
        self.reader.header()
    }

    /// Rows read so far.
    pub fn current_row(&self) -> u64 {
        self.reader.current_row()
    }

    pub fn row_limit(&self) -> u64 {
        self.reader.row_limit()
    }

    pub fn dispatcher(&self) -> &FieldDispatcher {
        &self.dispatcher
    }

    /// Closes the file and frees the block buffers.
    pub fn close(self) {
        info!(rows = self.reader.current_row(), "session closed");
        drop(self.reader.into_inner());
    }
}
