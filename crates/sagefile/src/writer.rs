use std::fs::{rename, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, SageError};
use crate::format::{write_header, FileHeader};
use crate::record::{GalaxyRecord, RECORD_BYTES};

/// Writes galaxy records in the SAGE binary layout.
///
/// SAGE itself produces these files; the writer exists so fixtures can be
/// generated in either byte order.
pub struct SageWriter {}

impl SageWriter {
    /// Writes a header and `records` to `w`.
    ///
    /// `total_rows` in the header is `records.len()`; `rows_per_tree` is
    /// written as given and is not checked against it.
    pub fn write_to<W: Write>(
        w: &mut W,
        records: &[GalaxyRecord],
        rows_per_tree: &[i32],
        swap: bool,
    ) -> Result<()> {
        let header = FileHeader {
            tree_count: count_i32(rows_per_tree.len(), "tree count")?,
            total_rows: count_i32(records.len(), "row count")?,
            rows_per_tree: rows_per_tree.to_vec(),
        };
        write_header(w, &header, swap)?;

        let mut buf = [0u8; RECORD_BYTES];
        for rec in records {
            let mut rec = *rec;
            if swap {
                rec.byteswap();
            }
            rec.encode(&mut buf);
            w.write_all(&buf)?;
        }
        Ok(())
    }

    /// Writes a complete SAGE file at `path`.
    ///
    /// # Crash Safety
    ///
    /// Writes to `path.tmp`, calls `sync_all()`, then atomically renames.
    pub fn write_file(
        path: &Path,
        records: &[GalaxyRecord],
        rows_per_tree: &[i32],
        swap: bool,
    ) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        let mut w = BufWriter::new(file);
        Self::write_to(&mut w, records, rows_per_tree, swap)?;
        let file = w.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        rename(tmp_path, path)?;
        Ok(())
    }
}

fn count_i32(n: usize, what: &str) -> Result<i32> {
    i32::try_from(n)
        .map_err(|_| SageError::InvalidOptions(format!("{what} {n} does not fit the header")))
}
