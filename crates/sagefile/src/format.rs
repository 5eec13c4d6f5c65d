//! SAGE file header read/write helpers.
//!
//! The header is always at the start of the file:
//!
//! ```text
//! [tree_count: i32][total_rows: i32][rows_per_tree: i32 * tree_count]
//! ```
//!
//! Records start immediately after the last per-tree count.

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::error::{Result, SageError};
use crate::swap::Scalar;

/// Size of the two leading counts in bytes.
pub const HEADER_FIXED_BYTES: u64 = 4 + 4;

/// Tree and row counts at the start of a SAGE file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub tree_count: i32,
    /// Number of records in the file. Trusted as-is when reading rows.
    pub total_rows: i32,
    pub rows_per_tree: Vec<i32>,
}

impl FileHeader {
    /// Byte offset of the first record.
    pub fn byte_len(&self) -> u64 {
        HEADER_FIXED_BYTES + 4 * self.rows_per_tree.len() as u64
    }

    /// Sum of the per-tree counts.
    pub fn rows_in_trees(&self) -> i64 {
        self.rows_per_tree.iter().map(|&n| n as i64).sum()
    }
}

fn header_eof(what: &str) -> impl Fn(io::Error) -> SageError + '_ {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            SageError::MalformedHeader(format!("end of file while reading {what}"))
        } else {
            SageError::Io(e)
        }
    }
}

/// Reads the header from `r`, leaving `r` positioned at the first record.
///
/// # Errors
///
/// Returns [`SageError::MalformedHeader`] if the stream ends inside the
/// header or if either leading count is negative.
pub fn read_header<R: Read>(r: &mut R, swap: bool) -> Result<FileHeader> {
    let tree_count = r
        .read_i32::<NativeEndian>()
        .map_err(header_eof("tree count"))?
        .swap_if(swap);
    let total_rows = r
        .read_i32::<NativeEndian>()
        .map_err(header_eof("total row count"))?
        .swap_if(swap);

    if tree_count < 0 {
        return Err(SageError::MalformedHeader(format!(
            "negative tree count {tree_count}"
        )));
    }
    if total_rows < 0 {
        return Err(SageError::MalformedHeader(format!(
            "negative total row count {total_rows}"
        )));
    }

    // A corrupt count must not turn into a huge up-front allocation.
    let mut rows_per_tree = Vec::with_capacity((tree_count as usize).min(1 << 16));
    for _ in 0..tree_count {
        let n = r
            .read_i32::<NativeEndian>()
            .map_err(header_eof("per-tree row counts"))?;
        rows_per_tree.push(n.swap_if(swap));
    }

    Ok(FileHeader {
        tree_count,
        total_rows,
        rows_per_tree,
    })
}

/// Writes `header` to `w` in host order, reversed when `swap` is set.
pub fn write_header<W: Write>(w: &mut W, header: &FileHeader, swap: bool) -> io::Result<()> {
    w.write_i32::<NativeEndian>(header.tree_count.swap_if(swap))?;
    w.write_i32::<NativeEndian>(header.total_rows.swap_if(swap))?;
    for &n in &header.rows_per_tree {
        w.write_i32::<NativeEndian>(n.swap_if(swap))?;
    }
    Ok(())
}
