use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, warn};

use crate::error::{Result, SageError};
use crate::format::{read_header, FileHeader};
use crate::record::{GalaxyRecord, RECORD_BYTES};

/// Rows per bulk read unless told otherwise.
pub const DEFAULT_BLOCK_SIZE: usize = 100_000;

/// Settings fixed for the lifetime of one reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Reverse the byte order of every scalar read from the file.
    pub swap: bool,
    /// Records fetched per bulk read.
    pub block_size: usize,
    /// Upper bound on rows to read; `None` reads every row in the file.
    pub max_rows: Option<u64>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            swap: false,
            block_size: DEFAULT_BLOCK_SIZE,
            max_rows: None,
        }
    }
}

/// Where the cursor stands relative to the row stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No row has been requested yet.
    NotStarted,
    /// A row is available through [`SageReader::current`].
    Positioned,
    /// The row limit was reached or a read failed. Terminal.
    Exhausted,
}

/// Streams galaxy records out of a SAGE file one row at a time.
///
/// On construction the header is parsed and the block buffers are allocated
/// at `block_size` capacity. Rows are then pulled from storage in blocks of
/// `block_size` records with a single read each; [`advance`] hands them out
/// one by one and refills the block when it runs dry.
///
/// The reader owns its source. Dropping it (or calling
/// [`into_inner`](SageReader::into_inner)) releases the buffers and the
/// handle.
///
/// [`advance`]: SageReader::advance
pub struct SageReader<R: Read> {
    src: R,
    header: FileHeader,
    swap: bool,
    block_size: usize,
    /// min(max_rows, total_rows)
    row_limit: u64,
    /// Rows handed out so far, across all blocks.
    current_row: u64,

    raw: Vec<u8>,
    block: Vec<GalaxyRecord>,
    pos_in_block: usize,
    current: GalaxyRecord,
    state: CursorState,
}

impl SageReader<File> {
    /// Opens a SAGE file and parses its header.
    ///
    /// # Errors
    ///
    /// Returns [`SageError::Open`] if the file cannot be opened, and any
    /// error from [`from_reader`](SageReader::from_reader).
    pub fn open<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened sage file");
        Self::from_reader(file, options)
    }
}

impl<R: Read> SageReader<R> {
    /// Wraps a stream positioned at the start of a SAGE file.
    ///
    /// # Errors
    ///
    /// Returns [`SageError::InvalidOptions`] for a zero block size and
    /// [`SageError::MalformedHeader`] if the header cannot be read.
    pub fn from_reader(mut src: R, options: ReaderOptions) -> Result<Self> {
        if options.block_size == 0 {
            return Err(SageError::InvalidOptions(
                "block size must be at least one row".to_string(),
            ));
        }

        let header = read_header(&mut src, options.swap)?;
        debug!(
            trees = header.tree_count,
            rows = header.total_rows,
            first_trees = ?&header.rows_per_tree[..header.rows_per_tree.len().min(4)],
            "read header"
        );
        if header.rows_in_trees() != header.total_rows as i64 {
            warn!(
                total_rows = header.total_rows,
                rows_in_trees = header.rows_in_trees(),
                "per-tree row counts disagree with total; trusting total"
            );
        }

        let total = header.total_rows as u64;
        let row_limit = match options.max_rows {
            None => total,
            Some(max) if max > total => {
                warn!(
                    total,
                    requested = max,
                    "more rows requested than the file holds; limiting to {total}"
                );
                total
            }
            Some(max) => max,
        };

        // Allocated once; only the fill count changes between blocks.
        let block_size = options.block_size.min(row_limit.max(1) as usize);
        Ok(Self {
            src,
            header,
            swap: options.swap,
            block_size,
            row_limit,
            current_row: 0,
            raw: vec![0u8; block_size * RECORD_BYTES],
            block: Vec::with_capacity(block_size),
            pos_in_block: 0,
            current: GalaxyRecord::default(),
            state: CursorState::NotStarted,
        })
    }

    /// Loads up to `requested` records into the block buffer with one read.
    ///
    /// Returns the number of records loaded, which is 0 once the row limit
    /// has been reached (no I/O is done in that case).
    ///
    /// # Errors
    ///
    /// Returns [`SageError::Truncated`] if the source ends before the block
    /// is filled.
    pub fn read_block(&mut self, requested: usize) -> Result<usize> {
        self.block.clear();
        if self.current_row >= self.row_limit {
            debug!(rows = self.current_row, "row limit reached, nothing more to read");
            return Ok(0);
        }

        let remaining = self.row_limit - self.current_row;
        let count = requested.min(self.block_size).min(remaining as usize);
        let want = count * RECORD_BYTES;

        let started = Instant::now();
        let got = read_full(&mut self.src, &mut self.raw[..want])?;
        if got < want {
            return Err(SageError::Truncated {
                expected: want as u64,
                actual: got as u64,
            });
        }
        debug!(
            rows = count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "read block"
        );

        self.block
            .extend(self.raw[..want].chunks_exact(RECORD_BYTES).map(GalaxyRecord::decode));
        Ok(count)
    }

    /// Moves to the next row.
    ///
    /// Returns `Ok(true)` when a row is available through
    /// [`current`](Self::current), `Ok(false)` once every row up to the
    /// limit has been handed out. After `false` (or an error) the reader is
    /// exhausted and keeps returning `false`.
    ///
    /// # Errors
    ///
    /// Propagates I/O and truncation errors from [`read_block`](Self::read_block).
    pub fn advance(&mut self) -> Result<bool> {
        match self.state {
            CursorState::Exhausted => return Ok(false),
            CursorState::Positioned if self.pos_in_block + 1 < self.block.len() => {
                self.pos_in_block += 1;
            }
            CursorState::NotStarted | CursorState::Positioned => {
                let loaded = match self.read_block(self.block_size) {
                    Ok(n) => n,
                    Err(e) => {
                        self.state = CursorState::Exhausted;
                        return Err(e);
                    }
                };
                self.pos_in_block = 0;
                if loaded == 0 {
                    self.state = CursorState::Exhausted;
                    return Ok(false);
                }
            }
        }

        self.current = self.block[self.pos_in_block];
        if self.swap {
            self.current.byteswap();
        }
        self.current_row += 1;
        self.state = CursorState::Positioned;
        Ok(true)
    }

    /// The row most recently returned by [`advance`](Self::advance).
    pub fn current(&self) -> Option<&GalaxyRecord> {
        match self.state {
            CursorState::Positioned => Some(&self.current),
            _ => None,
        }
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Number of rows handed out so far. Equals the 1-based index of the
    /// current row while positioned.
    pub fn current_row(&self) -> u64 {
        self.current_row
    }

    pub fn row_limit(&self) -> u64 {
        self.row_limit
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Records loaded by the most recent block read.
    pub fn block_len(&self) -> usize {
        self.block.len()
    }

    /// Releases the buffers and returns the underlying source.
    pub fn into_inner(self) -> R {
        self.src
    }
}

/// Reads until `buf` is full or the source is exhausted. Returns bytes read.
fn read_full<R: Read>(src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
