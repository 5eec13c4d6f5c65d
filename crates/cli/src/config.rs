use std::path::{Path, PathBuf};

use fields::ProcessState;
use sagefile::ReaderOptions;
pub use sagefile::DEFAULT_BLOCK_SIZE;

/// Everything needed to open one file.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub path: PathBuf,
    /// Reverse the byte order of every scalar in the file.
    pub swap: bool,
    pub block_size: usize,
    /// `None` reads every row.
    pub max_rows: Option<u64>,
    pub process: ProcessState,
}

impl SessionConfig {
    /// Defaults: native byte order, file number 0, 100 000-row blocks, no
    /// row limit, and the default [`ProcessState`].
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            swap: false,
            block_size: DEFAULT_BLOCK_SIZE,
            max_rows: None,
            process: ProcessState::default(),
        }
    }

    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            swap: self.swap,
            block_size: self.block_size,
            max_rows: self.max_rows,
        }
    }
}

/// Maps the command-line row cap, where any negative number means "all rows".
pub fn max_rows_from_arg(n: i64) -> Option<u64> {
    u64::try_from(n).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SessionConfig::new("/data/model_z0.000_0");
        assert_eq!(cfg.block_size, DEFAULT_BLOCK_SIZE);
        assert!(!cfg.swap);
        assert_eq!(cfg.max_rows, None);
        assert_eq!(cfg.process.snapnum_factor, 1000);
        assert_eq!(cfg.process.row_factor, 10_000_000);
        assert_eq!(cfg.process.hubble, 0.6777);
    }

    #[test]
    fn default_block_size_matches_reader() {
        assert_eq!(
            SessionConfig::new("f").reader_options(),
            ReaderOptions::default()
        );
    }

    #[test]
    fn reader_options_carry_over() {
        let mut cfg = SessionConfig::new("f");
        cfg.swap = true;
        cfg.block_size = 2;
        cfg.max_rows = Some(5);
        let opts = cfg.reader_options();
        assert!(opts.swap);
        assert_eq!(opts.block_size, 2);
        assert_eq!(opts.max_rows, Some(5));
    }

    #[test]
    fn negative_max_rows_means_unlimited() {
        assert_eq!(max_rows_from_arg(-1), None);
        assert_eq!(max_rows_from_arg(0), Some(0));
        assert_eq!(max_rows_from_arg(10), Some(10));
    }
}
