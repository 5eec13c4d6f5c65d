use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SageError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },
    #[error("invalid reader options: {0}")]
    InvalidOptions(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_display() {
        let err = SageError::Truncated {
            expected: 472,
            actual: 100,
        };
        assert_eq!(
            err.to_string(),
            "file truncated: expected 472 bytes, got 100"
        );
    }

    #[test]
    fn open_display_names_path() {
        let err = SageError::Open {
            path: PathBuf::from("/data/model_z0.000_0"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/data/model_z0.000_0"));
    }

    #[test]
    fn io_converts() {
        let err: SageError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, SageError::Io(_)));
    }
}
