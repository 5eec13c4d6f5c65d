use thiserror::Error;

use crate::value::Width;

/// Why a single field could not be extracted. None of these affect the
/// reader; the host may skip the field or abort, as it sees fit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown field {name:?}")]
    Unknown { name: String },
    #[error("field {name:?} is a header item and cannot be read per row")]
    Unsupported { name: String },
    #[error("field {name:?} is {expected}, catalogue asks for {requested}")]
    WidthMismatch {
        name: String,
        expected: Width,
        requested: Width,
    },
    #[error("field {name:?} requested before the first row was read")]
    NoCurrentRow { name: String },
}

impl FieldError {
    /// Name of the offending field.
    pub fn name(&self) -> &str {
        match self {
            FieldError::Unknown { name }
            | FieldError::Unsupported { name }
            | FieldError::WidthMismatch { name, .. }
            | FieldError::NoCurrentRow { name } => name,
        }
    }
}
