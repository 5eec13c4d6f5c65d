use crate::value::{Value, Width};

/// How the host catalogue classifies a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Same value on every row; the payload is echoed verbatim.
    Constant(Value),
    /// Resolved once from the file header by the host, never per row.
    Header,
    /// Derived from the current record.
    Data,
}

/// One output field as described by the host's catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequest {
    pub name: String,
    pub width: Width,
    pub kind: FieldKind,
}

impl FieldRequest {
    pub fn data(name: impl Into<String>, width: Width) -> Self {
        Self {
            name: name.into(),
            width,
            kind: FieldKind::Data,
        }
    }

    pub fn header(name: impl Into<String>, width: Width) -> Self {
        Self {
            name: name.into(),
            width,
            kind: FieldKind::Header,
        }
    }

    /// A constant field; its width is the payload's.
    pub fn constant(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            width: value.width(),
            kind: FieldKind::Constant(value),
        }
    }
}
