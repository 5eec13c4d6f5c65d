use std::fmt;

/// Primitive width of an output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    I16,
    I32,
    I64,
    F32,
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Width::I16 => "int16",
            Width::I32 => "int32",
            Width::I64 => "int64",
            Width::F32 => "float32",
        };
        f.write_str(s)
    }
}

/// A single typed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
}

impl Value {
    pub fn width(&self) -> Width {
        match self {
            Value::I16(_) => Width::I16,
            Value::I32(_) => Width::I32,
            Value::I64(_) => Width::I64,
            Value::F32(_) => Width::F32,
        }
    }

    /// Zero of the given width.
    pub fn zero(width: Width) -> Self {
        match width {
            Width::I16 => Value::I16(0),
            Width::I32 => Value::I32(0),
            Width::I64 => Value::I64(0),
            Width::F32 => Value::F32(0.0),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
        }
    }
}

/// Result of extracting one field from the current row.
///
/// When `is_null` is set the host records an absence; `value` still holds
/// whatever was computed (zero or a non-finite float) and should be ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedValue {
    pub value: Value,
    pub is_null: bool,
}

impl ExtractedValue {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            is_null: false,
        }
    }

    pub fn null(value: Value) -> Self {
        Self {
            value,
            is_null: true,
        }
    }

    /// The value, or `None` if it should be stored as null.
    pub fn get(&self) -> Option<Value> {
        (!self.is_null).then_some(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_reports_its_width() {
        assert_eq!(Value::I16(3).width(), Width::I16);
        assert_eq!(Value::I64(-3).width(), Width::I64);
        assert_eq!(Value::zero(Width::F32), Value::F32(0.0));
    }

    #[test]
    fn null_hides_value() {
        assert_eq!(ExtractedValue::null(Value::I32(0)).get(), None);
        assert_eq!(
            ExtractedValue::new(Value::I32(7)).get(),
            Some(Value::I32(7))
        );
    }

    #[test]
    fn display() {
        assert_eq!(Value::I64(-12).to_string(), "-12");
        assert_eq!(Value::F32(1.5e10).to_string(), "15000000000");
        assert_eq!(Width::F32.to_string(), "float32");
    }
}
