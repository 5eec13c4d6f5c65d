//! Default output catalogue for SAGE galaxy tables.

use std::fmt;

use fields::{FieldDispatcher, FieldRequest, Width};
use thiserror::Error;

/// Database column type of a catalogue field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Integer,
    SmallInt,
    Float,
}

impl SqlType {
    pub fn width(self) -> Width {
        match self {
            SqlType::BigInt => Width::I64,
            SqlType::Integer => Width::I32,
            SqlType::SmallInt => Width::I16,
            SqlType::Float => Width::F32,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Integer => "INTEGER",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Float => "FLOAT",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogField {
    pub name: &'static str,
    pub sql_type: SqlType,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("fields not known to the reader: {}", .0.join(", "))]
    UnknownFields(Vec<String>),
}

/// Ordered list of output columns.
#[derive(Debug, Clone)]
pub struct Catalog {
    fields: Vec<CatalogField>,
}

const DEFAULT_FIELDS: &[(&str, SqlType)] = &[
    ("dbId", SqlType::BigInt),
    ("snapnum", SqlType::SmallInt),
    ("redshift", SqlType::Float),
    ("rockstarId", SqlType::BigInt),
    ("GalaxyID", SqlType::BigInt),
    ("HostHaloID", SqlType::BigInt),
    ("MainHaloID", SqlType::BigInt),
    // TINYINT in the database; there is no 8-bit width.
    ("GalaxyType", SqlType::SmallInt),
    ("HaloMass", SqlType::Float),
    ("Vmax", SqlType::Float),
    ("x", SqlType::Float),
    ("y", SqlType::Float),
    ("z", SqlType::Float),
    ("vx", SqlType::Float),
    ("vy", SqlType::Float),
    ("vz", SqlType::Float),
    ("MstarSpheroid", SqlType::Float),
    ("MstarDisk", SqlType::Float),
    ("McoldDisk", SqlType::Float),
    ("Mhot", SqlType::Float),
    ("Mbh", SqlType::Float),
    ("SFRspheroid", SqlType::Float),
    ("SFRdisk", SqlType::Float),
    ("SFR", SqlType::Float),
    ("ZgasSpheroid", SqlType::Float),
    ("ZgasDisk", SqlType::Float),
    ("MZhotHalo", SqlType::Float),
    ("MZstarSpheroid", SqlType::Float),
    ("MZstarDisk", SqlType::Float),
    ("MeanAgeStars", SqlType::Float),
    ("NInFile", SqlType::BigInt),
    ("fileNum", SqlType::Integer),
    ("ix", SqlType::Integer),
    ("iy", SqlType::Integer),
    ("iz", SqlType::Integer),
    ("phkey", SqlType::BigInt),
];

impl Catalog {
    /// The standard SAGE galaxy table.
    pub fn sage() -> Self {
        Self {
            fields: DEFAULT_FIELDS
                .iter()
                .map(|&(name, sql_type)| CatalogField { name, sql_type })
                .collect(),
        }
    }

    /// A catalogue restricted to `names`, in the given order.
    ///
    /// # Errors
    ///
    /// Lists every name that is not in the standard catalogue.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, CatalogError> {
        let mut fields = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names {
            let name = name.as_ref();
            match self.fields.iter().find(|f| f.name == name) {
                Some(f) => fields.push(f.clone()),
                None => unknown.push(name.to_string()),
            }
        }
        if !unknown.is_empty() {
            return Err(CatalogError::UnknownFields(unknown));
        }
        Ok(Self { fields })
    }

    /// Checks that the dispatcher can compute every field.
    pub fn validate(&self, dispatcher: &FieldDispatcher) -> Result<(), CatalogError> {
        let unknown: Vec<String> = self
            .fields
            .iter()
            .filter(|f| !dispatcher.knows(f.name))
            .map(|f| f.name.to_string())
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::UnknownFields(unknown))
        }
    }

    pub fn fields(&self) -> &[CatalogField] {
        &self.fields
    }

    /// One data request per field, in catalogue order.
    pub fn requests(&self) -> Vec<FieldRequest> {
        self.fields
            .iter()
            .map(|f| FieldRequest::data(f.name, f.sql_type.width()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
