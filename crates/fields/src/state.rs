/// Redshift placeholder used until the host fills in the real value.
pub const UNKNOWN_REDSHIFT: f32 = -1.0;

/// Per-session values that feed derived fields. Fixed once the session starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessState {
    /// Number of this file within its snapshot.
    pub file_number: i32,
    /// Multiplier applied to the snapshot number in composite ids. Must
    /// exceed the largest file number.
    pub snapnum_factor: i64,
    /// Multiplier applied to the file component in composite ids. Must
    /// exceed the largest row count of any file.
    pub row_factor: i64,
    /// Dimensionless Hubble parameter h.
    pub hubble: f32,
    pub redshift: f32,
}

impl ProcessState {
    pub fn new(file_number: i32) -> Self {
        Self {
            file_number,
            ..Self::default()
        }
    }

    /// `snapnum * snapnum_factor + file_number`
    ///
    /// Wraps on overflow. Ids stay unique only while the snapshot and file
    /// numbers fit the configured factors.
    pub fn file_id(&self, snap_num: i32) -> i64 {
        (snap_num as i64)
            .wrapping_mul(self.snapnum_factor)
            .wrapping_add(self.file_number as i64)
    }

    /// `file_id * row_factor + row`, wrapping on overflow.
    pub fn db_id(&self, snap_num: i32, row: u64) -> i64 {
        self.file_id(snap_num)
            .wrapping_mul(self.row_factor)
            .wrapping_add(row as i64)
    }
}

impl Default for ProcessState {
    /// MultiDark-Planck (MDPL2) cosmology and the id factors used for it.
    fn default() -> Self {
        Self {
            file_number: 0,
            snapnum_factor: 1000,
            row_factor: 10_000_000,
            hubble: 0.6777,
            redshift: UNKNOWN_REDSHIFT,
        }
    }
}
