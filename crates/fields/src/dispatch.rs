use std::collections::HashMap;

use sagefile::GalaxyRecord;

use crate::error::FieldError;
use crate::request::{FieldKind, FieldRequest};
use crate::state::ProcessState;
use crate::value::{ExtractedValue, Value, Width};

const MASS_UNIT: f64 = 1.0e10;
const SFR_UNIT: f64 = 1.0e9;
const AGE_UNIT: f64 = 1.0e3;

/// How one output field is computed.
///
/// Unit conversions widen to `f64` for the final scaling step and narrow
/// back to `f32`.
#[derive(Debug, Clone, Copy)]
pub enum Derivation {
    /// 32-bit record field narrowed to 16 bits.
    Short(fn(&GalaxyRecord) -> i32),
    Long(fn(&GalaxyRecord) -> i64),
    Float(fn(&GalaxyRecord) -> f32),
    /// Mass in 1e10 Msun/h scaled to Msun/h.
    Mass(fn(&GalaxyRecord) -> f32),
    /// Star formation rate scaled by `h * 1e9`.
    StarFormation(fn(&GalaxyRecord) -> f32),
    /// Mean stellar age divided by `h * 1e3`.
    Age(fn(&GalaxyRecord) -> f32),
    /// Metallicity as numerator / denominator. Null when the denominator is
    /// exactly zero.
    Ratio(fn(&GalaxyRecord) -> f32, fn(&GalaxyRecord) -> f32),
    /// Composite row identifier, see [`ProcessState::db_id`].
    DbId,
    /// Composite file identifier, see [`ProcessState::file_id`].
    FileId,
    /// Running row counter within the file.
    RowNumber,
    Redshift,
    /// Not available in this format; always zero.
    Zero(Width),
    /// Not computed; zero flagged as null.
    Absent(Width),
}

impl Derivation {
    /// Width of the value this derivation produces.
    pub fn width(&self) -> Width {
        match self {
            Derivation::Short(_) => Width::I16,
            Derivation::Long(_) | Derivation::DbId | Derivation::RowNumber => Width::I64,
            Derivation::FileId => Width::I32,
            Derivation::Float(_)
            | Derivation::Mass(_)
            | Derivation::StarFormation(_)
            | Derivation::Age(_)
            | Derivation::Ratio(..)
            | Derivation::Redshift => Width::F32,
            Derivation::Zero(w) | Derivation::Absent(w) => *w,
        }
    }

    /// Whether the value depends on the current record.
    pub fn needs_row(&self) -> bool {
        !matches!(
            self,
            Derivation::Redshift | Derivation::Zero(_) | Derivation::Absent(_)
        )
    }

    fn apply(&self, state: &ProcessState, row: Option<Row<'_>>) -> ExtractedValue {
        let h = state.hubble;
        let value = match (*self, row) {
            (Derivation::Redshift, _) => Value::F32(state.redshift),
            (Derivation::Zero(w), _) => Value::zero(w),
            (Derivation::Absent(w), _) => return ExtractedValue::null(Value::zero(w)),
            (_, None) => unreachable!("row-dependent derivation applied without a row"),
            (Derivation::Short(f), Some(row)) => Value::I16(f(row.record) as i16),
            (Derivation::Long(f), Some(row)) => Value::I64(f(row.record)),
            (Derivation::Float(f), Some(row)) => Value::F32(f(row.record)),
            (Derivation::Mass(f), Some(row)) => {
                Value::F32((f(row.record) as f64 * MASS_UNIT) as f32)
            }
            (Derivation::StarFormation(f), Some(row)) => {
                Value::F32(((f(row.record) * h) as f64 * SFR_UNIT) as f32)
            }
            (Derivation::Age(f), Some(row)) => {
                Value::F32(((f(row.record) / h) as f64 / AGE_UNIT) as f32)
            }
            (Derivation::Ratio(num, den), Some(row)) => {
                let d = den(row.record);
                let v = num(row.record) / d;
                if d == 0.0 {
                    return ExtractedValue::null(Value::F32(v));
                }
                Value::F32(v)
            }
            (Derivation::DbId, Some(row)) => {
                Value::I64(state.db_id(row.record.snap_num, row.number))
            }
            (Derivation::FileId, Some(row)) => {
                Value::I32(state.file_id(row.record.snap_num) as i32)
            }
            (Derivation::RowNumber, Some(row)) => Value::I64(row.number as i64),
        };
        ExtractedValue::new(value)
    }
}

/// The row a field is extracted from.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub record: &'a GalaxyRecord,
    /// 1-based position of the record in the file.
    pub number: u64,
}

fn derivation_table() -> HashMap<&'static str, Derivation> {
    use Derivation::*;

    let entries: [(&'static str, Derivation); 38] = [
        ("dbId", DbId),
        ("snapnum", Short(|r| r.snap_num)),
        ("redshift", Redshift),
        // Same value as HostHaloID.
        ("rockstarId", Long(|r| r.ctrees_halo_id)),
        ("depthFirstId", Zero(Width::I64)),
        ("forestId", Zero(Width::I64)),
        ("GalaxyID", Long(|r| r.galaxy_index)),
        ("HostHaloID", Long(|r| r.ctrees_halo_id)),
        ("MainHaloID", Long(|r| r.ctrees_central_id)),
        ("GalaxyType", Short(|r| r.galaxy_type)),
        ("HaloMass", Mass(|r| r.mvir)),
        ("Vmax", Float(|r| r.vmax)),
        ("x", Float(|r| r.pos[0])),
        ("y", Float(|r| r.pos[1])),
        ("z", Float(|r| r.pos[2])),
        ("vx", Float(|r| r.vel[0])),
        ("vy", Float(|r| r.vel[1])),
        ("vz", Float(|r| r.vel[2])),
        ("MstarSpheroid", Mass(|r| r.bulge_mass)),
        ("MstarDisk", Mass(|r| r.stellar_mass - r.bulge_mass)),
        ("McoldDisk", Mass(|r| r.cold_gas)),
        ("Mhot", Mass(|r| r.hot_gas)),
        ("Mbh", Mass(|r| r.black_hole_mass)),
        ("SFRspheroid", StarFormation(|r| r.sfr_bulge)),
        ("SFRdisk", StarFormation(|r| r.sfr_disk)),
        ("SFR", StarFormation(|r| r.sfr_bulge + r.sfr_disk)),
        ("ZgasSpheroid", Float(|r| r.sfr_bulge_z)),
        ("ZgasDisk", Ratio(|r| r.metals_cold_gas, |r| r.cold_gas)),
        ("MZhotHalo", Mass(|r| r.metals_hot_gas)),
        ("MZstarSpheroid", Mass(|r| r.metals_bulge_mass)),
        ("MZstarDisk", Mass(|r| r.metals_stellar_mass - r.metals_bulge_mass)),
        ("MeanAgeStars", Age(|r| r.mean_star_age)),
        ("NInFile", RowNumber),
        ("fileNum", FileId),
        // Needs box size and grid resolution, which the file does not carry.
        ("ix", Zero(Width::I32)),
        ("iy", Zero(Width::I32)),
        ("iz", Zero(Width::I32)),
        ("phkey", Absent(Width::I64)),
    ];
    entries.into_iter().collect()
}

/// Resolves field requests against the current row.
pub struct FieldDispatcher {
    state: ProcessState,
    table: HashMap<&'static str, Derivation>,
}

impl FieldDispatcher {
    pub fn new(state: ProcessState) -> Self {
        Self {
            state,
            table: derivation_table(),
        }
    }

    /// Returns `true` if `name` is a data item this dispatcher can compute.
    pub fn knows(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn derivation(&self, name: &str) -> Option<&Derivation> {
        self.table.get(name)
    }

    /// All recognised data item names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.table.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Extracts one field.
    ///
    /// Constant requests echo their payload, which must have the declared
    /// width, and never look at `row`. Data
    /// requests are looked up by name; `row` is required unless the value is
    /// row-independent.
    ///
    /// # Errors
    ///
    /// Header requests, unknown names, width disagreements and data requests
    /// without a row each produce a [`FieldError`] naming the field.
    pub fn extract(
        &self,
        request: &FieldRequest,
        row: Option<Row<'_>>,
    ) -> Result<ExtractedValue, FieldError> {
        let derivation = match request.kind {
            FieldKind::Constant(value) => {
                if value.width() != request.width {
                    return Err(FieldError::WidthMismatch {
                        name: request.name.clone(),
                        expected: value.width(),
                        requested: request.width,
                    });
                }
                return Ok(ExtractedValue::new(value));
            }
            FieldKind::Header => {
                return Err(FieldError::Unsupported {
                    name: request.name.clone(),
                })
            }
            FieldKind::Data => {
                self.table
                    .get(request.name.as_str())
                    .ok_or_else(|| FieldError::Unknown {
                        name: request.name.clone(),
                    })?
            }
        };

        if derivation.width() != request.width {
            return Err(FieldError::WidthMismatch {
                name: request.name.clone(),
                expected: derivation.width(),
                requested: request.width,
            });
        }
        if row.is_none() && derivation.needs_row() {
            return Err(FieldError::NoCurrentRow {
                name: request.name.clone(),
            });
        }
        Ok(derivation.apply(&self.state, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> GalaxyRecord {
        GalaxyRecord {
            snap_num: 125,
            galaxy_type: 2,
            galaxy_index: 9_000_000_001,
            ctrees_halo_id: 12_345_678_901,
            ctrees_central_id: 12_345_678_000,
            pos: [1.0, 2.0, 3.0],
            vel: [-4.0, 5.0, -6.0],
            mvir: 1.5,
            vmax: 210.5,
            cold_gas: 0.5,
            stellar_mass: 3.0,
            bulge_mass: 1.0,
            hot_gas: 2.5,
            black_hole_mass: 0.001,
            metals_cold_gas: 0.01,
            metals_stellar_mass: 0.06,
            metals_bulge_mass: 0.02,
            metals_hot_gas: 0.03,
            sfr_disk: 2.0,
            sfr_bulge: 0.5,
            sfr_bulge_z: 0.019,
            mean_star_age: 4.2,
            ..GalaxyRecord::default()
        }
    }

    fn dispatcher() -> FieldDispatcher {
        FieldDispatcher::new(ProcessState {
            file_number: 7,
            ..ProcessState::default()
        })
    }

    fn get(d: &FieldDispatcher, name: &str, width: Width, rec: &GalaxyRecord) -> ExtractedValue {
        d.extract(
            &FieldRequest::data(name, width),
            Some(Row {
                record: rec,
                number: 42,
            }),
        )
        .unwrap()
    }

    fn float(d: &FieldDispatcher, name: &str, rec: &GalaxyRecord) -> f32 {
        match get(d, name, Width::F32, rec).value {
            Value::F32(v) => v,
            other => panic!("{name}: expected float, got {other:?}"),
        }
    }

    // -------------------- Direct copies --------------------

    #[test]
    fn identifiers_copy_through() {
        let d = dispatcher();
        let r = record();
        assert_eq!(get(&d, "GalaxyID", Width::I64, &r).value, Value::I64(9_000_000_001));
        assert_eq!(get(&d, "HostHaloID", Width::I64, &r).value, Value::I64(12_345_678_901));
        assert_eq!(get(&d, "rockstarId", Width::I64, &r).value, Value::I64(12_345_678_901));
        assert_eq!(get(&d, "MainHaloID", Width::I64, &r).value, Value::I64(12_345_678_000));
    }

    #[test]
    fn snapnum_and_type_are_16_bit() {
        let d = dispatcher();
        let r = record();
        assert_eq!(get(&d, "snapnum", Width::I16, &r).value, Value::I16(125));
        assert_eq!(get(&d, "GalaxyType", Width::I16, &r).value, Value::I16(2));
    }

    #[test]
    fn position_and_velocity_components() {
        let d = dispatcher();
        let r = record();
        assert_eq!(float(&d, "x", &r), 1.0);
        assert_eq!(float(&d, "y", &r), 2.0);
        assert_eq!(float(&d, "z", &r), 3.0);
        assert_eq!(float(&d, "vx", &r), -4.0);
        assert_eq!(float(&d, "vy", &r), 5.0);
        assert_eq!(float(&d, "vz", &r), -6.0);
        assert_eq!(float(&d, "Vmax", &r), 210.5);
        assert_eq!(float(&d, "ZgasSpheroid", &r), 0.019);
    }

    // -------------------- Composite identifiers --------------------

    #[test]
    fn db_id_and_file_num() {
        let d = dispatcher();
        let r = record();
        assert_eq!(
            get(&d, "dbId", Width::I64, &r).value,
            Value::I64((125 * 1000 + 7) * 10_000_000 + 42)
        );
        assert_eq!(get(&d, "fileNum", Width::I32, &r).value, Value::I32(125_007));
        assert_eq!(get(&d, "NInFile", Width::I64, &r).value, Value::I64(42));
    }

    #[test]
    fn db_id_of_out_of_range_snapshot_does_not_panic() {
        let d = dispatcher();
        let r = GalaxyRecord {
            snap_num: 1_000_000_000,
            ..record()
        };
        let expected = (1_000_000_000i64 * 1000 + 7)
            .wrapping_mul(10_000_000)
            .wrapping_add(42);
        assert_eq!(get(&d, "dbId", Width::I64, &r).value, Value::I64(expected));
        assert!(matches!(get(&d, "fileNum", Width::I32, &r).value, Value::I32(_)));
    }

    // -------------------- Unit conversions --------------------

    #[test]
    fn halo_mass_in_solar_masses() {
        let d = dispatcher();
        assert_eq!(float(&d, "HaloMass", &record()), 1.5e10);
    }

    #[test]
    fn masses_scale_by_1e10() {
        let d = dispatcher();
        let r = record();
        assert_eq!(float(&d, "MstarSpheroid", &r), 1.0e10);
        assert_eq!(float(&d, "MstarDisk", &r), 2.0e10);
        assert_eq!(float(&d, "McoldDisk", &r), 0.5e10);
        assert_eq!(float(&d, "Mhot", &r), 2.5e10);
        assert_eq!(float(&d, "Mbh", &r), (0.001f32 as f64 * 1e10) as f32);
        assert_eq!(float(&d, "MZhotHalo", &r), (0.03f32 as f64 * 1e10) as f32);
        assert_eq!(float(&d, "MZstarSpheroid", &r), (0.02f32 as f64 * 1e10) as f32);
        assert_eq!(
            float(&d, "MZstarDisk", &r),
            ((0.06f32 - 0.02f32) as f64 * 1e10) as f32
        );
    }

    #[test]
    fn star_formation_scales_by_h() {
        let d = dispatcher();
        let r = record();
        let h = 0.6777f32;
        assert_eq!(float(&d, "SFRdisk", &r), ((2.0f32 * h) as f64 * 1e9) as f32);
        assert_eq!(float(&d, "SFRspheroid", &r), ((0.5f32 * h) as f64 * 1e9) as f32);
        assert_eq!(float(&d, "SFR", &r), ((2.5f32 * h) as f64 * 1e9) as f32);
        assert!((float(&d, "SFRdisk", &r) - 2.0 * 0.6777 * 1e9).abs() < 1e3);
    }

    #[test]
    fn mean_age_divides_by_h() {
        let d = dispatcher();
        let got = float(&d, "MeanAgeStars", &record());
        assert_eq!(got, ((4.2f32 / 0.6777f32) as f64 / 1e3) as f32);
    }

    #[test]
    fn metallicity_ratio() {
        let d = dispatcher();
        let v = get(&d, "ZgasDisk", Width::F32, &record());
        assert!(!v.is_null);
        assert_eq!(v.value, Value::F32(0.01f32 / 0.5f32));
    }

    #[test]
    fn metallicity_with_zero_gas_is_null() {
        let d = dispatcher();
        let r = GalaxyRecord {
            metals_cold_gas: 0.0,
            cold_gas: 0.0,
            ..record()
        };
        let v = get(&d, "ZgasDisk", Width::F32, &r);
        assert!(v.is_null);
        assert!(matches!(v.value, Value::F32(x) if !x.is_finite()));
    }

    #[test]
    fn metallicity_with_metals_but_no_gas_is_null_infinity() {
        let d = dispatcher();
        let r = GalaxyRecord {
            metals_cold_gas: 0.01,
            cold_gas: 0.0,
            ..record()
        };
        let v = get(&d, "ZgasDisk", Width::F32, &r);
        assert!(v.is_null);
        assert_eq!(v.value, Value::F32(f32::INFINITY));
        assert_eq!(v.get(), None);
    }

    #[test]
    fn metallicity_with_negative_zero_gas_is_null() {
        let d = dispatcher();
        let r = GalaxyRecord {
            metals_cold_gas: 0.01,
            cold_gas: -0.0,
            ..record()
        };
        let v = get(&d, "ZgasDisk", Width::F32, &r);
        assert!(v.is_null);
        assert_eq!(v.value, Value::F32(f32::NEG_INFINITY));

        let tiny = GalaxyRecord {
            metals_cold_gas: 0.0,
            cold_gas: f32::MIN_POSITIVE,
            ..record()
        };
        assert!(!get(&d, "ZgasDisk", Width::F32, &tiny).is_null);
    }

    // -------------------- Constants and placeholders --------------------

    #[test]
    fn redshift_echoes_process_state() {
        let d = FieldDispatcher::new(ProcessState {
            redshift: 0.5,
            ..ProcessState::default()
        });
        assert_eq!(float(&d, "redshift", &record()), 0.5);
        let unknown = dispatcher();
        assert_eq!(float(&unknown, "redshift", &record()), -1.0);
    }

    #[test]
    fn phkey_is_null_zero_for_any_record() {
        let d = dispatcher();
        for r in [record(), GalaxyRecord::default()] {
            let v = get(&d, "phkey", Width::I64, &r);
            assert!(v.is_null);
            assert_eq!(v.value, Value::I64(0));
        }
    }

    #[test]
    fn grid_indices_are_zero_not_null() {
        let d = dispatcher();
        for name in ["ix", "iy", "iz"] {
            let v = get(&d, name, Width::I32, &record());
            assert_eq!(v, ExtractedValue::new(Value::I32(0)));
        }
        for name in ["depthFirstId", "forestId"] {
            let v = get(&d, name, Width::I64, &record());
            assert_eq!(v, ExtractedValue::new(Value::I64(0)));
        }
    }

    #[test]
    fn constant_is_echoed_without_a_row() {
        let d = dispatcher();
        let req = FieldRequest::constant("boxSize", Value::F32(1000.0));
        assert_eq!(
            d.extract(&req, None).unwrap(),
            ExtractedValue::new(Value::F32(1000.0))
        );
    }

    #[test]
    fn constant_of_the_wrong_width_is_rejected() {
        let d = dispatcher();
        let req = FieldRequest {
            name: "boxSize".into(),
            width: Width::I64,
            kind: FieldKind::Constant(Value::I16(5)),
        };
        assert_eq!(
            d.extract(&req, None).unwrap_err(),
            FieldError::WidthMismatch {
                name: "boxSize".into(),
                expected: Width::I16,
                requested: Width::I64,
            }
        );
    }

    #[test]
    fn constant_shadows_a_known_name() {
        let d = dispatcher();
        let req = FieldRequest::constant("snapnum", Value::I16(1));
        let row = Row {
            record: &record(),
            number: 1,
        };
        assert_eq!(d.extract(&req, Some(row)).unwrap().value, Value::I16(1));
    }

    // -------------------- Errors --------------------

    #[test]
    fn unknown_name_is_reported() {
        let d = dispatcher();
        let err = d
            .extract(&FieldRequest::data("Mgas", Width::F32), None)
            .unwrap_err();
        assert_eq!(err, FieldError::Unknown { name: "Mgas".into() });
        assert_eq!(err.name(), "Mgas");
        assert!(err.to_string().contains("Mgas"));
    }

    #[test]
    fn header_items_are_unsupported() {
        let d = dispatcher();
        let err = d
            .extract(&FieldRequest::header("Ntrees", Width::I32), None)
            .unwrap_err();
        assert!(matches!(err, FieldError::Unsupported { .. }));
    }

    #[test]
    fn width_mismatch_is_reported() {
        let d = dispatcher();
        let r = record();
        let err = d
            .extract(
                &FieldRequest::data("snapnum", Width::I32),
                Some(Row {
                    record: &r,
                    number: 1,
                }),
            )
            .unwrap_err();
        assert_eq!(
            err,
            FieldError::WidthMismatch {
                name: "snapnum".into(),
                expected: Width::I16,
                requested: Width::I32,
            }
        );
    }

    #[test]
    fn data_item_without_row() {
        let d = dispatcher();
        let err = d
            .extract(&FieldRequest::data("HaloMass", Width::F32), None)
            .unwrap_err();
        assert!(matches!(err, FieldError::NoCurrentRow { .. }));

        // Row-independent items do not need one.
        let v = d
            .extract(&FieldRequest::data("redshift", Width::F32), None)
            .unwrap();
        assert_eq!(v.value, Value::F32(-1.0));
    }

    // -------------------- Table --------------------

    #[test]
    fn table_lists_every_known_name() {
        let d = dispatcher();
        let names = d.names();
        assert_eq!(names.len(), 38);
        assert!(names.windows(2).all(|w| w[0] < w[1]));
        assert!(d.knows("phkey"));
        assert!(!d.knows("PHKEY"));
    }
}
