//! Fixed-width galaxy record as stored on disk.
//!
//! The struct below is the in-memory form; the on-disk form is the same field
//! sequence packed without padding. The layout macro generates the decoder,
//! the encoder, the byte swapper and an offset table from one field list so
//! the four can never drift apart.

use crate::swap::Scalar;

/// Name, offset and width of one record field on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

macro_rules! galaxy_record {
    ($( $(#[$meta:meta])* $field:ident : $ty:ty = $name:literal ),+ $(,)?) => {
        /// One galaxy at one snapshot.
        #[derive(Debug, Clone, Copy, Default, PartialEq)]
        pub struct GalaxyRecord {
            $( $(#[$meta])* pub $field: $ty, )+
        }

        /// Width of one record on disk, in bytes.
        pub const RECORD_BYTES: usize = 0 $( + <$ty as Scalar>::BYTES )+;

        impl GalaxyRecord {
            /// Decodes a record stored in host byte order.
            ///
            /// # Panics
            ///
            /// Panics if `bytes` is shorter than [`RECORD_BYTES`].
            pub fn decode(bytes: &[u8]) -> Self {
                let bytes = &bytes[..RECORD_BYTES];
                let mut at = 0;
                $(
                    let $field = <$ty as Scalar>::read_native(&bytes[at..]);
                    at += <$ty as Scalar>::BYTES;
                )+
                debug_assert_eq!(at, RECORD_BYTES);
                Self { $( $field, )+ }
            }

            /// Encodes the record in host byte order into `out`.
            ///
            /// # Panics
            ///
            /// Panics if `out` is shorter than [`RECORD_BYTES`].
            pub fn encode(&self, out: &mut [u8]) {
                let out = &mut out[..RECORD_BYTES];
                let mut at = 0;
                $(
                    self.$field.write_native(&mut out[at..]);
                    at += <$ty as Scalar>::BYTES;
                )+
                debug_assert_eq!(at, RECORD_BYTES);
            }

            /// Reverses the byte order of every field in place. Vector fields
            /// are swapped component by component.
            pub fn byteswap(&mut self) {
                $( self.$field = self.$field.swapped(); )+
            }

            /// Returns the on-disk offset table, in declaration order.
            pub fn layout() -> Vec<FieldLayout> {
                let mut fields = Vec::new();
                let mut offset = 0;
                $(
                    let width = <$ty as Scalar>::BYTES;
                    fields.push(FieldLayout { name: $name, offset, width });
                    offset += width;
                )+
                debug_assert_eq!(offset, RECORD_BYTES);
                fields
            }
        }
    };
}

galaxy_record! {
    snap_num: i32 = "SnapNum",
    galaxy_type: i32 = "Type",
    galaxy_index: i64 = "GalaxyIndex",
    central_galaxy_index: i64 = "CentralGalaxyIndex",
    /// Halo identifier from the merger-tree builder.
    ctrees_halo_id: i64 = "CtreesHaloID",
    tree_index: i32 = "TreeIndex",
    ctrees_central_id: i64 = "CtreesCentralID",
    merge_type: i32 = "mergeType",
    merge_into_id: i32 = "mergeIntoID",
    merge_into_snap_num: i32 = "mergeIntoSnapNum",
    dt: f32 = "dT",
    pos: [f32; 3] = "Pos",
    vel: [f32; 3] = "Vel",
    spin: [f32; 3] = "Spin",
    len: i32 = "Len",
    /// Virial mass, in 1e10 Msun/h.
    mvir: f32 = "Mvir",
    central_mvir: f32 = "CentralMvir",
    rvir: f32 = "Rvir",
    vvir: f32 = "Vvir",
    vmax: f32 = "Vmax",
    vel_disp: f32 = "VelDisp",
    cold_gas: f32 = "ColdGas",
    stellar_mass: f32 = "StellarMass",
    bulge_mass: f32 = "BulgeMass",
    hot_gas: f32 = "HotGas",
    ejected_mass: f32 = "EjectedMass",
    black_hole_mass: f32 = "BlackHoleMass",
    intra_cluster_stars: f32 = "IntraClusterStars",
    metals_cold_gas: f32 = "MetalsColdGas",
    metals_stellar_mass: f32 = "MetalsStellarMass",
    metals_bulge_mass: f32 = "MetalsBulgeMass",
    metals_hot_gas: f32 = "MetalsHotGas",
    metals_ejected_mass: f32 = "MetalsEjectedMass",
    metals_intra_cluster_stars: f32 = "MetalsIntraClusterStars",
    /// Star formation rate in the disk, in Msun/yr before the h scaling.
    sfr_disk: f32 = "SfrDisk",
    sfr_bulge: f32 = "SfrBulge",
    sfr_disk_z: f32 = "SfrDiskZ",
    sfr_bulge_z: f32 = "SfrBulgeZ",
    disk_radius: f32 = "DiskRadius",
    cooling: f32 = "Cooling",
    heating: f32 = "Heating",
    quasar_mode_bh_accretion_mass: f32 = "QuasarModeBHaccretionMass",
    time_of_last_major_merger: f32 = "TimeOfLastMajorMerger",
    time_of_last_minor_merger: f32 = "TimeOfLastMinorMerger",
    outflow_rate: f32 = "OutflowRate",
    mean_star_age: f32 = "MeanStarAge",
    infall_mvir: f32 = "infallMvir",
    infall_vvir: f32 = "infallVvir",
    infall_vmax: f32 = "infallVmax",
}
