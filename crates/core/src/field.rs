//! Galaxy record fields
//!
//! Every field of the producer's output struct is named once, in the
//! `galaxy_fields!` invocation below. That single list generates:
//!
//! - [`FieldId`]: a closed enum for O(1), typo-proof field selection
//! - [`GalaxyRecord`]: the typed, decoded record
//! - `GalaxyRecord::get` / `GalaxyRecord::set` dispatch by [`FieldId`]
//!
//! The order of the list is the on-disk order. Reordering it changes the
//! format.

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Scalar or vector type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer
    I64,
    /// 32-bit float
    F32,
    /// Three 32-bit floats (position, velocity, spin)
    Vec3,
}

impl FieldKind {
    /// Encoded width in bytes
    pub const fn width(&self) -> usize {
        match self {
            FieldKind::I32 | FieldKind::F32 => 4,
            FieldKind::I64 => 8,
            FieldKind::Vec3 => 12,
        }
    }

    /// Alignment the producer's compiler gives this kind
    pub const fn align(&self) -> usize {
        match self {
            FieldKind::I32 | FieldKind::F32 | FieldKind::Vec3 => 4,
            FieldKind::I64 => 8,
        }
    }

    /// Whether values of this kind are compared with a tolerance
    pub const fn is_float(&self) -> bool {
        matches!(self, FieldKind::F32 | FieldKind::Vec3)
    }

    /// Short type name
    pub const fn name(&self) -> &'static str {
        match self {
            FieldKind::I32 => "i32",
            FieldKind::I64 => "i64",
            FieldKind::F32 => "f32",
            FieldKind::Vec3 => "f32x3",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded field value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Signed 32-bit integer
    I32(i32),
    /// Signed 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// Three 32-bit floats
    Vec3([f32; 3]),
}

impl FieldValue {
    /// Kind of this value
    pub const fn kind(&self) -> FieldKind {
        match self {
            FieldValue::I32(_) => FieldKind::I32,
            FieldValue::I64(_) => FieldKind::I64,
            FieldValue::F32(_) => FieldKind::F32,
            FieldValue::Vec3(_) => FieldKind::Vec3,
        }
    }

    /// Integer view, for sort keys. Floats yield `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            FieldValue::I32(v) => Some(v as i64),
            FieldValue::I64(v) => Some(v),
            FieldValue::F32(_) | FieldValue::Vec3(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::I32(v) => write!(f, "{}", v),
            FieldValue::I64(v) => write!(f, "{}", v),
            FieldValue::F32(v) => write!(f, "{:e}", v),
            FieldValue::Vec3([x, y, z]) => write!(f, "[{:e}, {:e}, {:e}]", x, y, z),
        }
    }
}

macro_rules! field_ty {
    (I32) => { i32 };
    (I64) => { i64 };
    (F32) => { f32 };
    (Vec3) => { [f32; 3] };
}

macro_rules! galaxy_fields {
    ($( $(#[$doc:meta])* $variant:ident => $field:ident : $kind:ident = $name:literal ),+ $(,)?) => {
        /// Identifier of one galaxy record field
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum FieldId {
            $( $(#[$doc])* $variant, )+
        }

        impl FieldId {
            /// Every field, in on-disk order
            pub const ALL: &'static [FieldId] = &[ $( FieldId::$variant, )+ ];

            /// Field name as the producer spells it
            pub const fn name(&self) -> &'static str {
                match self {
                    $( FieldId::$variant => $name, )+
                }
            }

            /// Name of the matching `GalaxyRecord` member
            pub const fn ident(&self) -> &'static str {
                match self {
                    $( FieldId::$variant => stringify!($field), )+
                }
            }

            /// Encoded kind
            pub const fn kind(&self) -> FieldKind {
                match self {
                    $( FieldId::$variant => FieldKind::$kind, )+
                }
            }

            /// Position in [`FieldId::ALL`]
            pub const fn index(&self) -> usize {
                *self as usize
            }
        }

        /// One decoded galaxy
        ///
        /// Plain data; no identity beyond the field values.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
        pub struct GalaxyRecord {
            $( $(#[$doc])* #[serde(rename = $name)] pub $field: field_ty!($kind), )+
        }

        impl GalaxyRecord {
            /// Read one field
            pub fn get(&self, field: FieldId) -> FieldValue {
                match field {
                    $( FieldId::$variant => FieldValue::$kind(self.$field), )+
                }
            }

            /// Overwrite one field.
            ///
            /// Fails with `FieldKindMismatch` if `value` is not of the field's kind.
            pub fn set(&mut self, field: FieldId, value: FieldValue) -> Result<()> {
                match (field, value) {
                    $( (FieldId::$variant, FieldValue::$kind(v)) => self.$field = v, )+
                    (field, value) => {
                        return Err(Error::FieldKindMismatch {
                            field,
                            expected: field.kind(),
                            actual: value.kind(),
                        })
                    }
                }
                Ok(())
            }
        }
    };
}

galaxy_fields! {
    /// Snapshot the galaxy was output at
    SnapNum => snap_num: I32 = "SnapNum",
    /// 0 central, 1 satellite, 2 orphan
    Type => galaxy_type: I32 = "Type",
    /// Globally unique galaxy index
    GalaxyIndex => galaxy_index: I64 = "GalaxyIndex",
    /// Global index of the central galaxy of the host FoF group
    CentralGalaxyIndex => central_galaxy_index: I64 = "CentralGalaxyIndex",
    /// Halo index local to the run
    SageHaloIndex => sage_halo_index: I32 = "SAGEHaloIndex",
    /// Tree index local to the run
    SageTreeIndex => sage_tree_index: I32 = "SAGETreeIndex",
    /// Halo index in the input simulation
    SimulationHaloIndex => simulation_halo_index: I64 = "SimulationHaloIndex",
    /// 0 none, 1 minor merger, 2 major merger, 3 disk instability, 4 disrupted to ICS
    MergeType => merge_type: I32 = "mergeType",
    MergeIntoId => merge_into_id: I32 = "mergeIntoID",
    MergeIntoSnapNum => merge_into_snap_num: I32 = "mergeIntoSnapNum",
    Dt => dt: F32 = "dT",
    Pos => pos: Vec3 = "Pos",
    Vel => vel: Vec3 = "Vel",
    Spin => spin: Vec3 = "Spin",
    Len => len: I32 = "Len",
    Mvir => mvir: F32 = "Mvir",
    CentralMvir => central_mvir: F32 = "CentralMvir",
    Rvir => rvir: F32 = "Rvir",
    Vvir => vvir: F32 = "Vvir",
    Vmax => vmax: F32 = "Vmax",
    VelDisp => vel_disp: F32 = "VelDisp",
    ColdGas => cold_gas: F32 = "ColdGas",
    StellarMass => stellar_mass: F32 = "StellarMass",
    BulgeMass => bulge_mass: F32 = "BulgeMass",
    HotGas => hot_gas: F32 = "HotGas",
    EjectedMass => ejected_mass: F32 = "EjectedMass",
    BlackHoleMass => black_hole_mass: F32 = "BlackHoleMass",
    IntraClusterStars => intra_cluster_stars: F32 = "IntraClusterStars",
    MetalsColdGas => metals_cold_gas: F32 = "MetalsColdGas",
    MetalsStellarMass => metals_stellar_mass: F32 = "MetalsStellarMass",
    MetalsBulgeMass => metals_bulge_mass: F32 = "MetalsBulgeMass",
    MetalsHotGas => metals_hot_gas: F32 = "MetalsHotGas",
    MetalsEjectedMass => metals_ejected_mass: F32 = "MetalsEjectedMass",
    MetalsIntraClusterStars => metals_intra_cluster_stars: F32 = "MetalsIntraClusterStars",
    SfrDisk => sfr_disk: F32 = "SfrDisk",
    SfrBulge => sfr_bulge: F32 = "SfrBulge",
    SfrDiskZ => sfr_disk_z: F32 = "SfrDiskZ",
    SfrBulgeZ => sfr_bulge_z: F32 = "SfrBulgeZ",
    DiskRadius => disk_radius: F32 = "DiskRadius",
    Cooling => cooling: F32 = "Cooling",
    Heating => heating: F32 = "Heating",
    QuasarModeBhAccretionMass => quasar_mode_bh_accretion_mass: F32 = "QuasarModeBHaccretionMass",
    TimeOfLastMajorMerger => time_of_last_major_merger: F32 = "TimeOfLastMajorMerger",
    TimeOfLastMinorMerger => time_of_last_minor_merger: F32 = "TimeOfLastMinorMerger",
    OutflowRate => outflow_rate: F32 = "OutflowRate",
    InfallMvir => infall_mvir: F32 = "infallMvir",
    InfallVvir => infall_vvir: F32 = "infallVvir",
    InfallVmax => infall_vmax: F32 = "infallVmax",
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldId {
    type Err = Error;

    /// Accepts the producer's name (any case) or the record member name.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        FieldId::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(s) || f.ident() == s)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

impl Serialize for FieldId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
