use std::fmt::{Display, Formatter};
use std::str::FromStr;

use plate::well::WellId;
use rust_decimal::Decimal;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// Categorical adapter kind, e.g. `dual_index`, `tcr_human_alpha`.
///
/// IndexType should be a string with no whitespace characters at all, mostly so values can be
/// used on the command line without parsing issues.
#[derive(Debug, Clone, DeserializeFromStr, SerializeDisplay, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexType(pub String);

impl IndexType {
    fn is_valid(value: &str) -> bool {
        !value.is_empty()
            && value
                .chars()
                .all(|c| !(c.is_whitespace() || c.is_ascii_control() || c.is_control()))
    }

    /// See [`IndexType::from_str`] for a variant that does validation.
    ///
    /// Safety: value must be valid
    pub fn from_raw_str(value: &str) -> Self {
        assert!(Self::is_valid(value));
        Self(value.to_string())
    }
}

impl FromStr for IndexType {
    type Err = IndexTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(IndexTypeError::InvalidIndexType(s.to_string()))
        }
    }
}

impl Display for IndexType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum IndexTypeError {
    #[error("Invalid index type: '{0}'")]
    InvalidIndexType(String),
}

pub type SetId = u32;

/// All records sharing (index type, set id) form one activatable set of at most this many slots,
/// one 96-well source plate.
pub const SET_CAPACITY: usize = 96;

/// One physical well of adapter on one source plate.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct InventoryRecord {
    /// Physical barcode of the source plate.
    pub plate_id: String,
    pub well: WellId,

    // identity of the barcode sequence; immutable once imported
    pub index_id: String,
    pub index_tag: String,

    pub index_type: IndexType,
    pub set_id: SetId,

    /// ng/µl
    pub concentration: Decimal,
    /// µl; only ever decreases after creation
    pub remaining_volume: Decimal,

    pub is_active: bool,
    pub is_depleted: bool,

    /// Round-robin cursor marker; at most one record per eligible ordered list.
    pub last_used: bool,
}

impl InventoryRecord {
    pub fn is_in_set(&self, index_type: &IndexType, set_id: SetId) -> bool {
        self.index_type.eq(index_type) && self.set_id == set_id
    }

    /// Marks the record unusable; depleted records are never reactivated.
    pub fn retire(&mut self) {
        self.is_depleted = true;
        self.is_active = false;
    }

    pub fn consume(&mut self, volume: Decimal) {
        self.remaining_volume -= volume;
    }
}

#[cfg(feature = "testing")]
impl Default for InventoryRecord {
    fn default() -> Self {
        Self {
            plate_id: "PLATE-0001".to_string(),
            well: WellId::from_raw_str("A1"),
            index_id: "D701".to_string(),
            index_tag: "ATTACTCG".to_string(),
            index_type: IndexType::from_raw_str("dual_index"),
            set_id: 1,
            concentration: Decimal::new(1000, 1),
            remaining_volume: Decimal::new(600, 0),
            is_active: false,
            is_depleted: false,
            last_used: false,
        }
    }
}
