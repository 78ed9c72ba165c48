use plate::geometry::{GeometryError, PlateSize};
use plate::well::WellId;
use rust_decimal::Decimal;

use crate::category::{SampleCategory, Species};

/// A sample-bearing record on a destination (library prep) plate.
///
/// Created upstream; the engine reads everything and writes only [`Self::assignment`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct SampleAllocationTarget {
    pub sample_id: String,
    pub well: WellId,

    /// Free-text recipe, kept for diagnostics; the engine uses [`Self::category`].
    pub recipe: String,
    pub category: SampleCategory,
    pub species: Option<Species>,
    pub sample_type: String,

    /// Declared input mass, ng. Missing values degrade to zero with a warning.
    pub initial_input_amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub assignment: Option<IndexAssignment>,
}

/// The adapter identity, source coordinates and dilution numbers written onto a sample.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct IndexAssignment {
    pub index_id: String,
    pub index_tag: String,

    pub source_plate: String,
    pub source_row: String,
    pub source_column: String,

    pub target_concentration: Decimal,
    pub adapter_volume: Decimal,
    pub water_volume: Decimal,
    pub final_concentration: Decimal,
}

/// One destination plate's worth of samples, grouped upstream.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct DestinationPlate {
    pub barcode: String,
    /// Declared well count of the physical plate; 96 or 384.
    pub well_count: u16,
    pub samples: Vec<SampleAllocationTarget>,
}

impl DestinationPlate {
    pub fn plate_size(&self) -> Result<PlateSize, GeometryError> {
        PlateSize::from_well_count(self.well_count)
    }
}

#[cfg(test)]
impl Default for SampleAllocationTarget {
    fn default() -> Self {
        Self {
            sample_id: "SAMPLE-1".to_string(),
            well: WellId::from_raw_str("A1"),
            recipe: "Whole Genome Sequencing".to_string(),
            category: SampleCategory::Dna,
            species: None,
            sample_type: "gDNA".to_string(),
            initial_input_amount: Some(Decimal::new(100, 0)),
            assignment: None,
        }
    }
}
