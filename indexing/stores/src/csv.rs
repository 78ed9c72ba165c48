use std::str::FromStr;

use allocation::category::{SampleCategory, Species};
use allocation::reconcile::ManualAssignment;
use allocation::sample::{IndexAssignment, SampleAllocationTarget};
use anyhow::Error;
use inventory::import::ImportRow;
use inventory::record::{IndexType, InventoryRecord, SetId};
use plate::well::WellId;
use rust_decimal::Decimal;

/// CSV representation of one inventory well.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryRowRecord {
    pub plate_id: String,
    pub well: String,
    pub index_id: String,
    pub index_tag: String,
    pub index_type: String,
    pub set_id: SetId,
    pub concentration: Decimal,
    pub remaining_volume: Decimal,
    pub is_active: bool,
    pub is_depleted: bool,
    pub last_used: bool,
}

impl InventoryRowRecord {
    pub fn build_record(&self) -> Result<InventoryRecord, Error> {
        Ok(InventoryRecord {
            plate_id: self.plate_id.clone(),
            well: WellId::from_str(&self.well)?,
            index_id: self.index_id.clone(),
            index_tag: self.index_tag.clone(),
            index_type: IndexType::from_str(&self.index_type)?,
            set_id: self.set_id,
            concentration: self.concentration,
            remaining_volume: self.remaining_volume,
            is_active: self.is_active,
            is_depleted: self.is_depleted,
            last_used: self.last_used,
        })
    }

    pub fn from_record(record: &InventoryRecord) -> Self {
        Self {
            plate_id: record.plate_id.clone(),
            well: record.well.to_string(),
            index_id: record.index_id.clone(),
            index_tag: record.index_tag.clone(),
            index_type: record.index_type.to_string(),
            set_id: record.set_id,
            concentration: record.concentration,
            remaining_volume: record.remaining_volume,
            is_active: record.is_active,
            is_depleted: record.is_depleted,
            last_used: record.last_used,
        }
    }
}

/// CSV representation of one row of a received-inventory batch.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportRowRecord {
    pub plate_barcode: String,
    pub well: String,
    pub index_id: String,
    pub index_tag: String,
    pub index_type: String,
    pub set_id: SetId,
    pub concentration: Decimal,
    pub volume: Decimal,
}

impl ImportRowRecord {
    pub fn build_import_row(&self) -> Result<ImportRow, Error> {
        Ok(ImportRow {
            plate_barcode: self.plate_barcode.clone(),
            index_id: self.index_id.clone(),
            index_tag: self.index_tag.clone(),
            well: WellId::from_str(&self.well)?,
            concentration: self.concentration,
            volume: self.volume,
            index_type: IndexType::from_str(&self.index_type)?,
            set_id: self.set_id,
        })
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MasterIndexRecord {
    pub index_id: String,
    pub index_tag: String,
}

impl MasterIndexRecord {
    pub fn build_entry(&self) -> (String, String) {
        (self.index_id.clone(), self.index_tag.clone())
    }
}

/// CSV representation of one sample on a destination plate.
///
/// The assignment columns are blank until the sample has an adapter allocated.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SampleRecord {
    pub sample_id: String,
    pub destination_plate: String,
    pub well_count: u16,
    pub row: String,
    pub column: u8,
    pub recipe: String,
    pub species: String,
    pub sample_type: String,
    pub input_mass: Option<Decimal>,

    pub index_id: Option<String>,
    pub index_tag: Option<String>,
    pub source_plate: Option<String>,
    pub source_row: Option<String>,
    pub source_column: Option<String>,
    pub target_concentration: Option<Decimal>,
    pub adapter_volume: Option<Decimal>,
    pub water_volume: Option<Decimal>,
    pub final_concentration: Option<Decimal>,
}

impl SampleRecord {
    /// Builds the sample, resolving the free-text recipe and species into a category once,
    /// here at ingestion.
    pub fn build_sample(&self) -> Result<(String, u16, SampleAllocationTarget), Error> {
        let well = WellId::from_str(&format!("{}{}", self.row.trim().to_uppercase(), self.column))?;

        let species = Species::from_free_text(&self.species);
        let category = SampleCategory::resolve(&self.recipe, species);

        let assignment = match (&self.index_id, &self.index_tag) {
            (Some(index_id), Some(index_tag)) => Some(IndexAssignment {
                index_id: index_id.clone(),
                index_tag: index_tag.clone(),
                source_plate: self.source_plate.clone().unwrap_or_default(),
                source_row: self.source_row.clone().unwrap_or_default(),
                source_column: self.source_column.clone().unwrap_or_default(),
                target_concentration: self.target_concentration.unwrap_or_default(),
                adapter_volume: self.adapter_volume.unwrap_or_default(),
                water_volume: self.water_volume.unwrap_or_default(),
                final_concentration: self.final_concentration.unwrap_or_default(),
            }),
            _ => None,
        };

        let sample = SampleAllocationTarget {
            sample_id: self.sample_id.clone(),
            well,
            recipe: self.recipe.clone(),
            category,
            species,
            sample_type: self.sample_type.clone(),
            initial_input_amount: self.input_mass,
            assignment,
        };

        Ok((self.destination_plate.clone(), self.well_count, sample))
    }

    pub fn from_sample(destination_plate: &str, well_count: u16, sample: &SampleAllocationTarget) -> Self {
        let assignment = sample.assignment.as_ref();

        Self {
            sample_id: sample.sample_id.clone(),
            destination_plate: destination_plate.to_string(),
            well_count,
            row: sample.well.row_letter().to_string(),
            column: sample.well.column(),
            recipe: sample.recipe.clone(),
            species: sample
                .species
                .map(|species| species.to_string())
                .unwrap_or_default(),
            sample_type: sample.sample_type.clone(),
            input_mass: sample.initial_input_amount,

            index_id: assignment.map(|assignment| assignment.index_id.clone()),
            index_tag: assignment.map(|assignment| assignment.index_tag.clone()),
            source_plate: assignment.map(|assignment| assignment.source_plate.clone()),
            source_row: assignment.map(|assignment| assignment.source_row.clone()),
            source_column: assignment.map(|assignment| assignment.source_column.clone()),
            target_concentration: assignment.map(|assignment| assignment.target_concentration),
            adapter_volume: assignment.map(|assignment| assignment.adapter_volume),
            water_volume: assignment.map(|assignment| assignment.water_volume),
            final_concentration: assignment.map(|assignment| assignment.final_concentration),
        }
    }
}

/// CSV representation of one externally-made (sample, index) pairing.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManualAssignmentRecord {
    pub sample_id: String,
    pub index_id: String,
    pub index_tag: String,
    pub recipe: String,
    pub species: String,
    pub input_mass: Option<Decimal>,
}

impl ManualAssignmentRecord {
    pub fn build_manual_assignment(&self) -> ManualAssignment {
        let species = Species::from_free_text(&self.species);

        ManualAssignment {
            sample_id: self.sample_id.clone(),
            index_id: self.index_id.clone(),
            index_tag: self.index_tag.clone(),
            category: SampleCategory::resolve(&self.recipe, species),
            input_mass: self.input_mass,
        }
    }
}
