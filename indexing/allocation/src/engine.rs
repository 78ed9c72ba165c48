use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use inventory::record::{IndexType, InventoryRecord, SetId};
use lexical_sort::natural_lexical_cmp;
use plate::geometry::{column_major_ordering, quadrant_split, GeometryError, PlateSize};
use plate::well::WellId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::category::SampleCategory;
use crate::cursor::AllocationCursor;
use crate::sample::{DestinationPlate, IndexAssignment};
use crate::volumes::DilutionPlan;

/// Once a source well's remaining volume crosses this threshold the whole source-plate
/// column is retired: the same physical pipetting event draws from the whole column.
pub const COLUMN_DEPLETION_THRESHOLD: Decimal = dec!(20.0);

/// The set reserved for amplicon/CRISPR/single-cell-CNV samples ("plate 5" by lab convention).
pub const RESERVED_SET_ID: SetId = 5;

/// The only index type the reserved set carries.
pub fn dual_index_type() -> IndexType {
    IndexType::from_raw_str("dual_index")
}

/// What the operator asked to allocate from; index types may be given as a set when more
/// than one is acceptable.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRequest {
    pub acceptable_types: Vec<IndexType>,
}

/// Explicit run state per destination plate, logged at each transition.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum AllocationRunStatus {
    Idle,
    EligibilitySelected,
    Ordered,
    Assigning,
    Committed,
    Failed,
}

impl Display for AllocationRunStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationRunStatus::Idle => f.write_str("Idle"),
            AllocationRunStatus::EligibilitySelected => f.write_str("EligibilitySelected"),
            AllocationRunStatus::Ordered => f.write_str("Ordered"),
            AllocationRunStatus::Assigning => f.write_str("Assigning"),
            AllocationRunStatus::Committed => f.write_str("Committed"),
            AllocationRunStatus::Failed => f.write_str("Failed"),
        }
    }
}

/// Non-fatal per-sample issues; logged and surfaced, the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationWarning {
    MissingInputMass { sample_id: String, well: WellId },
}

impl Display for AllocationWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationWarning::MissingInputMass {
                sample_id,
                well,
            } => {
                write!(
                    f,
                    "Missing input mass, treated as zero. sample: '{}', well: '{}'",
                    sample_id, well
                )
            }
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum AllocationError {
    #[error("No eligible inventory for the request. acceptable_types: {acceptable_types:?}, plate: '{plate_barcode}'")]
    NoEligibleInventory {
        acceptable_types: Vec<IndexType>,
        plate_barcode: String,
    },

    #[error("Reserved-adapter samples require the dual index type. plate: '{plate_barcode}', acceptable_types: {acceptable_types:?}")]
    ReservedRequiresDualIndex {
        acceptable_types: Vec<IndexType>,
        plate_barcode: String,
    },

    #[error("Destination plate has no samples. plate: '{0}'")]
    EmptyPlate(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// The outcome of allocating one destination plate.
#[derive(Debug, PartialEq)]
pub struct PlateAllocationReport {
    pub plate_barcode: String,
    pub status: AllocationRunStatus,
    pub assigned: usize,
    /// Distinct source plate barcodes consumed from, for the operator to retrieve.
    pub source_plates: BTreeSet<String>,
    pub warnings: Vec<AllocationWarning>,
}

/// The outcome of a whole multi-plate run.
#[derive(Debug, Default, PartialEq)]
pub struct AllocationReport {
    pub plates: Vec<PlateAllocationReport>,
    pub source_plates: BTreeSet<String>,
}

impl AllocationReport {
    pub fn assigned(&self) -> usize {
        self.plates
            .iter()
            .map(|plate| plate.assigned)
            .sum()
    }
}

/// Allocates adapters to every sample of one destination plate, consuming inventory.
///
/// Mutations to `records` and `plate` stand once the function returns `Ok`; the caller owns
/// the commit boundary (one transaction per physical plate).
pub fn allocate_plate(
    plate: &mut DestinationPlate,
    records: &mut [InventoryRecord],
    request: &AllocationRequest,
) -> Result<PlateAllocationReport, AllocationError> {
    let mut status = AllocationRunStatus::Idle;
    debug!("Allocating plate. plate: '{}', status: {}", plate.barcode, status);

    if plate.samples.is_empty() {
        return Err(AllocationError::EmptyPlate(plate.barcode.clone()));
    }

    let plate_size = plate.plate_size()?;

    let eligible = select_eligible(records, request, plate)?;
    status = AllocationRunStatus::EligibilitySelected;
    debug!(
        "Selected eligible inventory. plate: '{}', eligible: {}, status: {}",
        plate.barcode,
        eligible.len(),
        status
    );

    let wells: Vec<WellId> = plate
        .samples
        .iter()
        .map(|sample| sample.well)
        .collect();

    // a 384-well destination is four interleaved 96-well quadrants, each an independent pass
    let passes: Vec<Vec<usize>> = match plate_size {
        PlateSize::Plate96 => vec![column_major_ordering(&wells)],
        PlateSize::Plate384 => quadrant_split(&wells)
            .into_iter()
            .filter(|quadrant| !quadrant.is_empty())
            .collect(),
    };
    status = AllocationRunStatus::Ordered;
    debug!(
        "Ordered samples. plate: '{}', passes: {}, status: {}",
        plate.barcode,
        passes.len(),
        status
    );

    let mut cursor = AllocationCursor::from_records(records, &eligible);
    status = AllocationRunStatus::Assigning;
    debug!("Assigning. plate: '{}', status: {}", plate.barcode, status);

    let mut assigned = 0;
    let mut source_plates = BTreeSet::new();
    let mut warnings = vec![];
    let mut last_consumed = None;

    for pass in passes {
        let start = cursor.starting_index(records, &eligible);
        let mut inventory_position = start;

        for sample_index in pass {
            let sample = &mut plate.samples[sample_index];

            let input_mass = match sample.initial_input_amount {
                Some(mass) => mass,
                None => {
                    let warning = AllocationWarning::MissingInputMass {
                        sample_id: sample.sample_id.clone(),
                        well: sample.well,
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                    Decimal::ZERO
                }
            };

            let record_index = eligible[inventory_position];
            let record = &mut records[record_index];

            let plan = DilutionPlan::compute(record.concentration, input_mass, plate_size, &sample.category);

            sample.assignment = Some(IndexAssignment {
                index_id: record.index_id.clone(),
                index_tag: record.index_tag.clone(),
                source_plate: record.plate_id.clone(),
                source_row: record.well.row_letter().to_string(),
                source_column: record.well.column().to_string(),
                target_concentration: plan.target_concentration,
                adapter_volume: plan.adapter_volume,
                water_volume: plan.water_volume,
                final_concentration: plan.final_concentration,
            });

            record.consume(plan.adapter_volume);
            source_plates.insert(record.plate_id.clone());
            assigned += 1;

            debug!(
                "Assigned adapter. sample: '{}', well: '{}', index_id: '{}', source: '{}' {}{}, remaining: {}",
                sample.sample_id,
                sample.well,
                record.index_id,
                record.plate_id,
                record.well.row_letter(),
                record.well.column(),
                record.remaining_volume
            );

            retire_column_when_low(records, record_index);

            last_consumed = Some(inventory_position);
            inventory_position = (inventory_position + 1) % eligible.len();
        }

        if let Some(position) = last_consumed {
            cursor = AllocationCursor::at(position);
        }
    }

    if let Some(position) = last_consumed {
        AllocationCursor::persist(records, &eligible, position);
    }

    status = AllocationRunStatus::Committed;
    info!(
        "Allocated plate. plate: '{}', assigned: {}, source_plates: {:?}, status: {}",
        plate.barcode, assigned, source_plates, status
    );

    Ok(PlateAllocationReport {
        plate_barcode: plate.barcode.clone(),
        status,
        assigned,
        source_plates,
        warnings,
    })
}

/// Allocates a whole batch, one destination plate at a time.
///
/// A failing plate aborts the run; plates already allocated stay allocated. Allocation is
/// at-least-once per plate, with no cross-plate transaction.
pub fn allocate_batch(
    plates: &mut [DestinationPlate],
    records: &mut [InventoryRecord],
    request: &AllocationRequest,
) -> Result<AllocationReport, AllocationError> {
    let mut report = AllocationReport::default();

    for plate in plates.iter_mut() {
        let plate_report = allocate_plate(plate, records, request)?;
        report
            .source_plates
            .extend(plate_report.source_plates.iter().cloned());
        report.plates.push(plate_report);
    }

    Ok(report)
}

/// Selects and orders the inventory eligible for one destination plate.
///
/// The list is ordered by (set id, source plate, column-major well) so that round-robin
/// consumption walks each source plate column by column.
fn select_eligible(
    records: &[InventoryRecord],
    request: &AllocationRequest,
    plate: &DestinationPlate,
) -> Result<Vec<usize>, AllocationError> {
    let reserved = plate
        .samples
        .iter()
        .any(|sample| sample.category.uses_reserved_adapters());

    let tcr = plate
        .samples
        .iter()
        .find_map(|sample| match &sample.category {
            SampleCategory::Tcr {
                species,
                chain,
            } => Some((*species, *chain)),
            _ => None,
        });

    if reserved
        && !request
            .acceptable_types
            .contains(&dual_index_type())
    {
        return Err(AllocationError::ReservedRequiresDualIndex {
            acceptable_types: request.acceptable_types.clone(),
            plate_barcode: plate.barcode.clone(),
        });
    }

    let mut eligible: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_index, record)| {
            if !record.is_active
                || !request
                    .acceptable_types
                    .contains(&record.index_type)
            {
                return false;
            }

            if reserved {
                // reserved-adapter samples draw only from the reserved dual-index set
                return record.set_id == RESERVED_SET_ID && record.index_type.eq(&dual_index_type());
            }

            // everything else must leave the reserved set alone
            if record.set_id == RESERVED_SET_ID {
                return false;
            }

            if let Some((species, chain)) = tcr {
                let index_type = record.index_type.to_string().to_lowercase();
                return index_type.contains(species.keyword()) && index_type.contains(chain.keyword());
            }

            true
        })
        .map(|(index, _record)| index)
        .collect();

    if eligible.is_empty() {
        return Err(AllocationError::NoEligibleInventory {
            acceptable_types: request.acceptable_types.clone(),
            plate_barcode: plate.barcode.clone(),
        });
    }

    eligible.sort_by(|&a, &b| {
        records[a]
            .set_id
            .cmp(&records[b].set_id)
            .then_with(|| natural_lexical_cmp(&records[a].plate_id, &records[b].plate_id))
            .then_with(|| records[a].well.cmp(&records[b].well))
    });

    Ok(eligible)
}

/// Retires the consumed record's whole source-plate column once it runs low.
fn retire_column_when_low(records: &mut [InventoryRecord], record_index: usize) {
    let record = &records[record_index];
    if record.is_depleted || record.remaining_volume > COLUMN_DEPLETION_THRESHOLD {
        return;
    }

    let plate_id = record.plate_id.clone();
    let set_id = record.set_id;
    let column = record.well.column();

    info!(
        "Source column depleted. plate: '{}', set_id: {}, column: {}, remaining: {}",
        plate_id, set_id, column, record.remaining_volume
    );

    for other in records.iter_mut().filter(|other| {
        other.plate_id.eq(&plate_id) && other.set_id == set_id && other.well.column() == column
    }) {
        other.retire();
    }
}
