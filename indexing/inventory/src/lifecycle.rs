use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::record::{IndexType, InventoryRecord, SetId, SET_CAPACITY};

#[derive(Debug, PartialEq)]
pub struct ActivationReport {
    pub index_type: IndexType,
    pub set_id: SetId,
    pub activated: usize,
    pub superseded: usize,
}

#[derive(Error, Debug, PartialEq)]
pub enum LifecycleError {
    #[error("Unknown plate; no inventory records exist for the barcode. plate: '{0}'")]
    UnknownPlate(String),

    #[error("Cannot reactivate a depleted plate. plate: '{plate_id}', well: '{well}'")]
    PlateDepleted { plate_id: String, well: String },

    #[error("Plate is already active. plate: '{plate_id}', well: '{well}'")]
    PlateAlreadyActive { plate_id: String, well: String },

    #[error("Plate exceeds set capacity. plate: '{plate_id}', records: {count}, capacity: {SET_CAPACITY}")]
    CapacityExceeded { plate_id: String, count: usize },

    #[error("Active records for set would exceed capacity. index_type: '{index_type}', set_id: {set_id}, active: {active}, capacity: {SET_CAPACITY}")]
    SetCapacityExceeded {
        index_type: IndexType,
        set_id: SetId,
        active: usize,
    },
}

/// Activates a newly received adapter plate, superseding the previously active plate of the
/// same (index type, set id).
///
/// Either the whole batch of mutations commits or none does: all validation happens before
/// any record is touched.
pub fn activate_plate(plate_barcode: &str, records: &mut [InventoryRecord]) -> Result<ActivationReport, LifecycleError> {
    let template = records
        .iter()
        .find(|record| record.plate_id.eq(plate_barcode))
        .ok_or_else(|| LifecycleError::UnknownPlate(plate_barcode.to_string()))?;

    let index_type = template.index_type.clone();
    let set_id = template.set_id;

    debug!(
        "Activating plate. plate: '{}', index_type: '{}', set_id: {}",
        plate_barcode, index_type, set_id
    );

    let mut on_plate_count = 0;
    for record in records
        .iter()
        .filter(|record| record.plate_id.eq(plate_barcode))
    {
        if record.is_depleted {
            return Err(LifecycleError::PlateDepleted {
                plate_id: record.plate_id.clone(),
                well: record.well.to_string(),
            });
        }
        if record.is_active {
            return Err(LifecycleError::PlateAlreadyActive {
                plate_id: record.plate_id.clone(),
                well: record.well.to_string(),
            });
        }
        on_plate_count += 1;
    }

    if on_plate_count > SET_CAPACITY {
        return Err(LifecycleError::CapacityExceeded {
            plate_id: plate_barcode.to_string(),
            count: on_plate_count,
        });
    }

    // Prospective active counts per (index type, set id) once the activation is applied;
    // records of the superseded generation all become inactive.
    let mut active_counts: IndexMap<(IndexType, SetId), usize> = IndexMap::new();
    for record in records.iter() {
        let key = (record.index_type.clone(), record.set_id);
        let will_be_active = if record.is_in_set(&index_type, set_id) {
            record.plate_id.eq(plate_barcode)
        } else {
            record.is_active
        };
        if will_be_active {
            *active_counts.entry(key).or_insert(0) += 1;
        }
    }

    for ((group_index_type, group_set_id), active) in active_counts {
        if active > SET_CAPACITY {
            return Err(LifecycleError::SetCapacityExceeded {
                index_type: group_index_type,
                set_id: group_set_id,
                active,
            });
        }
    }

    let mut activated = 0;
    let mut superseded = 0;

    for record in records
        .iter_mut()
        .filter(|record| record.is_in_set(&index_type, set_id))
    {
        if record.plate_id.eq(plate_barcode) {
            record.is_active = true;
            activated += 1;
        } else if !record.is_depleted {
            record.retire();
            superseded += 1;
        }
    }

    info!(
        "Activated plate. plate: '{}', index_type: '{}', set_id: {}, activated: {}, superseded: {}",
        plate_barcode, index_type, set_id, activated, superseded
    );

    Ok(ActivationReport {
        index_type,
        set_id,
        activated,
        superseded,
    })
}
