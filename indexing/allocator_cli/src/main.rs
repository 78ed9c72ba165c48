use std::collections::BTreeSet;
use std::path::Path;

use allocation::engine::AllocationRequest;
use anyhow::Context;
use clap::Parser;
use inventory::import::{import_inventory, ImportError};
use inventory::lifecycle::activate_plate;
use inventory::record::IndexType;
use plate::geometry::PlateSize;
use stores::inventory::{perform_inventory_operation, InventorySource};
use tracing::info;

use crate::opts::{ModeCommand, Opts};

mod opts;

fn main() -> anyhow::Result<()> {
    let args = argfile::expand_args(argfile::parse_fromfile, argfile::PREFIX).unwrap();

    let opts = Opts::parse_from(args);

    cli::tracing::configure_tracing(opts.trace.clone(), opts.verbose.clone())?;

    match opts.command {
        ModeCommand::Import {
            inventory,
            batch,
            master_index,
        } => import(&inventory, &batch, &master_index),
        ModeCommand::Activate {
            inventory,
            plate,
        } => activate(&inventory, &plate),
        ModeCommand::Allocate {
            inventory,
            samples,
            index_type,
        } => allocate(&inventory, &samples, index_type.0),
        ModeCommand::Reconcile {
            inventory,
            assignments,
            plate_size,
        } => reconcile(&inventory, &assignments, plate_size.into()),
    }
}

fn import(source: &InventorySource, batch: &Path, master_index: &Path) -> anyhow::Result<()> {
    let rows = stores::import_batch::load_import_rows(batch)?;
    let master = stores::master_index::load_master_index(master_index)?;

    stores::inventory::ensure_inventory(source)?;

    let imported = perform_inventory_operation(source, |records| {
        let new_records = import_inventory(&rows, &master, records)?;
        let count = new_records.len();
        records.extend(new_records);
        Ok::<usize, ImportError>(count)
    })?;

    info!("Import complete. records: {}", imported);

    Ok(())
}

fn activate(source: &InventorySource, plate: &str) -> anyhow::Result<()> {
    let report = perform_inventory_operation(source, |records| activate_plate(plate, records))?;

    info!(
        "Activation complete. plate: '{}', index_type: '{}', set_id: {}, activated: {}, superseded: {}",
        plate, report.index_type, report.set_id, report.activated, report.superseded
    );

    Ok(())
}

fn allocate(source: &InventorySource, samples: &Path, acceptable_types: Vec<IndexType>) -> anyhow::Result<()> {
    let mut records = stores::inventory::load_records(source)?;
    let mut plates = stores::samples::load_sample_batch(samples)?;

    let request = AllocationRequest {
        acceptable_types,
    };

    // each destination plate is its own commit; a failure leaves earlier plates allocated
    let mut source_plates = BTreeSet::new();
    for index in 0..plates.len() {
        let report = {
            let plate = &mut plates[index];
            allocation::engine::allocate_plate(plate, &mut records, &request)
                .with_context(|| format!("Allocating plate. plate: '{}'", plate.barcode))?
        };

        stores::inventory::store_records(source, &records)?;
        stores::samples::store_sample_batch(samples, &plates)?;

        source_plates.extend(report.source_plates);
    }

    info!(
        "Allocation complete. plates: {}, source_plates: {:?}",
        plates.len(),
        source_plates
    );

    Ok(())
}

fn reconcile(source: &InventorySource, assignments: &Path, plate_size: PlateSize) -> anyhow::Result<()> {
    let assignments = stores::reconciliation::load_manual_assignments(assignments)?;

    let report = perform_inventory_operation(source, |records| {
        Ok::<_, std::convert::Infallible>(allocation::reconcile::reconcile(&assignments, plate_size, records))
    })?;

    info!(
        "Reconciliation complete. reconciled: {}, unmatched: {}",
        report.reconciled.len(),
        report.unmatched.len()
    );

    Ok(())
}
