use std::fmt::{Display, Formatter};
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Error};
use csv::QuoteStyle;
use inventory::record::InventoryRecord;
use thiserror::Error as ThisError;
use tracing::trace;
use tracing::{info, Level};

use crate::csv::InventoryRowRecord;

#[tracing::instrument(level = Level::DEBUG)]
pub fn load_records(source: &InventorySource) -> Result<Vec<InventoryRecord>, Error> {
    info!("Loading inventory. source: '{}'", source);

    let inventory_path_buf = PathBuf::from(source.to_string());
    let inventory_path = inventory_path_buf.as_path();
    let mut csv_reader = csv::ReaderBuilder::new()
        .from_path(inventory_path)
        .with_context(|| format!("Error reading inventory. file: {}", inventory_path.display()))?;

    let mut records: Vec<InventoryRecord> = vec![];

    for result in csv_reader.deserialize() {
        let record: InventoryRowRecord = result.with_context(|| "Deserializing inventory record".to_string())?;

        trace!("{:?}", record);

        let inventory_record = record
            .build_record()
            .with_context(|| format!("Building inventory record from record. record: {:?}", record))?;

        records.push(inventory_record);
    }
    Ok(records)
}

pub fn store_records(source: &InventorySource, records: &[InventoryRecord]) -> Result<(), Error> {
    info!("Storing inventory. source: '{}'", source);

    let output_path = PathBuf::from(source.to_string());

    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(output_path)?;

    for record in records {
        writer.serialize(InventoryRowRecord::from_record(record))?;
    }

    writer.flush()?;

    Ok(())
}

pub fn ensure_inventory(source: &InventorySource) -> anyhow::Result<()> {
    let inventory_path_buf = PathBuf::from(source.to_string());
    let inventory_path = inventory_path_buf.as_path();
    if !inventory_path.exists() {
        File::create(inventory_path)?;
        info!("Created inventory. source: '{}'", source);
    }

    Ok(())
}

#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash
)]
pub struct InventorySource(String);

impl FromStr for InventorySource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(InventorySource(s.to_string()))
    }
}

impl Display for InventorySource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[derive(ThisError, Debug)]
pub enum InventoryOperationError {
    #[error("Unable to load inventory. source: {inventory_source}, error: {reason}")]
    UnableToLoadRecords {
        inventory_source: InventorySource,
        reason: anyhow::Error,
    },

    #[error("Unable to store inventory. source: {inventory_source}, error: {reason}")]
    UnableToStoreRecords {
        inventory_source: InventorySource,
        reason: anyhow::Error,
    },

    #[error("Inventory operation error. source: {inventory_source}, error: {reason}")]
    OperationError {
        inventory_source: InventorySource,
        reason: anyhow::Error,
    },
}

/// Read-modify-write over the whole inventory; the store is only rewritten when the
/// operation succeeds.
pub fn perform_inventory_operation<F, R, E>(source: &InventorySource, mut f: F) -> Result<R, InventoryOperationError>
where
    F: FnMut(&mut Vec<InventoryRecord>) -> Result<R, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut records = load_records(source).map_err(|err| InventoryOperationError::UnableToLoadRecords {
        inventory_source: source.clone(),
        reason: err,
    })?;

    let result = f(&mut records).map_err(|err| InventoryOperationError::OperationError {
        inventory_source: source.clone(),
        reason: err.into(),
    })?;

    store_records(source, &records).map_err(|err| InventoryOperationError::UnableToStoreRecords {
        inventory_source: source.clone(),
        reason: err,
    })?;

    Ok(result)
}
