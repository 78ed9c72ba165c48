use std::path::Path;

use anyhow::{Context, Error};
use inventory::import::ImportRow;
use tracing::trace;
use tracing::{info, Level};

use crate::csv::ImportRowRecord;

#[tracing::instrument(level = Level::DEBUG)]
pub fn load_import_rows(path: &Path) -> Result<Vec<ImportRow>, Error> {
    info!("Loading import batch. file: {}", path.display());

    let mut csv_reader = csv::ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Error reading import batch. file: {}", path.display()))?;

    let mut rows: Vec<ImportRow> = vec![];

    for result in csv_reader.deserialize() {
        let record: ImportRowRecord = result.with_context(|| "Deserializing import batch record".to_string())?;

        trace!("{:?}", record);

        let row = record
            .build_import_row()
            .with_context(|| format!("Building import row from record. record: {:?}", record))?;

        rows.push(row);
    }
    Ok(rows)
}
