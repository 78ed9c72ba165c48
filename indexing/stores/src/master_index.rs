use std::path::Path;

use anyhow::{Context, Error};
use inventory::import::MasterIndexReference;
use tracing::trace;
use tracing::{info, Level};

use crate::csv::MasterIndexRecord;

#[tracing::instrument(level = Level::DEBUG)]
pub fn load_master_index(path: &Path) -> Result<MasterIndexReference, Error> {
    info!("Loading master index. file: {}", path.display());

    let mut csv_reader = csv::ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Error reading master index. file: {}", path.display()))?;

    let mut entries: Vec<(String, String)> = vec![];

    for result in csv_reader.deserialize() {
        let record: MasterIndexRecord = result.with_context(|| "Deserializing master index record".to_string())?;

        trace!("{:?}", record);

        entries.push(record.build_entry());
    }

    Ok(MasterIndexReference::new(entries))
}
