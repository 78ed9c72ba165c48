use std::path::Path;

use allocation::reconcile::ManualAssignment;
use anyhow::{Context, Error};
use tracing::trace;
use tracing::{info, Level};

use crate::csv::ManualAssignmentRecord;

#[tracing::instrument(level = Level::DEBUG)]
pub fn load_manual_assignments(path: &Path) -> Result<Vec<ManualAssignment>, Error> {
    info!("Loading manual assignments. file: {}", path.display());

    let mut csv_reader = csv::ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Error reading manual assignments. file: {}", path.display()))?;

    let mut assignments: Vec<ManualAssignment> = vec![];

    for result in csv_reader.deserialize() {
        let record: ManualAssignmentRecord =
            result.with_context(|| "Deserializing manual assignment record".to_string())?;

        trace!("{:?}", record);

        assignments.push(record.build_manual_assignment());
    }
    Ok(assignments)
}
