use inventory::record::InventoryRecord;
use tracing::trace;

/// Round-robin continuation point within an ordered eligible inventory list.
///
/// The engine is stateless between invocations; the cursor is persisted as the `last_used`
/// flag on the inventory records and reconstructed from it at the start of each run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationCursor {
    position: Option<usize>,
}

impl AllocationCursor {
    pub fn at(position: usize) -> Self {
        Self {
            position: Some(position),
        }
    }

    /// Reconstructs the cursor from the `last_used` marker, if any record in the eligible
    /// list carries it.
    pub fn from_records(records: &[InventoryRecord], eligible: &[usize]) -> Self {
        let position = eligible
            .iter()
            .position(|&index| records[index].last_used);

        trace!("Reconstructed allocation cursor. position: {:?}", position);

        Self {
            position,
        }
    }

    /// The eligible-list index the next assignment pass starts at.
    ///
    /// One past the cursor, advanced to the next slot whose well row is 'A' so a new run
    /// resumes at a fresh source-plate column boundary; wraps to 0 at or past the end.
    pub fn starting_index(&self, records: &[InventoryRecord], eligible: &[usize]) -> usize {
        let position = match self.position {
            None => return 0,
            Some(position) => position,
        };

        let mut candidate = position + 1;
        while candidate < eligible.len() && records[eligible[candidate]].well.row_letter() != 'A' {
            candidate += 1;
        }

        if candidate >= eligible.len() {
            0
        } else {
            candidate
        }
    }

    /// Persists the cursor: the consumed slot becomes the sole `last_used` holder among the
    /// eligible records.
    pub fn persist(records: &mut [InventoryRecord], eligible: &[usize], consumed: usize) {
        for &index in eligible.iter() {
            records[index].last_used = false;
        }
        records[eligible[consumed]].last_used = true;
    }
}
