use std::collections::BTreeSet;

use plate::well::WellId;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, trace};

use crate::record::{IndexType, InventoryRecord, SetId};

/// One row of an external batch description for newly received inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub plate_barcode: String,
    pub index_id: String,
    pub index_tag: String,
    pub well: WellId,
    pub concentration: Decimal,
    pub volume: Decimal,
    pub index_type: IndexType,
    pub set_id: SetId,
}

/// Externally-maintained read-only table of valid (index id, index tag) pairs.
#[derive(Debug, Default)]
pub struct MasterIndexReference {
    entries: BTreeSet<(String, String)>,
}

impl MasterIndexReference {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn contains(&self, index_id: &str, index_tag: &str) -> bool {
        self.entries
            .contains(&(index_id.to_string(), index_tag.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ImportError {
    #[error("Empty import batch")]
    EmptyBatch,

    #[error("Plate barcode already registered; rejecting the batch. plate: '{0}'")]
    DuplicateBarcode(String),

    #[error("Index is not in the master index reference. row: {row}, index_id: '{index_id}', index_tag: '{index_tag}'")]
    UnknownIndex {
        row: usize,
        index_id: String,
        index_tag: String,
    },

    #[error("Blank required field. row: {row}, field: '{field}'")]
    BlankField { row: usize, field: &'static str },

    #[error("Quantity must be greater than zero. row: {row}, field: '{field}', value: {value}")]
    NonPositiveQuantity {
        row: usize,
        field: &'static str,
        value: Decimal,
    },
}

/// Validates and builds inventory records for a batch of newly received adapter plates.
///
/// Validation short-circuits on the first failure and never partially registers a batch;
/// rows are numbered from 1 in errors so the operator can correct the source data.
pub fn import_inventory(
    rows: &[ImportRow],
    master: &MasterIndexReference,
    existing: &[InventoryRecord],
) -> Result<Vec<InventoryRecord>, ImportError> {
    if rows.is_empty() {
        return Err(ImportError::EmptyBatch);
    }

    let known_barcodes: BTreeSet<&str> = existing
        .iter()
        .map(|record| record.plate_id.as_str())
        .collect();

    for row in rows.iter() {
        if known_barcodes.contains(row.plate_barcode.as_str()) {
            return Err(ImportError::DuplicateBarcode(row.plate_barcode.clone()));
        }
    }

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;

        for (field, value) in [
            ("PlateBarcode", &row.plate_barcode),
            ("IndexId", &row.index_id),
            ("IndexTag", &row.index_tag),
        ] {
            if value.trim().is_empty() {
                return Err(ImportError::BlankField {
                    row: row_number,
                    field,
                });
            }
        }

        for (field, value) in [("Concentration", row.concentration), ("Volume", row.volume)] {
            if value <= Decimal::ZERO {
                return Err(ImportError::NonPositiveQuantity {
                    row: row_number,
                    field,
                    value,
                });
            }
        }

        if !master.contains(&row.index_id, &row.index_tag) {
            return Err(ImportError::UnknownIndex {
                row: row_number,
                index_id: row.index_id.clone(),
                index_tag: row.index_tag.clone(),
            });
        }
    }

    let records = rows
        .iter()
        .map(|row| {
            let record = InventoryRecord {
                plate_id: row.plate_barcode.clone(),
                well: row.well,
                index_id: row.index_id.clone(),
                index_tag: row.index_tag.clone(),
                index_type: row.index_type.clone(),
                set_id: row.set_id,
                concentration: row.concentration,
                remaining_volume: row.volume,
                is_active: false,
                is_depleted: false,
                last_used: false,
            };
            trace!("Built inventory record. record: {:?}", record);
            record
        })
        .collect::<Vec<_>>();

    info!(
        "Imported inventory batch. plates: {:?}, records: {}",
        rows.iter()
            .map(|row| row.plate_barcode.as_str())
            .collect::<BTreeSet<_>>(),
        records.len()
    );

    Ok(records)
}

#[cfg(test)]
mod import_tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn build_rows(plate_barcode: &str, count: usize) -> Vec<ImportRow> {
        (0..count)
            .map(|index| {
                let row_index = (index % 8) as u8 + 1;
                let column = (index / 8) as u8 + 1;
                ImportRow {
                    plate_barcode: plate_barcode.to_string(),
                    index_id: format!("D{:03}", index),
                    index_tag: format!("TAG{:03}", index),
                    well: WellId::try_from_row_index_and_column(row_index, column).unwrap(),
                    concentration: dec!(100.0),
                    volume: dec!(60.0),
                    index_type: IndexType::from_raw_str("dual_index"),
                    set_id: 1,
                }
            })
            .collect()
    }

    fn build_master(rows: &[ImportRow]) -> MasterIndexReference {
        MasterIndexReference::new(
            rows.iter()
                .map(|row| (row.index_id.clone(), row.index_tag.clone())),
        )
    }

    #[test]
    fn import_full_plate() {
        // given
        let rows = build_rows("PLATE-NEW", 96);
        let master = build_master(&rows);

        // when
        let records = import_inventory(&rows, &master, &[]).expect("ok");

        // then
        assert_eq!(records.len(), 96);
        assert!(records
            .iter()
            .all(|record| !record.is_active && !record.is_depleted && !record.last_used));
    }

    #[test]
    fn empty_batch() {
        // expect
        assert_eq!(
            import_inventory(&[], &MasterIndexReference::default(), &[]),
            Err(ImportError::EmptyBatch)
        );
    }

    #[test]
    fn duplicate_barcode_rejects_the_batch() {
        // given
        let rows = build_rows("PLATE-KNOWN", 8);
        let master = build_master(&rows);

        // and - the barcode already exists in inventory
        let existing = import_inventory(&rows, &master, &[]).expect("ok");

        // when
        let result = import_inventory(&rows, &master, &existing);

        // then
        assert_eq!(result, Err(ImportError::DuplicateBarcode("PLATE-KNOWN".to_string())));
    }

    #[test]
    fn unmatched_master_index_names_the_row() {
        // given
        let rows = build_rows("PLATE-NEW", 3);
        let mut master_rows = rows.clone();
        master_rows.remove(1);
        let master = build_master(&master_rows);

        // when
        let result = import_inventory(&rows, &master, &[]);

        // then
        assert_eq!(
            result,
            Err(ImportError::UnknownIndex {
                row: 2,
                index_id: "D001".to_string(),
                index_tag: "TAG001".to_string(),
            })
        );
    }

    #[test]
    fn blank_index_id_is_rejected() {
        // given
        let mut rows = build_rows("PLATE-NEW", 2);
        rows[1].index_id = "  ".to_string();
        let master = build_master(&rows);

        // expect
        assert_eq!(
            import_inventory(&rows, &master, &[]),
            Err(ImportError::BlankField {
                row: 2,
                field: "IndexId",
            })
        );
    }

    #[test]
    fn non_positive_volume_is_rejected() {
        // given
        let mut rows = build_rows("PLATE-NEW", 1);
        rows[0].volume = Decimal::ZERO;
        let master = build_master(&rows);

        // expect
        assert_eq!(
            import_inventory(&rows, &master, &[]),
            Err(ImportError::NonPositiveQuantity {
                row: 1,
                field: "Volume",
                value: Decimal::ZERO,
            })
        );
    }
}
