use inventory::record::InventoryRecord;
use plate::geometry::PlateSize;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

use crate::category::SampleCategory;
use crate::volumes::DilutionPlan;

/// Reconciliation retires only the single well it drew from, and at a lower threshold than
/// the engine's column cascade. Deliberately distinct constants.
pub const SINGLE_WELL_DEPLETION_THRESHOLD: Decimal = dec!(10.0);

/// An (index, sample) pairing made outside the engine, e.g. hand-pipetted by an operator.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ManualAssignment {
    pub sample_id: String,
    pub index_id: String,
    pub index_tag: String,
    pub category: SampleCategory,
    pub input_mass: Option<Decimal>,
}

/// One reconciled pairing with the recomputed dilution numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledAssignment {
    pub sample_id: String,
    pub index_id: String,
    pub source_plate: String,
    pub plan: DilutionPlan,
}

#[derive(Debug, Default, PartialEq)]
pub struct ReconciliationReport {
    pub reconciled: Vec<ReconciledAssignment>,
    /// Pairs with no matching active inventory record. Reported, never fatal.
    pub unmatched: Vec<ManualAssignment>,
}

/// Applies externally-made index assignments back onto the inventory.
///
/// For each pair the matching active record is found by (index id, index tag), the dilution
/// is recomputed from the sample's actual input mass and the drawn volume is decremented.
pub fn reconcile(
    assignments: &[ManualAssignment],
    plate_size: PlateSize,
    records: &mut [InventoryRecord],
) -> ReconciliationReport {
    let mut report = ReconciliationReport::default();

    for assignment in assignments {
        let record = records.iter_mut().find(|record| {
            record.is_active
                && !record.is_depleted
                && record.index_id.eq(&assignment.index_id)
                && record.index_tag.eq(&assignment.index_tag)
        });

        let record = match record {
            Some(record) => record,
            None => {
                warn!(
                    "No matching active inventory record. sample: '{}', index_id: '{}', index_tag: '{}'",
                    assignment.sample_id, assignment.index_id, assignment.index_tag
                );
                report.unmatched.push(assignment.clone());
                continue;
            }
        };

        let input_mass = assignment.input_mass.unwrap_or(Decimal::ZERO);
        let plan = DilutionPlan::compute(record.concentration, input_mass, plate_size, &assignment.category);

        record.consume(plan.adapter_volume);

        if record.remaining_volume <= SINGLE_WELL_DEPLETION_THRESHOLD {
            info!(
                "Source well depleted by reconciliation. plate: '{}', well: '{}', remaining: {}",
                record.plate_id, record.well, record.remaining_volume
            );
            record.retire();
        }

        report.reconciled.push(ReconciledAssignment {
            sample_id: assignment.sample_id.clone(),
            index_id: assignment.index_id.clone(),
            source_plate: record.plate_id.clone(),
            plan,
        });
    }

    info!(
        "Reconciled manual assignments. reconciled: {}, unmatched: {}",
        report.reconciled.len(),
        report.unmatched.len()
    );

    report
}

#[cfg(test)]
mod reconcile_tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn build_record(index_id: &str, index_tag: &str, remaining_volume: Decimal) -> InventoryRecord {
        InventoryRecord {
            index_id: index_id.to_string(),
            index_tag: index_tag.to_string(),
            is_active: true,
            remaining_volume,
            ..InventoryRecord::default()
        }
    }

    #[test]
    fn reconciles_a_matching_pair_and_decrements_volume() {
        // given
        let mut records = vec![build_record("D701", "ATTACTCG", dec!(100.00))];
        let assignments = vec![ManualAssignment {
            sample_id: "SAMPLE-1".to_string(),
            index_id: "D701".to_string(),
            index_tag: "ATTACTCG".to_string(),
            category: SampleCategory::Dna,
            input_mass: Some(dec!(100)),
        }];

        // when
        let report = reconcile(&assignments, PlateSize::Plate96, &mut records);

        // then - adapter volume 2.00 drawn from the well
        assert_eq!(report.reconciled.len(), 1);
        assert_eq!(report.reconciled[0].plan.adapter_volume, dec!(2.00));
        assert_eq!(records[0].remaining_volume, dec!(98.00));
        assert!(!records[0].is_depleted);
    }

    #[test]
    fn depletes_only_the_single_well_at_the_lower_threshold() {
        // given - two wells of the same column; one barely above the threshold
        let mut records = vec![
            build_record("D701", "ATTACTCG", dec!(11.00)),
            build_record("D702", "TCCGGAGA", dec!(600.00)),
        ];
        let assignments = vec![ManualAssignment {
            sample_id: "SAMPLE-1".to_string(),
            index_id: "D701".to_string(),
            index_tag: "ATTACTCG".to_string(),
            category: SampleCategory::Dna,
            input_mass: Some(dec!(100)),
        }];

        // when
        let report = reconcile(&assignments, PlateSize::Plate96, &mut records);

        // then - 11.00 - 2.00 = 9.00 <= 10.0 retires the drawn well only
        assert_eq!(report.unmatched.len(), 0);
        assert!(records[0].is_depleted);
        assert!(!records[0].is_active);
        assert!(records[1].is_active);
    }

    #[test]
    fn unmatched_pairs_are_reported_not_fatal() {
        // given
        let mut records = vec![build_record("D701", "ATTACTCG", dec!(100.00))];
        let assignments = vec![
            ManualAssignment {
                sample_id: "SAMPLE-1".to_string(),
                index_id: "D799".to_string(),
                index_tag: "GGGGGGGG".to_string(),
                category: SampleCategory::Dna,
                input_mass: Some(dec!(100)),
            },
            ManualAssignment {
                sample_id: "SAMPLE-2".to_string(),
                index_id: "D701".to_string(),
                index_tag: "ATTACTCG".to_string(),
                category: SampleCategory::Dna,
                input_mass: Some(dec!(100)),
            },
        ];

        // when
        let report = reconcile(&assignments, PlateSize::Plate96, &mut records);

        // then
        assert_eq!(report.unmatched.len(), 1);
        assert_eq!(report.unmatched[0].sample_id, "SAMPLE-1");
        assert_eq!(report.reconciled.len(), 1);
    }

    #[test]
    fn rna_assignment_uses_the_fixed_adapter_volume() {
        // given
        let mut records = vec![build_record("D701", "ATTACTCG", dec!(100.00))];
        let assignments = vec![ManualAssignment {
            sample_id: "SAMPLE-1".to_string(),
            index_id: "D701".to_string(),
            index_tag: "ATTACTCG".to_string(),
            category: SampleCategory::Rna,
            input_mass: None,
        }];

        // when
        let report = reconcile(&assignments, PlateSize::Plate96, &mut records);

        // then
        assert_eq!(report.reconciled[0].plan.adapter_volume, dec!(5.00));
        assert_eq!(report.reconciled[0].plan.water_volume, dec!(0.00));
        assert_eq!(records[0].remaining_volume, dec!(95.00));
    }
}
