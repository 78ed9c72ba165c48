//! Reagent volume calculator.
//!
//! The constants below are business-domain values from the wet-lab dilution protocol;
//! they must be reproduced exactly.

use plate::geometry::PlateSize;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::category::SampleCategory;

pub const RNA_TARGET_CONCENTRATION: Decimal = dec!(15.00);
pub const RNA_ADAPTER_VOLUME: Decimal = dec!(5.00);
pub const AMPLICON_ADAPTER_VOLUME: Decimal = dec!(4.00);
pub const MIN_ADAPTER_PIPETTE_VOLUME: Decimal = dec!(2.00);

/// Minimum adapter volume the liquid handler draws for the destination plate geometry. µl.
pub fn min_adapter_volume(plate_size: PlateSize) -> Decimal {
    match plate_size {
        PlateSize::Plate96 => dec!(7.50),
        PlateSize::Plate384 => dec!(3.00),
    }
}

/// Maximum working volume of a destination well. µl.
pub fn max_well_volume(plate_size: PlateSize) -> Decimal {
    match plate_size {
        PlateSize::Plate96 => dec!(150.00),
        PlateSize::Plate384 => dec!(40.00),
    }
}

/// Target adapter concentration after dilution, from the sample's declared input mass. ng/µl.
pub fn target_concentration(input_mass: Decimal, plate_size: PlateSize, category: &SampleCategory) -> Decimal {
    if category.is_rna_family() {
        return RNA_TARGET_CONCENTRATION;
    }

    match plate_size {
        PlateSize::Plate96 if input_mass < dec!(50) => RNA_TARGET_CONCENTRATION * input_mass / dec!(50),
        PlateSize::Plate384 if input_mass < dec!(20) => RNA_TARGET_CONCENTRATION * input_mass / dec!(20),
        _ => RNA_TARGET_CONCENTRATION,
    }
}

/// Adapter volume to draw from the source well. µl.
pub fn adapter_volume(
    start_concentration: Decimal,
    min_volume: Decimal,
    target_concentration: Decimal,
    category: &SampleCategory,
) -> Decimal {
    if category.is_rna_family() {
        return RNA_ADAPTER_VOLUME;
    }
    if category.is_special_protocol() {
        return AMPLICON_ADAPTER_VOLUME;
    }

    let scaled = scaled_adapter_volume(start_concentration, min_volume, target_concentration);
    scaled.max(MIN_ADAPTER_PIPETTE_VOLUME)
}

/// Water volume to dilute with. µl.
pub fn water_volume(
    start_concentration: Decimal,
    min_volume: Decimal,
    target_concentration: Decimal,
    max_volume: Decimal,
    category: &SampleCategory,
) -> Decimal {
    if category.is_rna_family() || category.is_special_protocol() {
        return Decimal::ZERO;
    }
    // a zero target concentration comes from a blank input mass; the engine has already
    // warned, avoid dividing by it
    if target_concentration.is_zero() {
        return Decimal::ZERO;
    }

    let scaled = scaled_adapter_volume(start_concentration, min_volume, target_concentration);
    if scaled >= MIN_ADAPTER_PIPETTE_VOLUME {
        min_volume - scaled
    } else {
        let water = (dec!(2) * start_concentration / target_concentration) - MIN_ADAPTER_PIPETTE_VOLUME;
        water.min(max_volume - MIN_ADAPTER_PIPETTE_VOLUME)
    }
}

/// Adapter concentration actually achieved after the dilution. ng/µl.
pub fn final_concentration(start_concentration: Decimal, water_volume: Decimal, adapter_volume: Decimal) -> Decimal {
    start_concentration / ((water_volume + adapter_volume) / adapter_volume)
}

fn scaled_adapter_volume(start_concentration: Decimal, min_volume: Decimal, target_concentration: Decimal) -> Decimal {
    // import validation keeps source concentrations positive; guard anyway
    if start_concentration.is_zero() {
        return Decimal::ZERO;
    }
    target_concentration * min_volume / start_concentration
}

/// The per-sample dilution numbers written onto a sample when an adapter is assigned.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DilutionPlan {
    pub target_concentration: Decimal,
    pub adapter_volume: Decimal,
    pub water_volume: Decimal,
    pub final_concentration: Decimal,
}

impl DilutionPlan {
    /// Computes the full dilution for one sample, rounded to 2 decimal places.
    pub fn compute(
        start_concentration: Decimal,
        input_mass: Decimal,
        plate_size: PlateSize,
        category: &SampleCategory,
    ) -> Self {
        let target = target_concentration(input_mass, plate_size, category);
        let min_volume = min_adapter_volume(plate_size);
        let max_volume = max_well_volume(plate_size);

        let adapter = adapter_volume(start_concentration, min_volume, target, category).round_dp(2);
        let water = water_volume(start_concentration, min_volume, target, max_volume, category)
            .round_dp(2)
            .max(Decimal::ZERO);
        let achieved = final_concentration(start_concentration, water, adapter).round_dp(2);

        Self {
            target_concentration: target.round_dp(2),
            adapter_volume: adapter,
            water_volume: water,
            final_concentration: achieved,
        }
    }
}
