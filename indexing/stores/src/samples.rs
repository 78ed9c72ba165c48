use std::path::Path;

use allocation::sample::DestinationPlate;
use anyhow::{Context, Error};
use csv::QuoteStyle;
use indexmap::IndexMap;
use thiserror::Error as ThisError;
use tracing::trace;
use tracing::{info, Level};

use crate::csv::SampleRecord;

#[derive(Debug, ThisError)]
pub enum SampleBatchError {
    #[error("Destination plate declared with inconsistent well counts. plate: '{plate}', well_counts: {first} and {second}")]
    InconsistentWellCount { plate: String, first: u16, second: u16 },
}

/// Loads a sample batch, grouped per destination plate in first-seen order.
#[tracing::instrument(level = Level::DEBUG)]
pub fn load_sample_batch(path: &Path) -> Result<Vec<DestinationPlate>, Error> {
    info!("Loading sample batch. file: {}", path.display());

    let mut csv_reader = csv::ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Error reading sample batch. file: {}", path.display()))?;

    let mut plates: IndexMap<String, DestinationPlate> = IndexMap::new();

    for result in csv_reader.deserialize() {
        let record: SampleRecord = result.with_context(|| "Deserializing sample record".to_string())?;

        trace!("{:?}", record);

        let (barcode, well_count, sample) = record
            .build_sample()
            .with_context(|| format!("Building sample from record. record: {:?}", record))?;

        let plate = plates
            .entry(barcode.clone())
            .or_insert_with(|| DestinationPlate {
                barcode: barcode.clone(),
                well_count,
                samples: vec![],
            });

        if plate.well_count != well_count {
            return Err(SampleBatchError::InconsistentWellCount {
                plate: barcode,
                first: plate.well_count,
                second: well_count,
            }
            .into());
        }

        plate.samples.push(sample);
    }

    Ok(plates.into_values().collect())
}

pub fn store_sample_batch(path: &Path, plates: &[DestinationPlate]) -> Result<(), Error> {
    info!("Storing sample batch. file: {}", path.display());

    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)?;

    for plate in plates {
        for sample in plate.samples.iter() {
            writer.serialize(SampleRecord::from_sample(&plate.barcode, plate.well_count, sample))?;
        }
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod sample_batch_tests {
    use allocation::category::{SampleCategory, Species, TcrChain};
    use indoc::indoc;
    use rust_decimal_macros::dec;

    use super::*;

    fn write_batch(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("samples.csv");
        std::fs::write(&path, content).expect("written");
        (temp_dir, path)
    }

    #[test]
    fn groups_rows_per_plate_and_resolves_categories_at_ingestion() {
        // given
        let (_temp_dir, path) = write_batch(indoc! {r#"
            "SampleId","DestinationPlate","WellCount","Row","Column","Recipe","Species","SampleType","InputMass","IndexId","IndexTag","SourcePlate","SourceRow","SourceColumn","TargetConcentration","AdapterVolume","WaterVolume","FinalConcentration"
            "SAMPLE-1","DEST-0001","96","A","1","Whole Genome Sequencing","Homo sapiens","gDNA","100.0","","","","","","","","",""
            "SAMPLE-2","DEST-0001","96","B","1","TCR alpha repertoire","Mouse","RNA","","","","","","","","","",""
            "SAMPLE-3","DEST-0002","384","A","1","Total RNA-Seq","Homo sapiens","RNA","50.0","","","","","","","","",""
        "#});

        // when
        let plates = load_sample_batch(&path).expect("loaded");

        // then
        assert_eq!(plates.len(), 2);
        assert_eq!(plates[0].barcode, "DEST-0001");
        assert_eq!(plates[0].well_count, 96);
        assert_eq!(plates[0].samples.len(), 2);
        assert_eq!(plates[0].samples[0].category, SampleCategory::Dna);
        assert_eq!(plates[0].samples[0].initial_input_amount, Some(dec!(100.0)));
        assert_eq!(plates[0].samples[1].category, SampleCategory::Tcr {
            species: Species::Mouse,
            chain: TcrChain::Alpha,
        });
        assert_eq!(plates[0].samples[1].initial_input_amount, None);
        assert_eq!(plates[1].barcode, "DEST-0002");
        assert_eq!(plates[1].samples[0].category, SampleCategory::Rna);
    }

    #[test]
    fn inconsistent_well_counts_are_rejected() {
        // given
        let (_temp_dir, path) = write_batch(indoc! {r#"
            "SampleId","DestinationPlate","WellCount","Row","Column","Recipe","Species","SampleType","InputMass","IndexId","IndexTag","SourcePlate","SourceRow","SourceColumn","TargetConcentration","AdapterVolume","WaterVolume","FinalConcentration"
            "SAMPLE-1","DEST-0001","96","A","1","Whole Genome Sequencing","","gDNA","100.0","","","","","","","","",""
            "SAMPLE-2","DEST-0001","384","B","1","Whole Genome Sequencing","","gDNA","100.0","","","","","","","","",""
        "#});

        // when
        let result = load_sample_batch(&path);

        // then
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("inconsistent well counts"));
    }

    #[test]
    fn store_and_load_round_trip_preserves_assignments() {
        // given
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("samples.csv");

        let (_other_temp_dir, source_path) = write_batch(indoc! {r#"
            "SampleId","DestinationPlate","WellCount","Row","Column","Recipe","Species","SampleType","InputMass","IndexId","IndexTag","SourcePlate","SourceRow","SourceColumn","TargetConcentration","AdapterVolume","WaterVolume","FinalConcentration"
            "SAMPLE-1","DEST-0001","96","A","1","Whole Genome Sequencing","","gDNA","100.0","D701","ATTACTCG","ADPT-0001","A","1","15.00","2.00","11.33","15.00"
        "#});
        let plates = load_sample_batch(&source_path).expect("loaded");

        // when
        store_sample_batch(&path, &plates).expect("stored");
        let reloaded = load_sample_batch(&path).expect("reloaded");

        // then
        assert_eq!(reloaded, plates);
        let assignment = reloaded[0].samples[0].assignment.as_ref().expect("assignment");
        assert_eq!(assignment.index_id, "D701");
        assert_eq!(assignment.adapter_volume, dec!(2.00));
    }
}
