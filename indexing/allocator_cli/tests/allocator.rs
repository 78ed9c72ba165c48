#[macro_use]
extern crate util;

mod operation_sequence_1 {
    use std::fs::read_to_string;
    use std::path::PathBuf;
    use std::str::FromStr;

    use assert_cmd::Command;
    use indoc::indoc;
    use rust_decimal_macros::dec;
    use stores::inventory::InventorySource;
    use stores::test::{build_import_rows, write_import_batch_csv, write_master_index_csv};
    use tempfile::tempdir;
    use util::test::{build_temp_file, prepare_args, print};

    /// A context, which will be dropped when the tests are completed.
    mod context {
        use std::sync::{Mutex, MutexGuard};
        use std::thread::sleep;
        use std::time::Duration;

        use super::*;

        #[derive(Debug)]
        pub struct Context {
            pub temp_dir: tempfile::TempDir,

            pub trace_log_arg: String,
            pub test_trace_log_path: PathBuf,
            pub inventory_arg: String,
            pub inventory_path: PathBuf,
            pub batch_path: PathBuf,
            pub master_index_path: PathBuf,
            pub samples_path: PathBuf,
            pub assignments_path: PathBuf,
        }

        impl Context {
            pub fn new() -> Self {
                let temp_dir = tempdir().unwrap();

                let (test_trace_log_path, _) = build_temp_file(&temp_dir, "trace", "log");
                let trace_log_arg = format!("--trace {}", test_trace_log_path.to_str().unwrap());

                let (inventory_path, _) = build_temp_file(&temp_dir, "inventory", "csv");
                let inventory_arg = format!("--inventory {}", inventory_path.to_str().unwrap());

                let (batch_path, _) = build_temp_file(&temp_dir, "batch", "csv");
                let (master_index_path, _) = build_temp_file(&temp_dir, "master_index", "csv");
                let (samples_path, _) = build_temp_file(&temp_dir, "samples", "csv");
                let (assignments_path, _) = build_temp_file(&temp_dir, "assignments", "csv");

                Context {
                    temp_dir,
                    trace_log_arg,
                    test_trace_log_path,
                    inventory_arg,
                    inventory_path,
                    batch_path,
                    master_index_path,
                    samples_path,
                    assignments_path,
                }
            }

            pub fn delete_trace_log(&self) {
                if self.test_trace_log_path.exists() {
                    std::fs::remove_file(&self.test_trace_log_path).unwrap();
                }
            }
        }

        impl Drop for Context {
            fn drop(&mut self) {
                println!(
                    "destroying context. temp_dir: {}",
                    self.temp_dir.path().to_str().unwrap()
                );
            }
        }

        /// IMPORTANT: lock content must be dropped manually, as static items are never dropped.
        static LOCK: Mutex<(usize, Option<Context>)> = Mutex::new((0, None));

        /// Use a mutex to prevent multiple test threads interacting with the same static state.
        /// This can happen when tests use the same mock context.  Without this mechanism tests will
        /// interact with each other causing unexpected results and test failures.
        pub fn acquire(sequence: usize) -> MutexGuard<'static, (usize, Option<Context>)> {
            let mut lock = loop {
                let mut lock = LOCK
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                if lock.0 == sequence - 1 {
                    lock.0 += 1;
                    break lock;
                }
                drop(lock);

                sleep(Duration::from_millis(100));
            };

            if lock.1.is_none() {
                lock.1.replace(Context::new());
            }

            lock
        }
    }

    fn inventory_source(ctx: &context::Context) -> InventorySource {
        InventorySource::from_str(ctx.inventory_path.to_str().unwrap()).unwrap()
    }

    #[test]
    fn sequence_01_import() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(1);
        let ctx = ctx_guard.1.as_mut().unwrap();

        // and
        let rows = build_import_rows("ADPT-0001", 1, "dual_index");
        write_import_batch_csv(&ctx.batch_path, &rows)?;

        let entries: Vec<(String, String)> = rows
            .iter()
            .map(|row| (row.index_id.clone(), row.index_tag.clone()))
            .collect();
        write_master_index_csv(&ctx.master_index_path, &entries)?;

        // and
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_allocator_cli"));

        let args = prepare_args(vec![
            ctx.trace_log_arg.as_str(),
            "-vvv",
            "import",
            ctx.inventory_arg.as_str(),
            format!("--batch {}", ctx.batch_path.to_str().unwrap()).as_str(),
            format!("--master-index {}", ctx.master_index_path.to_str().unwrap()).as_str(),
        ]);
        println!("args: {:?}", args);

        // when
        cmd.args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(print("stdout"));

        // and
        let trace_content: String = read_to_string(ctx.test_trace_log_path.clone())?;
        println!("{}", trace_content);

        assert_contains_inorder!(trace_content, [
            "Imported inventory batch.",
            "Storing inventory.",
            "Import complete. records: 96",
        ]);

        // and
        let records = stores::inventory::load_records(&inventory_source(ctx))?;
        assert_eq!(records.len(), 96);
        assert!(records
            .iter()
            .all(|record| !record.is_active && !record.is_depleted));

        Ok(())
    }

    #[test]
    fn sequence_02_activate() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(2);
        let ctx = ctx_guard.1.as_mut().unwrap();
        ctx.delete_trace_log();

        // and
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_allocator_cli"));

        let args = prepare_args(vec![
            ctx.trace_log_arg.as_str(),
            "-vvv",
            "activate",
            ctx.inventory_arg.as_str(),
            "--plate ADPT-0001",
        ]);
        println!("args: {:?}", args);

        // when
        cmd.args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(print("stdout"));

        // and
        let trace_content: String = read_to_string(ctx.test_trace_log_path.clone())?;
        println!("{}", trace_content);

        assert_contains_inorder!(trace_content, [
            "Activation complete. plate: 'ADPT-0001', index_type: 'dual_index', set_id: 1, activated: 96, superseded: 0",
        ]);

        // and
        let records = stores::inventory::load_records(&inventory_source(ctx))?;
        assert!(records.iter().all(|record| record.is_active));

        Ok(())
    }

    #[test]
    fn sequence_03_allocate() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(3);
        let ctx = ctx_guard.1.as_mut().unwrap();
        ctx.delete_trace_log();

        // and
        std::fs::write(&ctx.samples_path, indoc! {r#"
            "SampleId","DestinationPlate","WellCount","Row","Column","Recipe","Species","SampleType","InputMass","IndexId","IndexTag","SourcePlate","SourceRow","SourceColumn","TargetConcentration","AdapterVolume","WaterVolume","FinalConcentration"
            "SAMPLE-1","DEST-0001","96","A","1","Whole Genome Sequencing","Homo sapiens","gDNA","100.0","","","","","","","","",""
            "SAMPLE-2","DEST-0001","96","B","1","Whole Genome Sequencing","Homo sapiens","gDNA","100.0","","","","","","","","",""
        "#})?;

        // and
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_allocator_cli"));

        let args = prepare_args(vec![
            ctx.trace_log_arg.as_str(),
            "-vvv",
            "allocate",
            ctx.inventory_arg.as_str(),
            format!("--samples {}", ctx.samples_path.to_str().unwrap()).as_str(),
            "--index-type dual_index",
        ]);
        println!("args: {:?}", args);

        // when
        cmd.args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(print("stdout"));

        // and
        let trace_content: String = read_to_string(ctx.test_trace_log_path.clone())?;
        println!("{}", trace_content);

        assert_contains_inorder!(trace_content, [
            "Allocated plate. plate: 'DEST-0001', assigned: 2",
            "Allocation complete. plates: 1, source_plates: {\"ADPT-0001\"}",
        ]);

        // and - the samples file now carries the assignments
        let plates = stores::samples::load_sample_batch(&ctx.samples_path)?;
        assert_eq!(plates.len(), 1);

        let assignment = plates[0].samples[0]
            .assignment
            .as_ref()
            .expect("assignment");
        assert_eq!(assignment.index_id, "D001");
        assert_eq!(assignment.source_plate, "ADPT-0001");
        assert_eq!(assignment.source_row, "A");
        assert_eq!(assignment.source_column, "1");
        assert_eq!(assignment.adapter_volume, dec!(2.00));
        assert_eq!(assignment.water_volume, dec!(11.33));

        // and - the inventory reflects the consumption and the cursor
        let records = stores::inventory::load_records(&inventory_source(ctx))?;
        assert_eq!(records[0].remaining_volume, dec!(598.00));
        assert_eq!(records[1].remaining_volume, dec!(598.00));
        assert!(records[1].last_used);

        Ok(())
    }

    #[test]
    fn sequence_04_reconcile() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(4);
        let ctx = ctx_guard.1.as_mut().unwrap();
        ctx.delete_trace_log();

        // and
        std::fs::write(&ctx.assignments_path, indoc! {r#"
            "SampleId","IndexId","IndexTag","Recipe","Species","InputMass"
            "SAMPLE-3","D003","TAG003","Whole Genome Sequencing","Homo sapiens","100.0"
            "SAMPLE-4","D999","TAG999","Whole Genome Sequencing","Homo sapiens","100.0"
        "#})?;

        // and
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_allocator_cli"));

        let args = prepare_args(vec![
            ctx.trace_log_arg.as_str(),
            "-vvv",
            "reconcile",
            ctx.inventory_arg.as_str(),
            format!("--assignments {}", ctx.assignments_path.to_str().unwrap()).as_str(),
            "--plate-size 96",
        ]);
        println!("args: {:?}", args);

        // when
        cmd.args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(print("stdout"));

        // and
        let trace_content: String = read_to_string(ctx.test_trace_log_path.clone())?;
        println!("{}", trace_content);

        assert_contains_inorder!(trace_content, [
            "No matching active inventory record. sample: 'SAMPLE-4', index_id: 'D999', index_tag: 'TAG999'",
            "Reconciled manual assignments. reconciled: 1, unmatched: 1",
            "Reconciliation complete. reconciled: 1, unmatched: 1",
        ]);

        // and
        let records = stores::inventory::load_records(&inventory_source(ctx))?;
        let record = records
            .iter()
            .find(|record| record.index_id == "D003")
            .expect("record");
        assert_eq!(record.remaining_volume, dec!(598.00));

        Ok(())
    }
}
