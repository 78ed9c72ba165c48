#![deny(missing_docs)]
//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use cli::args::PlateSizeArg;
use cli::parsers::IndexTypeSetArg;
use stores::inventory::InventorySource;

/// Adapter inventory and allocation tool
#[derive(Parser, Debug)]
#[command(name = "allocator_cli")]
#[command(bin_name = "allocator_cli")]
#[command(version, about, long_about = None)]
pub(crate) struct Opts {
    /// Mode
    #[command(subcommand)]
    pub(crate) command: ModeCommand,

    /// Trace log file
    #[arg(long, num_args = 0..=1, default_missing_value = "trace.log")]
    pub(crate) trace: Option<PathBuf>,

    /// Verbosity
    #[command(flatten)]
    pub(crate) verbose: Verbosity<InfoLevel>,
}

/// Sub-commands
#[derive(Debug, Subcommand)]
pub(crate) enum ModeCommand {
    /// Import a batch of newly received adapter plates
    Import {
        /// Inventory store
        #[arg(long)]
        inventory: InventorySource,

        /// Import batch file
        #[arg(long)]
        batch: PathBuf,

        /// Master index reference file
        #[arg(long)]
        master_index: PathBuf,
    },
    /// Activate an imported plate, superseding the previously active set
    Activate {
        /// Inventory store
        #[arg(long)]
        inventory: InventorySource,

        /// Plate barcode
        #[arg(long)]
        plate: String,
    },
    /// Allocate adapters to a sample batch
    Allocate {
        /// Inventory store
        #[arg(long)]
        inventory: InventorySource,

        /// Sample batch file; assignments are written back to it
        #[arg(long)]
        samples: PathBuf,

        /// Acceptable index types, pipe-delimited, e.g. 'dual_index|single_index'
        #[arg(long = "index-type")]
        index_type: IndexTypeSetArg,
    },
    /// Reconcile externally-made assignments against the inventory
    Reconcile {
        /// Inventory store
        #[arg(long)]
        inventory: InventorySource,

        /// Manual assignments file
        #[arg(long)]
        assignments: PathBuf,

        /// Destination plate size
        #[arg(long)]
        plate_size: PlateSizeArg,
    },
}
