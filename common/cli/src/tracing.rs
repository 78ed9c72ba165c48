use std::path::PathBuf;

use anyhow::Context;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing_log::AsTrace;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Console logging at the verbosity the user asked for; everything at TRACE into the trace
/// file when one is given.
pub fn configure_tracing(trace: Option<PathBuf>, verbosity: Verbosity<InfoLevel>) -> anyhow::Result<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_filter(verbosity.log_level_filter().as_trace());

    let trace_layer = match trace {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Unable to create trace file. path: {:?}", &path))?;

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_filter(tracing::level_filters::LevelFilter::TRACE);

            Some(layer)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(trace_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}
