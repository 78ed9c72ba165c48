/// Stores are for loading/storing different kinds of data.
///
/// Currently, all stores are just simple files, mostly CSV.
///
/// Example store backends:
/// * Files (e.g. CSV).
/// * Remote (e.g. REST).
/// * Databases.
/// * Etc.
pub mod csv;
pub mod import_batch;
pub mod inventory;
pub mod master_index;
pub mod reconciliation;
pub mod samples;
