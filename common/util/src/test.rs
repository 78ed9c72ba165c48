use std::path::PathBuf;

use predicates::Predicate;
use tempfile::TempDir;

/// Builds a path to a file in the temp dir, and the file name, without creating the file.
pub fn build_temp_file(temp_dir: &TempDir, name: &str, extension: &str) -> (PathBuf, PathBuf) {
    let file_name = PathBuf::from(format!("{}.{}", name, extension));

    let mut path = PathBuf::from(temp_dir.path());
    path.push(file_name.clone());

    (path, file_name)
}

/// Splits command-line fragments into individual arguments.
///
/// Only suitable for tests; does not handle quoting.
pub fn prepare_args(fragments: Vec<&str>) -> Vec<String> {
    fragments
        .iter()
        .flat_map(|fragment| fragment.split_whitespace())
        .map(|arg| arg.to_string())
        .collect()
}

/// A pass-through output predicate that prints the captured stream for diagnosis.
pub fn print(name: &'static str) -> impl Predicate<[u8]> {
    predicates::function::function(move |content: &[u8]| {
        println!("{}:", name);
        println!("{}", String::from_utf8_lossy(content));
        true
    })
}
