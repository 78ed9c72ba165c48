use std::str::FromStr;

use inventory::record::IndexType;

/// A set of acceptable index types parsed from one pipe-delimited argument.
#[derive(Debug, Clone)]
pub struct IndexTypeSetArg(pub Vec<IndexType>);

impl FromStr for IndexTypeSetArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        index_types_parser(s).map(IndexTypeSetArg)
    }
}

/// Parses a pipe-delimited set of acceptable index types, e.g. 'dual_index|single_index'.
pub fn index_types_parser(s: &str) -> Result<Vec<IndexType>, String> {
    let mut index_types = Vec::new();
    let mut errors = Vec::new();

    for chunk in s.split('|') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            errors.push("Empty index type".to_string());
            continue;
        }

        match IndexType::from_str(chunk) {
            Ok(index_type) => index_types.push(index_type),
            Err(error) => errors.push(error.to_string()),
        }
    }

    if !errors.is_empty() {
        return Err(errors.join("; "));
    }
    if index_types.is_empty() {
        return Err("Expected at least one index type".to_string());
    }

    Ok(index_types)
}

#[cfg(test)]
mod index_types_parser_tests {
    use super::*;

    #[test]
    fn test_index_types_parser() {
        // when
        let result = index_types_parser("dual_index|single_index");

        // then
        assert_eq!(
            result,
            Ok(vec![
                IndexType::from_raw_str("dual_index"),
                IndexType::from_raw_str("single_index"),
            ])
        )
    }

    #[test]
    fn test_index_types_parser_errors() {
        // when
        let result = index_types_parser("dual_index||bad type");

        // then
        assert_eq!(
            result,
            Err("Empty index type; Invalid index type: 'bad type'".to_string())
        )
    }
}
