use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use lexical_sort::natural_lexical_cmp;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// A well coordinate on a microtiter plate.
///
/// `<row><column>` e.g. `A1`, `H12`, `P24`.
///
/// <row> = a single letter, `A`-`P`. 96-well plates use `A`-`H`, 384-well plates use `A`-`P`.
/// <column> = a 1-based column number. 96-well plates use 1-12, 384-well plates use 1-24.
///
/// The largest supported geometry is a 384-well plate (16 rows x 24 columns).
#[derive(Debug, Clone, Copy, DeserializeFromStr, SerializeDisplay, Eq, PartialEq, Hash)]
pub struct WellId {
    row: char,
    column: u8,
}

pub const MAX_ROWS: u8 = 16;
pub const MAX_COLUMNS: u8 = 24;

impl WellId {
    /// See [`WellId::from_str`] for a variant that does validation.
    ///
    /// Safety: no validation is done.
    pub fn from_raw_str(value: &str) -> Self {
        Self::from_str(value).unwrap()
    }

    pub fn try_from_row_index_and_column(row_index: u8, column: u8) -> Result<Self, WellIdError> {
        if !(1..=MAX_ROWS).contains(&row_index) || !(1..=MAX_COLUMNS).contains(&column) {
            return Err(WellIdError::OutOfRange {
                row_index,
                column,
            });
        }
        let row = (b'A' + (row_index - 1)) as char;
        Ok(Self {
            row,
            column,
        })
    }

    pub fn row_letter(&self) -> char {
        self.row
    }

    /// 1-based row index, `A` = 1.
    pub fn row_index(&self) -> u8 {
        (self.row as u8) - b'A' + 1
    }

    /// 1-based column number.
    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn row_is_odd(&self) -> bool {
        is_odd(self.row_index() as i64)
    }

    pub fn column_is_odd(&self) -> bool {
        is_odd(self.column as i64)
    }

    /// Key for column-major ordering: column number concatenated with row letter.
    ///
    /// Compared with [`natural_lexical_cmp`] this yields `A1, B1, .., H1, A2, ..`.
    pub fn column_major_key(&self) -> String {
        format!("{}{}", self.column, self.row)
    }

    pub fn fits_plate_of(&self, rows: u8, columns: u8) -> bool {
        self.row_index() <= rows && self.column <= columns
    }
}

impl Display for WellId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

impl FromStr for WellId {
    type Err = WellIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut chars = value.chars();

        let row = chars
            .next()
            .ok_or_else(|| WellIdError::Invalid(value.to_string()))?
            .to_ascii_uppercase();

        if !row.is_ascii_alphabetic() {
            return Err(WellIdError::Invalid(value.to_string()));
        }

        let column_str = chars.as_str();
        if column_str.is_empty() || !column_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(WellIdError::Invalid(value.to_string()));
        }

        let column = column_str
            .parse::<u8>()
            .map_err(|_err| WellIdError::Invalid(value.to_string()))?;

        let row_index = (row as u8).wrapping_sub(b'A') + 1;
        if !(1..=MAX_ROWS).contains(&row_index) || !(1..=MAX_COLUMNS).contains(&column) {
            return Err(WellIdError::OutOfRange {
                row_index,
                column,
            });
        }

        Ok(Self {
            row,
            column,
        })
    }
}

impl Ord for WellId {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_lexical_cmp(&self.column_major_key(), &other.column_major_key())
    }
}

impl PartialOrd for WellId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum WellIdError {
    #[error("Invalid well id. value: '{0}'")]
    Invalid(String),
    #[error("Well out of range. row_index: {row_index}, column: {column}")]
    OutOfRange { row_index: u8, column: u8 },
}

/// The row portion of a raw well id, i.e. everything that is a letter.
pub fn row_of(well_id: &str) -> String {
    well_id
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect()
}

/// The column portion of a raw well id, i.e. everything that is a digit.
pub fn col_of(well_id: &str) -> String {
    well_id
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

pub fn is_odd(value: i64) -> bool {
    value % 2 != 0
}
