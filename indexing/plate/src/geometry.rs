use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::well::WellId;

/// The two destination plate geometries used for library preparation.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlateSize {
    Plate96,
    Plate384,
}

impl PlateSize {
    pub fn well_count(&self) -> u16 {
        match self {
            PlateSize::Plate96 => 96,
            PlateSize::Plate384 => 384,
        }
    }

    pub fn rows(&self) -> u8 {
        match self {
            PlateSize::Plate96 => 8,
            PlateSize::Plate384 => 16,
        }
    }

    pub fn columns(&self) -> u8 {
        match self {
            PlateSize::Plate96 => 12,
            PlateSize::Plate384 => 24,
        }
    }

    pub fn from_well_count(well_count: u16) -> Result<Self, GeometryError> {
        match well_count {
            96 => Ok(PlateSize::Plate96),
            384 => Ok(PlateSize::Plate384),
            _ => Err(GeometryError::UnsupportedWellCount(well_count)),
        }
    }
}

impl Display for PlateSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.well_count())
    }
}

/// One of the four 96-well quadrants interleaved into a 384-well plate.
///
/// Quadrants alternate by row and column:
/// * 1 = odd row, odd column
/// * 2 = even row, odd column
/// * 3 = odd row, even column
/// * 4 = even row, even column
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quadrant {
    First,
    Second,
    Third,
    Fourth,
}

pub const QUADRANTS: [Quadrant; 4] = [Quadrant::First, Quadrant::Second, Quadrant::Third, Quadrant::Fourth];

impl Quadrant {
    pub fn number(&self) -> u8 {
        match self {
            Quadrant::First => 1,
            Quadrant::Second => 2,
            Quadrant::Third => 3,
            Quadrant::Fourth => 4,
        }
    }

    fn row_offset(&self) -> u8 {
        // quadrants 1 and 3 occupy the odd rows
        match self {
            Quadrant::First | Quadrant::Third => 1,
            Quadrant::Second | Quadrant::Fourth => 0,
        }
    }

    fn column_offset(&self) -> u8 {
        // quadrants 1 and 2 occupy the odd columns
        match self {
            Quadrant::First | Quadrant::Second => 1,
            Quadrant::Third | Quadrant::Fourth => 0,
        }
    }

    fn from_parity(row_is_odd: bool, column_is_odd: bool) -> Self {
        match (row_is_odd, column_is_odd) {
            (true, true) => Quadrant::First,
            (false, true) => Quadrant::Second,
            (true, false) => Quadrant::Third,
            (false, false) => Quadrant::Fourth,
        }
    }
}

impl Display for Quadrant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum GeometryError {
    #[error("Unsupported plate well count. well_count: {0}")]
    UnsupportedWellCount(u16),
    #[error("Not a 96-well coordinate. well: '{0}'")]
    NotA96Well(WellId),
    #[error("Well out of range for plate. well: '{well}', plate_size: {plate_size}")]
    WellOutOfRange { well: WellId, plate_size: PlateSize },
}

/// Maps a 96-well coordinate into the 384-well coordinate it lands on for the given quadrant.
///
/// Realizes the standard 4-way interleave of four 96-well plates into one 384-well plate,
/// e.g. `A1` maps to `A1`/`B1`/`A2`/`B2` for quadrants 1-4 respectively.
pub fn to_384(quadrant: Quadrant, well_96: WellId) -> Result<WellId, GeometryError> {
    if !well_96.fits_plate_of(PlateSize::Plate96.rows(), PlateSize::Plate96.columns()) {
        return Err(GeometryError::NotA96Well(well_96));
    }

    let row_index = well_96.row_index() * 2 - quadrant.row_offset();
    let column = well_96.column() * 2 - quadrant.column_offset();

    // always in range for a valid 96-well input
    Ok(WellId::try_from_row_index_and_column(row_index, column).unwrap())
}

/// The inverse of [`to_384`]: which quadrant a 384-well coordinate belongs to, and where it
/// sits on that quadrant's 96-well grid.
pub fn from_384(well_384: WellId) -> (Quadrant, WellId) {
    let quadrant = Quadrant::from_parity(well_384.row_is_odd(), well_384.column_is_odd());

    let row_index = (well_384.row_index() + 1) / 2;
    let column = (well_384.column() + 1) / 2;

    let well_96 = WellId::try_from_row_index_and_column(row_index, column).unwrap();

    (quadrant, well_96)
}

/// Orders the given wells column-major, returning indices into the input slice.
pub fn column_major_ordering(wells: &[WellId]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..wells.len()).collect();
    indices.sort_by(|&a, &b| wells[a].cmp(&wells[b]));
    indices
}

/// Partitions wells of a 384-well plate into the four interleave quadrants.
///
/// Returns indices into the input slice, one list per quadrant in quadrant order,
/// each non-empty list independently ordered column-major.
pub fn quadrant_split(wells: &[WellId]) -> [Vec<usize>; 4] {
    let mut quadrants: [Vec<usize>; 4] = [vec![], vec![], vec![], vec![]];

    for index in column_major_ordering(wells) {
        let (quadrant, _well_96) = from_384(wells[index]);
        quadrants[(quadrant.number() - 1) as usize].push(index);
    }

    for quadrant_indices in quadrants.iter_mut() {
        quadrant_indices.sort_by(|&a, &b| wells[a].cmp(&wells[b]));
    }

    quadrants
}
