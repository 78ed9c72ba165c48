use clap::ValueEnum;
use plate::geometry::PlateSize;

/// Args decouple of CLI arg handling requirements from the internal data structures

#[derive(Debug, Clone)]
#[derive(ValueEnum)]
pub enum PlateSizeArg {
    #[value(name("96"))]
    Plate96,
    #[value(name("384"))]
    Plate384,
}

impl From<PlateSizeArg> for PlateSize {
    fn from(value: PlateSizeArg) -> Self {
        match value {
            PlateSizeArg::Plate96 => Self::Plate96,
            PlateSizeArg::Plate384 => Self::Plate384,
        }
    }
}
