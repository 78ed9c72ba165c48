pub mod geometry;
pub mod well;
