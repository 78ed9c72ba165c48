pub mod import;
pub mod lifecycle;
pub mod record;
