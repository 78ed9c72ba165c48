pub mod category;
pub mod cursor;
pub mod engine;
pub mod reconcile;
pub mod sample;
pub mod volumes;
