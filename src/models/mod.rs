pub mod appointment;
pub mod common;
pub mod directory;
pub mod slot;
