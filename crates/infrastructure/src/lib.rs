pub mod files;
pub mod persistence;
