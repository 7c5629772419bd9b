/// Study registry
///
/// This module handles:
/// - Row records for the registry and the Spectralis name table (data.rs)
/// - Reading those records from spreadsheets (loader.rs)

pub mod data;
pub mod loader;

pub use data::{ImageId, NameRow, RegistryRow};
pub use loader::{load_names_file, load_registry_file, RegistryColumns, RegistryTable};
