/// Raw buffer conversion module
///
/// This module handles:
/// - Decoding headerless little-endian f32 rasters (loader.rs)
/// - Rescaling to 8-bit and writing TIFF/BMP (processor.rs)

pub mod loader;
pub mod processor;

pub use loader::{decode_raw, load_raw, RawGeometry, RawRaster};
pub use processor::{convert_raw_file, OutputFormat};
