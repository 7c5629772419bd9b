/// OCTA export relabeling
///
/// Maps the raw filenames written by Angiovue, Revo and Spectralis OCT
/// Angiography instruments to the Image IDs assigned in a study registry,
/// and renames the files in place. Angiovue float buffers are converted to
/// 8-bit images on the way.

pub mod config;
pub mod decompose;
pub mod error;
pub mod key;
pub mod pipeline;
pub mod raw;
pub mod registry;
pub mod rename;
