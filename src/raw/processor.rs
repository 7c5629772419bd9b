/// Raw raster -> 8-bit image
///
/// Linearly rescales the observed [min, max] of a float raster onto
/// [0, 255], writes it as a single-channel TIFF or BMP beside the source,
/// and only then deletes the source buffer.

use image::{GrayImage, ImageFormat};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::loader::{load_raw, RawGeometry, RawRaster};
use crate::error::RawError;

/// Encoded output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tiff,
    Bmp,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Tiff => "tiff",
            OutputFormat::Bmp => "bmp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::Bmp => ImageFormat::Bmp,
        }
    }
}

impl RawRaster {
    /// Smallest and largest finite pixel values
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.pixels
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })
    }

    /// Rescale to 8-bit: min -> 0, max -> 255, truncating in between.
    ///
    /// A flat raster and non-finite pixels map to 0.
    pub fn to_gray8(&self) -> Result<GrayImage, RawError> {
        let (min, max) = self.value_range().unwrap_or((0.0, 0.0));
        let span = f64::from(max) - f64::from(min);

        if span <= 0.0 {
            debug!("Flat raster (value {}), writing zeros", min);
        }

        let bytes: Vec<u8> = self
            .pixels
            .iter()
            .map(|&v| {
                if span <= 0.0 || !v.is_finite() {
                    return 0;
                }
                let normalized = (f64::from(v) - f64::from(min)) / span;
                // `as` saturates into 0..=255
                (normalized * 255.0) as u8
            })
            .collect();

        GrayImage::from_raw(self.width, self.height, bytes).ok_or(RawError::Dimensions {
            width: self.width,
            height: self.height,
        })
    }
}

/// Output path for a converted raw file
pub fn output_path(raw_path: &Path, format: OutputFormat) -> PathBuf {
    raw_path.with_extension(format.extension())
}

/// Convert one `.raw` file to an 8-bit image beside it.
///
/// The source is removed only after the image has been written; on any
/// failure the source stays and no partial output is left behind.
pub fn convert_raw_file(raw_path: &Path, format: OutputFormat) -> Result<PathBuf, RawError> {
    // Step 1: Geometry from the stem's last character
    let stem = raw_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let geometry = RawGeometry::from_stem(&stem)
        .ok_or_else(|| RawError::UnsupportedGeometry(stem.clone()))?;
    debug!(
        "Identified {} as {}x{}",
        raw_path.display(),
        geometry.width,
        geometry.height
    );

    // Step 2: Decode and rescale
    let raster = load_raw(raw_path, geometry)?;
    let image = raster.to_gray8()?;

    // Step 3: Write, refusing to replace an existing file
    let output = output_path(raw_path, format);
    if fs::symlink_metadata(&output).is_ok() {
        return Err(RawError::OutputExists(output));
    }

    if let Err(e) = image.save_with_format(&output, format.image_format()) {
        if fs::remove_file(&output).is_ok() {
            warn!("Removed partial output {}", output.display());
        }
        return Err(e.into());
    }

    // Step 4: Drop the source now that the image is on disk
    fs::remove_file(raw_path)?;

    Ok(output)
}
