/// Raw float buffer loader
///
/// Angiovue `.raw` exports are headerless rasters of little-endian 32-bit
/// floats in row-major order. The geometry is not stored in the file; it is
/// inferred from the last character of the filename stem.

use byteorder::{ByteOrder, LittleEndian};
use std::fs;
use std::path::Path;

use crate::error::RawError;

/// Width and height of a raw raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawGeometry {
    pub width: u32,
    pub height: u32,
}

impl RawGeometry {
    /// 3x3 mm scans
    pub const SMALL: RawGeometry = RawGeometry { width: 304, height: 304 };
    /// 6x6 mm scans
    pub const LARGE: RawGeometry = RawGeometry { width: 400, height: 400 };

    /// Pick the geometry from the stem's last character ('3' or '6')
    pub fn from_stem(stem: &str) -> Option<Self> {
        match stem.chars().last()? {
            '3' => Some(Self::SMALL),
            '6' => Some(Self::LARGE),
            _ => None,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Exact byte length of a valid buffer
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * 4
    }
}

/// Decoded float raster, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct RawRaster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<f32>,
}

/// Interpret `bytes` as a little-endian f32 raster of the given geometry
pub fn decode_raw(bytes: &[u8], geometry: RawGeometry) -> Result<RawRaster, RawError> {
    let expected = geometry.byte_len();
    if bytes.len() != expected {
        return Err(RawError::MalformedBuffer {
            expected,
            actual: bytes.len(),
        });
    }

    let mut pixels = vec![0.0f32; geometry.pixel_count()];
    LittleEndian::read_f32_into(bytes, &mut pixels);

    Ok(RawRaster {
        width: geometry.width,
        height: geometry.height,
        pixels,
    })
}

/// Read and decode a raw file
pub fn load_raw(path: &Path, geometry: RawGeometry) -> Result<RawRaster, RawError> {
    let bytes = fs::read(path)?;
    decode_raw(&bytes, geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_from_stem() {
        assert_eq!(RawGeometry::from_stem("0001_AS3"), Some(RawGeometry::SMALL));
        assert_eq!(RawGeometry::from_stem("0001_AD6"), Some(RawGeometry::LARGE));
        assert_eq!(RawGeometry::from_stem("0001_AD9"), None);
        assert_eq!(RawGeometry::from_stem(""), None);
        assert_eq!(RawGeometry::SMALL.byte_len(), 304 * 304 * 4);
    }

    #[test]
    fn test_decode_little_endian() {
        let geometry = RawGeometry::SMALL;
        let mut bytes = vec![0u8; geometry.byte_len()];
        bytes[0..4].copy_from_slice(&1.5f32.to_le_bytes());
        bytes[4..8].copy_from_slice(&(-2.0f32).to_le_bytes());

        let raster = decode_raw(&bytes, geometry).unwrap();
        assert_eq!(raster.width, 304);
        assert_eq!(raster.pixels.len(), 304 * 304);
        assert_eq!(raster.pixels[0], 1.5);
        assert_eq!(raster.pixels[1], -2.0);
        assert_eq!(raster.pixels[2], 0.0);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let bytes = vec![0u8; 304 * 304 * 4 - 2];
        match decode_raw(&bytes, RawGeometry::SMALL) {
            Err(RawError::MalformedBuffer { expected, actual }) => {
                assert_eq!(expected, 304 * 304 * 4);
                assert_eq!(actual, 304 * 304 * 4 - 2);
            }
            other => panic!("expected malformed buffer, got {:?}", other.map(|r| r.width)),
        }

        // A 6x6-sized buffer is not a valid 3x3 buffer either
        let bytes = vec![0u8; RawGeometry::LARGE.byte_len()];
        assert!(decode_raw(&bytes, RawGeometry::SMALL).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_raw(Path::new("/nonexistent/0001_AS3.raw"), RawGeometry::SMALL);
        assert!(matches!(result, Err(RawError::Io(_))));
    }
}
