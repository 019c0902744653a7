//! Reading and writing rasters, and reading vector extents.
//!
//! [`RasterIo`] is the only place the pipeline touches raster files; everything
//! else works on in-memory [`Raster`]s.

use std::fmt;
use std::path::Path;

use crate::raster::{Extent, Pixel, Raster};

pub mod error;
pub mod gdal_io;
#[cfg(test)]
pub mod memory;

pub use error::RasterIoError;
pub use gdal_io::{GdalIo, OutputDriver};
#[cfg(test)]
pub use memory::MemoryIo;

pub trait RasterIo {
    fn band_count(&self, path: &Path) -> Result<usize, RasterIoError>;

    /// Reads band `band` (1-based) of `path`.
    fn read_band<T: Pixel>(&self, path: &Path, band: usize) -> Result<Raster<T>, RasterIoError>;

    /// Envelope of the first layer of a vector dataset.
    fn vector_extent(&self, path: &Path) -> Result<Extent, RasterIoError>;

    /// Writes a single band raster. `path` must only appear once fully written.
    fn write<T: Pixel>(
        &self,
        raster: &Raster<T>,
        path: &Path,
        options: &WriteOptions,
    ) -> Result<(), RasterIoError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    Deflate,
    Lzw,
    Zstd,
    None,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Deflate => write!(f, "DEFLATE"),
            Compression::Lzw => write!(f, "LZW"),
            Compression::Zstd => write!(f, "ZSTD"),
            Compression::None => write!(f, "NONE"),
        }
    }
}

/// GeoTIFF creation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub compression: Option<Compression>,
    pub bigtiff: bool,
}

impl WriteOptions {
    /// Driver defaults, no creation option at all.
    pub fn plain() -> Self {
        Self {
            compression: None,
            bigtiff: false,
        }
    }

    pub fn compressed(compression: Compression, bigtiff: bool) -> Self {
        Self {
            compression: Some(compression),
            bigtiff,
        }
    }

    pub fn creation_options(&self) -> Vec<(&'static str, String)> {
        let mut options = Vec::new();
        if let Some(compression) = self.compression {
            options.push(("COMPRESS", compression.to_string()));
        }
        if self.bigtiff {
            options.push(("BIGTIFF", "YES".to_string()));
        }
        options
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::compressed(Compression::Deflate, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_deflate_bigtiff() {
        assert_eq!(
            WriteOptions::default().creation_options(),
            vec![
                ("COMPRESS", "DEFLATE".to_string()),
                ("BIGTIFF", "YES".to_string())
            ]
        );
        assert!(WriteOptions::plain().creation_options().is_empty());
    }
}
