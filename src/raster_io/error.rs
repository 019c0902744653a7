use std::path::PathBuf;
use thiserror::Error;

use crate::raster::RasterError;

#[derive(Debug, Error)]
pub enum RasterIoError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("band {band} out of range, {path} has {count} band(s)")]
    BandOutOfRange {
        path: PathBuf,
        band: usize,
        count: usize,
    },
    #[error("no raster driver for the extension of {0}, expected .tif, .tiff or .jp2")]
    UnsupportedExtension(PathBuf),
    #[error("{0} has no vector layer")]
    NoLayer(PathBuf),
    #[error("could not move output into place: {0}")]
    Persist(#[from] tempfile::PathPersistError),
    #[error(transparent)]
    Raster(#[from] RasterError),
}
