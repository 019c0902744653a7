use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{RasterIo, RasterIoError, WriteOptions};
use crate::raster::{Extent, Pixel, Raster};

/// In-memory [`RasterIo`] for tests. Writes also drop a small JSON file at the
/// target path so existence checks on disk behave as with real outputs.
#[derive(Debug, Default)]
pub struct MemoryIo {
    bands: HashMap<PathBuf, Vec<Raster<f64>>>,
    extents: HashMap<PathBuf, Extent>,
    written: RefCell<Vec<(PathBuf, Raster<f64>, WriteOptions)>>,
}

fn convert<T: Pixel, U: Pixel>(raster: &Raster<T>) -> Raster<U> {
    raster.derive(
        raster.data.iter().map(|v| U::from_f64(v.to_f64())).collect(),
        raster.no_data,
    )
}

impl MemoryIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Pixel, P: AsRef<Path>>(&mut self, path: P, bands: Vec<Raster<T>>) {
        let bands = bands.iter().map(convert::<T, f64>).collect();
        self.bands.insert(path.as_ref().to_path_buf(), bands);
    }

    pub fn insert_extent<P: AsRef<Path>>(&mut self, path: P, extent: Extent) {
        self.extents.insert(path.as_ref().to_path_buf(), extent);
    }

    pub fn written(&self) -> Vec<(PathBuf, Raster<f64>, WriteOptions)> {
        self.written.borrow().clone()
    }

    fn missing(path: &Path) -> RasterIoError {
        RasterIoError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        ))
    }
}

impl RasterIo for MemoryIo {
    fn band_count(&self, path: &Path) -> Result<usize, RasterIoError> {
        self.bands
            .get(path)
            .map(|bands| bands.len())
            .ok_or_else(|| Self::missing(path))
    }

    fn read_band<T: Pixel>(&self, path: &Path, band: usize) -> Result<Raster<T>, RasterIoError> {
        let bands = self.bands.get(path).ok_or_else(|| Self::missing(path))?;
        if band == 0 || band > bands.len() {
            return Err(RasterIoError::BandOutOfRange {
                path: path.to_path_buf(),
                band,
                count: bands.len(),
            });
        }
        Ok(convert(&bands[band - 1]))
    }

    fn vector_extent(&self, path: &Path) -> Result<Extent, RasterIoError> {
        self.extents
            .get(path)
            .copied()
            .ok_or_else(|| RasterIoError::NoLayer(path.to_path_buf()))
    }

    fn write<T: Pixel>(
        &self,
        raster: &Raster<T>,
        path: &Path,
        options: &WriteOptions,
    ) -> Result<(), RasterIoError> {
        let raster = convert::<T, f64>(raster);
        let body = serde_json::to_vec(&raster.data)
            .map_err(|e| RasterIoError::Io(std::io::Error::other(e)))?;
        std::fs::write(path, body)?;
        self.written
            .borrow_mut()
            .push((path.to_path_buf(), raster, *options));
        Ok(())
    }
}
