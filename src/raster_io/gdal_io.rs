use gdal::cpl::CslStringList;
use gdal::raster::Buffer;
use gdal::vector::LayerAccess;
use gdal::{Dataset, DriverManager};
use std::path::Path;
use tracing::debug;

use super::{RasterIo, RasterIoError, WriteOptions};
use crate::raster::{Extent, IDENTITY_TRANSFORM, Pixel, Raster};

/// Output format, chosen from the extension of the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDriver {
    GTiff,
    Jp2OpenJpeg,
}

impl OutputDriver {
    pub fn for_path(path: &Path) -> Result<Self, RasterIoError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "tif" | "tiff" => Ok(OutputDriver::GTiff),
            "jp2" => Ok(OutputDriver::Jp2OpenJpeg),
            _ => Err(RasterIoError::UnsupportedExtension(path.to_path_buf())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputDriver::GTiff => "GTiff",
            OutputDriver::Jp2OpenJpeg => "JP2OpenJPEG",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            OutputDriver::GTiff => ".tif",
            OutputDriver::Jp2OpenJpeg => ".jp2",
        }
    }

    /// Compression and BigTIFF only exist for GeoTIFF; JPEG2000 outputs are lossless.
    pub fn creation_options(&self, options: &WriteOptions) -> Vec<(&'static str, String)> {
        match self {
            OutputDriver::GTiff => options.creation_options(),
            OutputDriver::Jp2OpenJpeg => vec![("REVERSIBLE", "YES".to_string())],
        }
    }
}

/// [`RasterIo`] backed by GDAL, writing GeoTIFF or JPEG2000.
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalIo;

impl GdalIo {
    pub fn new() -> Self {
        GdalIo
    }

    /// Builds the band in memory, then copies it out with the target driver.
    /// JP2OpenJPEG only supports creation by copy.
    fn create<T: Pixel>(
        raster: &Raster<T>,
        path: &Path,
        driver: OutputDriver,
        options: &WriteOptions,
    ) -> Result<(), RasterIoError> {
        let memory = DriverManager::get_driver_by_name("MEM")?;
        let mut dataset =
            memory.create_with_band_type::<T, _>("", raster.width, raster.height, 1)?;
        dataset.set_geo_transform(&raster.geo_transform)?;
        if !raster.projection.is_empty() {
            dataset.set_projection(&raster.projection)?;
        }

        {
            let mut band = dataset.rasterband(1)?;
            if raster.no_data.is_some() {
                band.set_no_data_value(raster.no_data)?;
            }
            let mut buffer = Buffer::new((raster.width, raster.height), raster.data.clone());
            band.write((0, 0), (raster.width, raster.height), &mut buffer)?;
        }

        let mut creation_options = CslStringList::new();
        for (name, value) in driver.creation_options(options) {
            creation_options.set_name_value(name, &value)?;
        }

        let target = DriverManager::get_driver_by_name(driver.name())?;
        dataset.create_copy(&target, path, &creation_options)?;
        Ok(())
    }
}

impl RasterIo for GdalIo {
    fn band_count(&self, path: &Path) -> Result<usize, RasterIoError> {
        Ok(Dataset::open(path)?.raster_count())
    }

    fn read_band<T: Pixel>(&self, path: &Path, band: usize) -> Result<Raster<T>, RasterIoError> {
        let dataset = Dataset::open(path)?;
        let count = dataset.raster_count();
        if band == 0 || band > count {
            return Err(RasterIoError::BandOutOfRange {
                path: path.to_path_buf(),
                band,
                count,
            });
        }

        let rasterband = dataset.rasterband(band)?;
        let (width, height) = dataset.raster_size();
        let buffer = rasterband.read_as::<T>((0, 0), (width, height), (width, height), None)?;

        let raster = Raster::from_vec(width, height, buffer.data().to_vec())?
            .with_georeference(
                dataset.geo_transform().unwrap_or(IDENTITY_TRANSFORM),
                &dataset.projection(),
            )
            .with_no_data(rasterband.no_data_value());

        debug!("read band {} of {}: {}x{}", band, path.display(), width, height);
        Ok(raster)
    }

    fn vector_extent(&self, path: &Path) -> Result<Extent, RasterIoError> {
        let dataset = Dataset::open(path)?;
        if dataset.layer_count() == 0 {
            return Err(RasterIoError::NoLayer(path.to_path_buf()));
        }
        let layer = dataset.layer(0)?;
        let envelope = layer.get_extent()?;
        Ok(Extent::new(
            envelope.MinX,
            envelope.MaxX,
            envelope.MinY,
            envelope.MaxY,
        )?)
    }

    /// The format follows the extension of `path`. The file is built under a unique
    /// temporary name next to `path` and renamed into place without overwriting
    /// an existing file.
    fn write<T: Pixel>(
        &self,
        raster: &Raster<T>,
        path: &Path,
        options: &WriteOptions,
    ) -> Result<(), RasterIoError> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let driver = OutputDriver::for_path(path)?;
        let temp_path = tempfile::Builder::new()
            .prefix(".chloris-")
            .suffix(driver.suffix())
            .tempfile_in(directory)?
            .into_temp_path();

        Self::create(raster, &temp_path, driver, options)?;
        temp_path.persist_noclobber(path)?;

        debug!("wrote {}", path.display());
        Ok(())
    }
}
