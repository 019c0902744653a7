use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::ProcessingError;
use super::index::{self, MASKED_VALUE};
use crate::discovery::BandFileSet;
use crate::naming::{Affixes, generate_output_name};
use crate::product::ProductFormat;
use crate::raster::{Raster, resample_nearest};
use crate::raster_io::{RasterIo, WriteOptions};

pub const OUTPUT_PREFIX: &str = "NDVI";
pub const CONCATENATED_PREFIX: &str = "concatBGRPIP";

/// Terminal state of one processed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The output already existed and was left untouched.
    Skipped(PathBuf),
    Succeeded(PathBuf),
    Failed { output: PathBuf, reason: String },
}

impl Outcome {
    pub fn output(&self) -> &Path {
        match self {
            Outcome::Skipped(output) | Outcome::Succeeded(output) => output,
            Outcome::Failed { output, .. } => output,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Skipped(output) => write!(f, "skipped {}", output.display()),
            Outcome::Succeeded(output) => write!(f, "created {}", output.display()),
            Outcome::Failed { output, reason } => {
                write!(f, "failed {}: {}", output.display(), reason)
            }
        }
    }
}

/// Computes NDVI rasters one item at a time through a [`RasterIo`].
#[derive(Debug)]
pub struct NdviProcessor<IO> {
    io: IO,
    options: WriteOptions,
}

impl<IO: RasterIo> NdviProcessor<IO> {
    /// `options` applies to band-mode outputs; concatenated outputs use driver defaults.
    pub fn new(io: IO, options: WriteOptions) -> Self {
        Self { io, options }
    }

    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Cloud-masked NDVI scaled to [-1000, 1000] from separate red, NIR and
    /// cloud mask files, optionally clipped to the extent of `shapefile`.
    pub fn compute_band_mode(
        &self,
        set: &BandFileSet,
        output_dir: &Path,
        shapefile: Option<&Path>,
    ) -> Outcome {
        let name = generate_output_name(
            &set.red,
            Some(set.format),
            &Affixes::prefix(OUTPUT_PREFIX),
        );
        let output = output_dir.join(name);

        Self::run_once(output, |output| {
            let ndvi = self.band_pipeline(set, shapefile)?;
            self.io.write(&ndvi, output, &self.options)?;
            Ok(())
        })
    }

    /// Plain NDVI from two bands (1-based) of a multi-band image.
    pub fn compute_concatenated_mode(
        &self,
        input: &Path,
        nir_band: usize,
        red_band: usize,
        output_dir: &Path,
    ) -> Outcome {
        let affixes = Affixes {
            prefix: OUTPUT_PREFIX,
            prefix2: CONCATENATED_PREFIX,
            suffix: "",
        };
        let name = generate_output_name(input, Some(ProductFormat::TheiaL2a), &affixes);
        let output = output_dir.join(name);

        Self::run_once(output, |output| {
            let count = self.io.band_count(input)?;
            debug!(
                "{} has {} band(s), using nir={} red={}",
                input.display(),
                count,
                nir_band,
                red_band
            );
            let nir: Raster<f32> = self.io.read_band(input, nir_band)?;
            let red: Raster<f32> = self.io.read_band(input, red_band)?;
            let ndvi = index::normalized_difference(&nir, &red)?;
            self.io.write(&ndvi, output, &WriteOptions::plain())?;
            Ok(())
        })
    }

    fn band_pipeline(
        &self,
        set: &BandFileSet,
        shapefile: Option<&Path>,
    ) -> Result<Raster<i16>, ProcessingError> {
        let nir: Raster<f32> = self.io.read_band(&set.nir, 1)?;
        let red: Raster<f32> = self.io.read_band(&set.red, 1)?;
        let mask: Raster<i16> = self.io.read_band(&set.cloud_mask, 1)?;

        // Cloud masks may come at a coarser resolution than the 10 m bands.
        let mask = resample_nearest(&mask, &nir, MASKED_VALUE)?;

        let ndvi = index::scaled_ndvi(&nir, &red)?;
        let ndvi = index::apply_cloud_mask(&ndvi, &mask, set.format.cloud_free_value())?;
        let mut ndvi = index::to_int16(&ndvi);

        if let Some(shapefile) = shapefile {
            info!("shape file used: {}", shapefile.display());
            let extent = self.io.vector_extent(shapefile)?;
            ndvi = ndvi.crop(&extent)?;
        }

        debug!("NDVI statistics\n{}", ndvi);
        Ok(ndvi)
    }

    /// Existence check, then `produce`; any error becomes [`Outcome::Failed`].
    fn run_once<F>(output: PathBuf, produce: F) -> Outcome
    where
        F: FnOnce(&Path) -> Result<(), ProcessingError>,
    {
        if output.exists() {
            info!(
                "File {} already exists, it has not been created again",
                output.display()
            );
            return Outcome::Skipped(output);
        }

        match produce(&output) {
            Ok(()) => {
                info!("NDVI File created: {}", output.display());
                Outcome::Succeeded(output)
            }
            Err(e) => {
                error!("error while generating NDVI image {}: {}", output.display(), e);
                Outcome::Failed {
                    output,
                    reason: e.to_string(),
                }
            }
        }
    }
}
