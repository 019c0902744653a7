use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use super::processor::{NdviProcessor, Outcome};
use crate::discovery::BandFileSet;
use crate::raster_io::RasterIo;

/// Tally of a batch, one entry per processed item.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub skipped: Vec<PathBuf>,
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Skipped(output) => self.skipped.push(output),
            Outcome::Succeeded(output) => self.succeeded.push(output),
            Outcome::Failed { output, reason } => self.failed.push((output, reason)),
        }
    }

    pub fn total(&self) -> usize {
        self.skipped.len() + self.succeeded.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} item(s): {} created, {} skipped, {} failed",
            self.total(),
            self.succeeded.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

/// Runs every discovered item through an [`NdviProcessor`], one after the other.
/// A failing item is recorded and the batch moves on.
#[derive(Debug)]
pub struct BatchRunner<IO> {
    processor: NdviProcessor<IO>,
    output_dir: PathBuf,
}

impl<IO: RasterIo> BatchRunner<IO> {
    pub fn new<P: AsRef<Path>>(processor: NdviProcessor<IO>, output_dir: P) -> Self {
        BatchRunner {
            processor,
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn processor(&self) -> &NdviProcessor<IO> {
        &self.processor
    }

    pub fn run_bands(&self, sets: &[BandFileSet], shapefile: Option<&Path>) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, set) in sets.iter().enumerate() {
            info!(
                "[{}/{}] computing NDVI from {}",
                index + 1,
                sets.len(),
                set.red.display()
            );
            let outcome = self
                .processor
                .compute_band_mode(set, &self.output_dir, shapefile);
            report.record(outcome);
        }
        info!("{}", report);
        report
    }

    pub fn run_concatenated(
        &self,
        inputs: &[PathBuf],
        nir_band: usize,
        red_band: usize,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, input) in inputs.iter().enumerate() {
            info!(
                "[{}/{}] computing NDVI from {}",
                index + 1,
                inputs.len(),
                input.display()
            );
            let outcome = self.processor.compute_concatenated_mode(
                input,
                nir_band,
                red_band,
                &self.output_dir,
            );
            report.record(outcome);
        }
        info!("{}", report);
        report
    }
}
