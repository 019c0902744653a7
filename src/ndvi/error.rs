use thiserror::Error;

use crate::raster::RasterError;
use crate::raster_io::RasterIoError;

/// Failure of one item; the batch carries on with the next one.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Io(#[from] RasterIoError),
    #[error(transparent)]
    Raster(#[from] RasterError),
}
