use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RasterError {
    #[error("buffer holds {actual} pixels, expected {width}x{height}")]
    BufferSize {
        width: usize,
        height: usize,
        actual: usize,
    },
    #[error("raster size mismatch: {0}x{1} vs {2}x{3}")]
    SizeMismatch(usize, usize, usize, usize),
    #[error("geotransform is not invertible: {0:?}")]
    SingularTransform([f64; 6]),
    #[error("rotated geotransforms are not supported: {0:?}")]
    RotatedTransform([f64; 6]),
    #[error("CRS mismatch between `{0}` and `{1}`")]
    CrsMismatch(String, String),
    #[error("invalid extent: {0}")]
    InvalidExtent(String),
    #[error("extent does not intersect the raster")]
    EmptyWindow,
}
