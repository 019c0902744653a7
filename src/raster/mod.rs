use gdal::raster::GdalType;
use std::fmt;

pub mod error;
pub mod extent;
pub mod resample;

pub use error::RasterError;
pub use extent::Extent;
pub use resample::resample_nearest;

/// GDAL affine transform: `[origin_x, pixel_width, row_rotation, origin_y, column_rotation, pixel_height]`.
pub type GeoTransform = [f64; 6];

pub const IDENTITY_TRANSFORM: GeoTransform = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Pixel types handled by the pipeline.
pub trait Pixel: GdalType + Copy + Default + PartialEq + fmt::Debug {
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl Pixel for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}

impl Pixel for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Pixel for i16 {
    // `as` saturates and maps NaN to 0.
    fn from_f64(value: f64) -> Self {
        value as i16
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// A single band held in memory with its georeferencing.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    pub width: usize,
    pub height: usize,
    pub geo_transform: GeoTransform,
    /// WKT, empty when the source carries no projection.
    pub projection: String,
    pub no_data: Option<f64>,
    /// Row-major pixels.
    pub data: Vec<T>,
}

impl<T: Pixel> Raster<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, RasterError> {
        if data.len() != width * height {
            return Err(RasterError::BufferSize {
                width,
                height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            geo_transform: IDENTITY_TRANSFORM,
            projection: String::new(),
            no_data: None,
            data,
        })
    }

    pub fn with_georeference(mut self, geo_transform: GeoTransform, projection: &str) -> Self {
        self.geo_transform = geo_transform;
        self.projection = projection.to_string();
        self
    }

    pub fn with_no_data(mut self, no_data: Option<f64>) -> Self {
        self.no_data = no_data;
        self
    }

    pub fn get(&self, col: usize, row: usize) -> T {
        self.data[row * self.width + col]
    }

    pub fn is_no_data(&self, value: T) -> bool {
        self.no_data.is_some_and(|nd| value.to_f64() == nd)
    }

    /// Same size, geotransform and projection as `self`, new pixels.
    pub fn derive<U: Pixel>(&self, data: Vec<U>, no_data: Option<f64>) -> Raster<U> {
        Raster {
            width: self.width,
            height: self.height,
            geo_transform: self.geo_transform,
            projection: self.projection.clone(),
            no_data,
            data,
        }
    }

    pub fn ensure_same_size<U>(&self, other: &Raster<U>) -> Result<(), RasterError> {
        if self.width != other.width || self.height != other.height {
            return Err(RasterError::SizeMismatch(
                self.width,
                self.height,
                other.width,
                other.height,
            ));
        }
        Ok(())
    }

    /// World coordinates of the center of pixel (`col`, `row`).
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        let gt = &self.geo_transform;
        let (c, r) = (col as f64 + 0.5, row as f64 + 0.5);
        (gt[0] + c * gt[1] + r * gt[2], gt[3] + c * gt[4] + r * gt[5])
    }
}

impl<T: Pixel> fmt::Display for Raster<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid = self.data.iter().filter(|&&v| !self.is_no_data(v));
        let (min, max) = valid.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            let v = v.to_f64();
            (lo.min(v), hi.max(v))
        });
        write!(
            f,
            "Width: {}\nHeight: {}\nNo data: {:?}\nMin value: {}\nMax value: {}",
            self.width, self.height, self.no_data, min, max
        )
    }
}
