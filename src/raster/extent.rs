use super::{Pixel, Raster, RasterError};

/// Bounding box in the raster's projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self, RasterError> {
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err(RasterError::InvalidExtent(
                "coordinates must be finite".to_string(),
            ));
        }

        if xmin > xmax || ymin > ymax {
            return Err(RasterError::InvalidExtent(
                "min values must be <= max values".to_string(),
            ));
        }

        Ok(Extent {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }
}

impl<T: Pixel> Raster<T> {
    /// Smallest pixel window covering `extent`, clamped to the raster.
    pub fn crop(&self, extent: &Extent) -> Result<Raster<T>, RasterError> {
        let gt = self.geo_transform;
        if gt[2] != 0.0 || gt[4] != 0.0 {
            return Err(RasterError::RotatedTransform(gt));
        }
        if gt[1] == 0.0 || gt[5] == 0.0 {
            return Err(RasterError::SingularTransform(gt));
        }

        // Works for north-up (negative pixel height) and south-up grids alike.
        let cols = [(extent.xmin - gt[0]) / gt[1], (extent.xmax - gt[0]) / gt[1]];
        let rows = [(extent.ymax - gt[3]) / gt[5], (extent.ymin - gt[3]) / gt[5]];

        let pixel_min_x = cols[0].min(cols[1]).floor() as i64;
        let pixel_max_x = cols[0].max(cols[1]).ceil() as i64;
        let pixel_min_y = rows[0].min(rows[1]).floor() as i64;
        let pixel_max_y = rows[0].max(rows[1]).ceil() as i64;

        let start_x = pixel_min_x.max(0) as usize;
        let end_x = pixel_max_x.max(0).min(self.width as i64) as usize;
        let start_y = pixel_min_y.max(0) as usize;
        let end_y = pixel_max_y.max(0).min(self.height as i64) as usize;

        if start_x >= end_x || start_y >= end_y {
            return Err(RasterError::EmptyWindow);
        }

        let width = end_x - start_x;
        let height = end_y - start_y;
        let mut data = Vec::with_capacity(width * height);
        for row in start_y..end_y {
            let offset = row * self.width;
            data.extend_from_slice(&self.data[offset + start_x..offset + end_x]);
        }

        let mut geo_transform = gt;
        geo_transform[0] = gt[0] + start_x as f64 * gt[1];
        geo_transform[3] = gt[3] + start_y as f64 * gt[5];

        Ok(Raster {
            width,
            height,
            geo_transform,
            projection: self.projection.clone(),
            no_data: self.no_data,
            data,
        })
    }
}
