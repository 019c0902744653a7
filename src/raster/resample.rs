use super::{GeoTransform, Pixel, Raster, RasterError};

/// Maps world coordinates back to fractional pixel coordinates.
struct InverseTransform {
    gt: GeoTransform,
    det: f64,
}

impl InverseTransform {
    fn new(gt: &GeoTransform) -> Result<Self, RasterError> {
        let det = gt[1] * gt[5] - gt[2] * gt[4];
        if det == 0.0 || !det.is_finite() {
            return Err(RasterError::SingularTransform(*gt));
        }
        Ok(Self { gt: *gt, det })
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let gt = &self.gt;
        let (dx, dy) = (x - gt[0], y - gt[3]);
        let col = (gt[5] * dx - gt[2] * dy) / self.det;
        let row = (-gt[4] * dx + gt[1] * dy) / self.det;
        (col, row)
    }
}

/// Resamples `source` onto the grid of `reference` with nearest-neighbour
/// interpolation. Reference pixels whose center falls outside `source` get `fill`.
///
/// Both rasters must share a projection; an empty projection is accepted as-is.
pub fn resample_nearest<T: Pixel, U: Pixel>(
    source: &Raster<T>,
    reference: &Raster<U>,
    fill: T,
) -> Result<Raster<T>, RasterError> {
    if !source.projection.is_empty()
        && !reference.projection.is_empty()
        && source.projection != reference.projection
    {
        return Err(RasterError::CrsMismatch(
            source.projection.clone(),
            reference.projection.clone(),
        ));
    }

    let to_source = InverseTransform::new(&source.geo_transform)?;
    let mut data = Vec::with_capacity(reference.width * reference.height);

    for row in 0..reference.height {
        for col in 0..reference.width {
            let (x, y) = reference.pixel_center(col, row);
            let (src_col, src_row) = to_source.apply(x, y);
            let (src_col, src_row) = (src_col.floor(), src_row.floor());

            let inside = src_col >= 0.0
                && src_row >= 0.0
                && src_col < source.width as f64
                && src_row < source.height as f64;
            data.push(if inside {
                source.get(src_col as usize, src_row as usize)
            } else {
                fill
            });
        }
    }

    Ok(Raster {
        width: reference.width,
        height: reference.height,
        geo_transform: reference.geo_transform,
        projection: reference.projection.clone(),
        no_data: source.no_data,
        data,
    })
}
