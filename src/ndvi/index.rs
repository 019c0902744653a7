use crate::raster::{Raster, RasterError};

/// Keeps the scaled ratio finite when both reflectances are zero.
pub const EPSILON: f32 = 1.0e-6;
/// Scaled indices span [-1000, 1000] and fit in 16-bit integers.
pub const SCALE: f32 = 1000.0;
/// Value written where the pixel is cloudy or carries no data.
pub const MASKED_VALUE: i16 = 0;

pub fn scaled_ndvi_value(nir: f32, red: f32) -> f32 {
    (nir - red) / (nir + red + EPSILON) * SCALE
}

/// Plain ratio, 0 where `nir + red` is zero.
pub fn ndvi_value(nir: f32, red: f32) -> f32 {
    let sum = nir + red;
    if sum.abs() < EPSILON {
        0.0
    } else {
        (nir - red) / sum
    }
}

/// Scaled NDVI of two co-registered bands; a no-data pixel in either band gives 0.
pub fn scaled_ndvi(nir: &Raster<f32>, red: &Raster<f32>) -> Result<Raster<f32>, RasterError> {
    nir.ensure_same_size(red)?;

    let data = nir
        .data
        .iter()
        .zip(&red.data)
        .map(|(&n, &r)| {
            if nir.is_no_data(n) || red.is_no_data(r) {
                MASKED_VALUE as f32
            } else {
                scaled_ndvi_value(n, r)
            }
        })
        .collect();

    Ok(nir.derive(data, None))
}

/// Zeroes every pixel whose mask value differs from `cloud_free`.
pub fn apply_cloud_mask(
    index: &Raster<f32>,
    mask: &Raster<i16>,
    cloud_free: i16,
) -> Result<Raster<f32>, RasterError> {
    index.ensure_same_size(mask)?;

    let data = index
        .data
        .iter()
        .zip(&mask.data)
        .map(|(&value, &flag)| {
            if flag == cloud_free {
                value
            } else {
                MASKED_VALUE as f32
            }
        })
        .collect();

    Ok(index.derive(data, index.no_data))
}

/// Truncating, saturating conversion; the result declares 0 as no-data.
pub fn to_int16(index: &Raster<f32>) -> Raster<i16> {
    let data = index.data.iter().map(|&v| v as i16).collect();
    index.derive(data, Some(MASKED_VALUE as f64))
}

/// Unscaled NDVI used for pre-concatenated images.
pub fn normalized_difference(
    nir: &Raster<f32>,
    red: &Raster<f32>,
) -> Result<Raster<f32>, RasterError> {
    nir.ensure_same_size(red)?;
    let data = nir
        .data
        .iter()
        .zip(&red.data)
        .map(|(&n, &r)| ndvi_value(n, r))
        .collect();
    Ok(nir.derive(data, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(values: Vec<f32>) -> Raster<f32> {
        Raster::from_vec(values.len(), 1, values).unwrap()
    }

    #[test]
    fn test_scaled_ndvi_bounds() {
        let samples = [0.0_f32, 1.0, 37.5, 500.0, 2999.0, 10000.0, 65535.0];
        for &nir in &samples {
            for &red in &samples {
                let v = scaled_ndvi_value(nir, red);
                assert!(v.is_finite());
                assert!((-1000.0..=1000.0).contains(&v), "nir={nir} red={red} -> {v}");
            }
        }
    }

    #[test]
    fn test_zero_reflectance_gives_zero() {
        assert_eq!(scaled_ndvi_value(0.0, 0.0), 0.0);
        assert_eq!(ndvi_value(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_scaled_ndvi_values() {
        let nir = band(vec![3000.0, 1000.0, 2000.0]);
        let red = band(vec![1000.0, 3000.0, 2000.0]);
        let index = scaled_ndvi(&nir, &red).unwrap();

        assert!((index.data[0] - 500.0).abs() < 1e-3);
        assert!((index.data[1] + 500.0).abs() < 1e-3);
        assert_eq!(index.data[2], 0.0);
    }

    #[test]
    fn test_scaled_ndvi_no_data() {
        let nir = band(vec![-10000.0, 3000.0]).with_no_data(Some(-10000.0));
        let red = band(vec![1000.0, 1000.0]);
        let index = scaled_ndvi(&nir, &red).unwrap();
        assert_eq!(index.data[0], 0.0);
        assert!(index.data[1] > 0.0);
    }

    #[test]
    fn test_cloud_mask_substitution() {
        let index = band(vec![812.0, -300.0, 999.0, 450.0]);
        let mask = Raster::<i16>::from_vec(4, 1, vec![4, 0, 4, 1]).unwrap();

        let masked = apply_cloud_mask(&index, &mask, 4).unwrap();
        assert_eq!(masked.data, vec![812.0, 0.0, 999.0, 0.0]);
    }

    #[test]
    fn test_size_mismatch() {
        let index = band(vec![1.0, 2.0]);
        let mask = Raster::<i16>::from_vec(1, 1, vec![0]).unwrap();
        assert!(apply_cloud_mask(&index, &mask, 0).is_err());
    }

    #[test]
    fn test_to_int16_truncates() {
        let index = band(vec![812.9, -0.7, -999.9]);
        let out = to_int16(&index);
        assert_eq!(out.data, vec![812, 0, -999]);
        assert_eq!(out.no_data, Some(0.0));
    }

    #[test]
    fn test_normalized_difference() {
        let nir = band(vec![0.6, 0.0, 0.2]);
        let red = band(vec![0.2, 0.0, 0.6]);
        let index = normalized_difference(&nir, &red).unwrap();
        assert!((index.data[0] - 0.5).abs() < 1e-6);
        assert_eq!(index.data[1], 0.0);
        assert!((index.data[2] + 0.5).abs() < 1e-6);
    }
}
