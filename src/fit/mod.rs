//! Per-cell polynomial color models
//!
//! Each cell gets one polynomial per channel, fitted to the pixels the cell
//! owns by area-weighted least squares. Singular normal matrices degrade
//! through the staged fallback quadratic -> linear -> constant, so a fit
//! always produces finite coefficients.

use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};

use crate::image::Image;
use crate::raster::{pixel_center, pixel_width, PixelSet};

/// Coefficients per channel for degrees 0, 1 and 2
const COEFF_COUNT: [usize; 3] = [1, 3, 6];

/// A per-channel polynomial of degree 0, 1 or 2 over domain coordinates
///
/// Degree 1 evaluates `a*x + b*y + c`, degree 2 the full quadratic
/// `a*x^2 + b*x*y + c*y^2 + d*x + e*y + f`.
#[derive(Debug, Clone, Default)]
pub struct Polynomial {
    degree: usize,
    coeff: Vec<f64>,
}

impl Polynomial {
    /// Fit one polynomial per image channel to the pixels of `pixels`
    pub fn fit(image: &Image, pixels: &PixelSet, degree: usize) -> Self {
        let degree = degree.min(2);
        match degree {
            0 => Self::fit_constant(image, pixels),
            1 => Self::fit_linear(image, pixels),
            _ => Self::fit_quadratic(image, pixels),
        }
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coeff
    }

    /// Evaluate channel `c` at domain coordinates `(x, y)`
    pub fn evaluate(&self, c: usize, x: f64, y: f64) -> f64 {
        match self.degree {
            0 => self.coeff.get(c).copied().unwrap_or(0.0),
            1 => {
                let k = c * 3;
                self.coeff[k] * x + self.coeff[k + 1] * y + self.coeff[k + 2]
            }
            _ => {
                let k = c * 6;
                self.coeff[k] * x * x
                    + self.coeff[k + 1] * x * y
                    + self.coeff[k + 2] * y * y
                    + self.coeff[k + 3] * x
                    + self.coeff[k + 4] * y
                    + self.coeff[k + 5]
            }
        }
    }

    /// Reconstruction error of this fit over the pixel set
    ///
    /// `sum_pixels area * sum_channels |observed - evaluated|^lp`
    pub fn energy(&self, image: &Image, pixels: &PixelSet, lp: u32) -> f64 {
        let width = image.width();
        let height = image.height();
        let pix_area = pixel_width(width) * pixel_width(width);

        let mut result = 0.0;
        for (j, l, r) in pixels.rows() {
            for i in l..=r {
                let p = pixel_center(width, height, i, j);
                let color = image.pixel(i, j);

                let mut pixel_energy = 0.0;
                for c in 0..image.channels() {
                    let diff = (color[c] as f64 - self.evaluate(c, p.x, p.y)).abs();
                    pixel_energy += diff.powi(lp as i32);
                }

                result += pixel_energy * pix_area;
            }
        }

        result
    }

    fn fit_constant(image: &Image, pixels: &PixelSet) -> Self {
        let channels = image.channels();
        let mut coeff = vec![0.0; channels];

        let mut count = 0usize;
        for (j, l, r) in pixels.rows() {
            for i in l..=r {
                let color = image.pixel(i, j);
                for c in 0..channels {
                    coeff[c] += color[c] as f64;
                }
                count += 1;
            }
        }

        if count > 0 {
            for value in coeff.iter_mut() {
                *value /= count as f64;
            }
        }

        Self { degree: 0, coeff }
    }

    fn fit_linear(image: &Image, pixels: &PixelSet) -> Self {
        let channels = image.channels();
        let width = image.width();
        let height = image.height();
        let pix_area = pixel_width(width) * pixel_width(width);

        let mut mats = vec![Matrix3::<f64>::zeros(); channels];
        let mut rhs = vec![Vector3::<f64>::zeros(); channels];

        for (j, l, r) in pixels.rows() {
            for i in l..=r {
                let p = pixel_center(width, height, i, j);
                let color = image.pixel(i, j);

                let temp = [p.x * pix_area, p.y * pix_area, pix_area];
                for c in 0..channels {
                    for k in 0..3 {
                        rhs[c][k] += color[c] as f64 * temp[k];

                        mats[c][(0, k)] += p.x * temp[k];
                        mats[c][(1, k)] += p.y * temp[k];
                        mats[c][(2, k)] += temp[k];
                    }
                }
            }
        }

        let mut coeff = vec![0.0; channels * COEFF_COUNT[1]];
        for c in 0..channels {
            let solved = if mats[c].determinant().abs() > f64::EPSILON {
                mats[c].lu().solve(&rhs[c])
            } else {
                None
            };

            match solved {
                Some(x) => coeff[c * 3..c * 3 + 3].copy_from_slice(x.as_slice()),
                None => {
                    // constant fallback from the pure-area cell
                    if mats[c][(2, 2)] != 0.0 {
                        coeff[c * 3 + 2] = rhs[c][2] / mats[c][(2, 2)];
                    }
                }
            }
        }

        Self { degree: 1, coeff }
    }

    fn fit_quadratic(image: &Image, pixels: &PixelSet) -> Self {
        let channels = image.channels();
        let width = image.width();
        let height = image.height();
        let pix_area = pixel_width(width) * pixel_width(width);

        let mut mats = vec![Matrix6::<f64>::zeros(); channels];
        let mut rhs = vec![Vector6::<f64>::zeros(); channels];

        for (j, l, r) in pixels.rows() {
            for i in l..=r {
                let p = pixel_center(width, height, i, j);
                let color = image.pixel(i, j);

                let temp = [
                    p.x * p.x * pix_area,
                    p.x * p.y * pix_area,
                    p.y * p.y * pix_area,
                    p.x * pix_area,
                    p.y * pix_area,
                    pix_area,
                ];
                for c in 0..channels {
                    for k in 0..6 {
                        rhs[c][k] += color[c] as f64 * temp[k];

                        mats[c][(0, k)] += p.x * p.x * temp[k];
                        mats[c][(1, k)] += p.x * p.y * temp[k];
                        mats[c][(2, k)] += p.y * p.y * temp[k];
                        mats[c][(3, k)] += p.x * temp[k];
                        mats[c][(4, k)] += p.y * temp[k];
                        mats[c][(5, k)] += temp[k];
                    }
                }
            }
        }

        let mut coeff = vec![0.0; channels * COEFF_COUNT[2]];
        for c in 0..channels {
            let solved = if mats[c].determinant().abs() > f64::EPSILON {
                mats[c].lu().solve(&rhs[c])
            } else {
                None
            };

            if let Some(x) = solved {
                coeff[c * 6..c * 6 + 6].copy_from_slice(x.as_slice());
                continue;
            }

            // linear fallback on the lower-order sub-block of the normal
            // equations
            let sub: Matrix3<f64> = mats[c].fixed_view::<3, 3>(3, 3).into_owned();
            let sub_rhs: Vector3<f64> = rhs[c].fixed_rows::<3>(3).into_owned();

            let solved = if sub.determinant().abs() > f64::EPSILON {
                sub.lu().solve(&sub_rhs)
            } else {
                None
            };

            match solved {
                Some(x) => coeff[c * 6 + 3..c * 6 + 6].copy_from_slice(x.as_slice()),
                None => {
                    // constant fallback
                    if mats[c][(5, 5)] != 0.0 {
                        coeff[c * 6 + 5] = rhs[c][5] / mats[c][(5, 5)];
                    }
                }
            }
        }

        Self { degree: 2, coeff }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::rasterize;
    use glam::DVec2;

    fn full_pixels(width: usize, height: usize) -> PixelSet {
        let ratio = height as f64 / width as f64;
        rasterize(
            &[
                DVec2::new(-1.0, -ratio),
                DVec2::new(1.0, -ratio),
                DVec2::new(1.0, ratio),
                DVec2::new(-1.0, ratio),
            ],
            width,
            height,
        )
    }

    fn gray_image(width: usize, height: usize, f: impl Fn(i32, i32) -> u8) -> Image {
        let mut data = vec![0u8; width * height];
        for j in 0..height {
            for i in 0..width {
                data[j * width + i] = f(i as i32, j as i32);
            }
        }
        Image::from_raw(data, width, height, 1).unwrap()
    }

    #[test]
    fn test_constant_fit_is_pixel_mean() {
        let image = gray_image(4, 4, |i, j| (i + 4 * j) as u8);
        let pixels = full_pixels(4, 4);

        let poly = Polynomial::fit(&image, &pixels, 0);
        let mean = (0..16).sum::<i32>() as f64 / 16.0;
        assert!((poly.evaluate(0, 0.3, -0.2) - mean).abs() < 1e-9);
    }

    #[test]
    fn test_constant_fit_multichannel() {
        let mut data = Vec::new();
        for _ in 0..8 {
            data.extend_from_slice(&[10, 200, 77]);
        }
        let image = Image::from_raw(data, 4, 2, 3).unwrap();
        let pixels = full_pixels(4, 2);

        let poly = Polynomial::fit(&image, &pixels, 0);
        assert!((poly.evaluate(0, 0.0, 0.0) - 10.0).abs() < 1e-9);
        assert!((poly.evaluate(1, 0.0, 0.0) - 200.0).abs() < 1e-9);
        assert!((poly.evaluate(2, 0.0, 0.0) - 77.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_fit_recovers_column_ramp() {
        // byte value depends linearly on the pixel column
        let image = gray_image(8, 8, |i, _| (10 + 20 * i) as u8);
        let pixels = full_pixels(8, 8);

        let poly = Polynomial::fit(&image, &pixels, 1);
        for j in 0..8 {
            for i in 0..8 {
                let p = pixel_center(8, 8, i, j);
                let expected = (10 + 20 * i) as f64;
                assert!(
                    (poly.evaluate(0, p.x, p.y) - expected).abs() < 1e-6,
                    "pixel ({}, {})",
                    i,
                    j
                );
            }
        }

        // a perfect fit has (numerically) zero energy
        assert!(poly.energy(&image, &pixels, 2) < 1e-12);
    }

    #[test]
    fn test_quadratic_fit_on_single_pixel_falls_back() {
        let image = gray_image(8, 8, |_, _| 42);
        let mut pixels = PixelSet::new();
        pixels.ymin = 3;
        pixels.ymax = 3;
        pixels.left = vec![5];
        pixels.right = vec![5];

        // one sample cannot determine 6 coefficients; the staged fallback
        // lands on the constant model
        let poly = Polynomial::fit(&image, &pixels, 2);
        for (x, y) in [(0.0, 0.0), (-0.9, 0.7), (0.5, -0.5)] {
            let value = poly.evaluate(0, x, y);
            assert!(value.is_finite());
            assert!((value - 42.0).abs() < 1e-6, "evaluated {}", value);
        }
    }

    #[test]
    fn test_quadratic_fit_on_single_row_falls_back_finite() {
        // collinear samples: quadratic and full linear systems are singular
        let image = gray_image(8, 8, |i, _| (5 * i) as u8);
        let mut pixels = PixelSet::new();
        pixels.ymin = 2;
        pixels.ymax = 2;
        pixels.left = vec![0];
        pixels.right = vec![7];

        let poly = Polynomial::fit(&image, &pixels, 2);
        for (x, y) in [(0.0, 0.0), (0.8, -0.8), (-1.0, 1.0)] {
            assert!(poly.evaluate(0, x, y).is_finite());
        }
    }

    #[test]
    fn test_empty_pixel_set() {
        let image = gray_image(4, 4, |_, _| 9);
        let pixels = PixelSet::new();

        for degree in 0..=2 {
            let poly = Polynomial::fit(&image, &pixels, degree);
            assert!(poly.evaluate(0, 0.1, 0.1).is_finite());
            assert_eq!(poly.energy(&image, &pixels, 2), 0.0);
        }
    }

    #[test]
    fn test_energy_positive_for_bad_fit() {
        let image = gray_image(4, 4, |i, j| if (i + j) % 2 == 0 { 0 } else { 255 });
        let pixels = full_pixels(4, 4);

        let poly = Polynomial::fit(&image, &pixels, 0);
        assert!(poly.energy(&image, &pixels, 2) > 0.0);
    }
}
