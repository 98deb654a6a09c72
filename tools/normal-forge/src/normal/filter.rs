//! Separable convolution kernels: Gaussian low-pass and Sobel gradient.
//!
//! Borders use half-sample symmetric reflection (`d c b a | a b c d | d c b a`),
//! which keeps a constant field constant after filtering.

use super::field::HeightField;

/// Gaussian support in multiples of sigma.
const TRUNCATE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Along a row (x)
    Horizontal,
    /// Along a column (y)
    Vertical,
}

/// Normalized 1D Gaussian weights, length `2 * radius + 1`.
///
/// The radius is `floor(4 * sigma + 0.5)`, capped at `max_radius`.
pub fn gaussian_kernel(sigma: f32, max_radius: usize) -> Vec<f32> {
    let sigma = sigma as f64;
    let radius = (TRUNCATE * sigma + 0.5).min(max_radius as f64) as isize;
    if radius <= 0 {
        return vec![1.0];
    }
    let weights: Vec<f64> = (-radius..=radius)
        .map(|i| (-0.5 * (i * i) as f64 / (sigma * sigma)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / total) as f32).collect()
}

/// Map any index onto `0..len` by mirroring about the edges.
#[inline]
pub fn reflect_index(i: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let i = i.rem_euclid(period);
    if i >= len {
        (period - 1 - i) as usize
    } else {
        i as usize
    }
}

/// Correlate `field` with a centered odd-length `weights` along `axis`.
pub fn correlate1d(field: &HeightField, weights: &[f32], axis: Axis) -> HeightField {
    let mut out = HeightField::new(field.width, field.height);
    if field.data.is_empty() {
        return out;
    }

    let radius = (weights.len() / 2) as isize;
    let (w, h) = (field.width, field.height);

    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in weights.iter().enumerate() {
                let offset = k as isize - radius;
                let sample = match axis {
                    Axis::Horizontal => {
                        field.get(reflect_index(x as isize + offset, w as usize) as u32, y)
                    }
                    Axis::Vertical => {
                        field.get(x, reflect_index(y as isize + offset, h as usize) as u32)
                    }
                };
                acc += weight * sample;
            }
            out.set(x, y, acc);
        }
    }

    out
}

/// Gaussian blur, applied as a horizontal then a vertical pass.
///
/// The kernel radius is capped at the field's longer side.
pub fn gaussian_blur(field: &HeightField, sigma: f32) -> HeightField {
    let max_radius = field.width.max(field.height) as usize;
    let kernel = gaussian_kernel(sigma, max_radius);
    let horizontal = correlate1d(field, &kernel, Axis::Horizontal);
    correlate1d(&horizontal, &kernel, Axis::Vertical)
}

/// 3x3 Sobel derivative along `axis`, smoothed `[1, 2, 1]` across it.
///
/// Positive where the field increases with x (horizontal) or y (vertical).
pub fn sobel(field: &HeightField, axis: Axis) -> HeightField {
    const DERIVATIVE: [f32; 3] = [-1.0, 0.0, 1.0];
    const SMOOTH: [f32; 3] = [1.0, 2.0, 1.0];

    let across = match axis {
        Axis::Horizontal => Axis::Vertical,
        Axis::Vertical => Axis::Horizontal,
    };
    let derivative = correlate1d(field, &DERIVATIVE, axis);
    correlate1d(&derivative, &SMOOTH, across)
}
