//! Normal map synthesis from diffuse textures
//!
//! The diffuse image is treated as a height field: the channel mean is
//! high-pass filtered (height minus its Gaussian blur) so only fine detail
//! contributes, then Sobel gradients of that residual tilt a straight-up
//! tangent-space normal.
//!
//! Channel layout of the output: R = -slope along x, G = -slope along y,
//! B = up. A flat region encodes as (128, 128, 255).

mod field;
mod filter;

pub use field::{HeightField, NormalMap};
pub use filter::{Axis, correlate1d, gaussian_blur, gaussian_kernel, reflect_index, sobel};

use glam::Vec3;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

use crate::config::SynthesisParams;
use crate::error::{ForgeError, Result};
use crate::fsutil::write_atomic;

/// Compute unit normals for `image`. Pure and deterministic.
pub fn synthesize(image: &RgbImage, params: &SynthesisParams) -> NormalMap {
    let height = HeightField::from_rgb(image);
    let low = gaussian_blur(&height, params.sigma);
    let detail = height.sub(&low);

    let slope_x = sobel(&detail, Axis::Horizontal).scale(params.strength);
    let slope_y = sobel(&detail, Axis::Vertical).scale(params.strength);

    let data = slope_x
        .data
        .iter()
        .zip(&slope_y.data)
        .map(|(&sx, &sy)| {
            let v = Vec3::new(-sx, -sy, 1.0);
            v / (sx * sx + sy * sy + 1.0).sqrt()
        })
        .collect();

    NormalMap {
        width: height.width,
        height: height.height,
        data,
    }
}

/// Map one component from [-1, 1] to a byte.
#[inline]
pub fn encode_component(c: f32) -> u8 {
    ((c * 0.5 + 0.5) * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Inverse of [`encode_component`] for a whole pixel.
pub fn decode_pixel(pixel: [u8; 3]) -> Vec3 {
    let d = |b: u8| (b as f32 / 255.0) * 2.0 - 1.0;
    Vec3::new(d(pixel[0]), d(pixel[1]), d(pixel[2]))
}

impl NormalMap {
    /// Quantize to an 8-bit RGB image of the same size.
    pub fn to_rgb8(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let n = self.get(x, y);
            Rgb([
                encode_component(n.x),
                encode_component(n.y),
                encode_component(n.z),
            ])
        })
    }
}

/// Decode a diffuse texture as 8-bit RGB (alpha and grayscale are converted).
pub fn load_diffuse(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|source| ForgeError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Encode and atomically write `image`, creating parent directories.
///
/// The container format follows the output extension, PNG when unknown.
pub fn save_normal_map(image: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ForgeError::PathResolution {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), format)
        .map_err(|e| ForgeError::ImageWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    write_atomic(path, &encoded).map_err(|e| ForgeError::ImageWrite {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Read `input`, synthesize its normal map and write it to `output`.
pub fn generate_normal_map(input: &Path, output: &Path, params: &SynthesisParams) -> Result<()> {
    let diffuse = load_diffuse(input)?;
    let normals = synthesize(&diffuse, params);
    save_normal_map(&normals.to_rgb8(), output)?;

    tracing::debug!(
        "Synthesized {}x{} normal map (strength={}, sigma={})",
        normals.width,
        normals.height,
        params.strength,
        params.sigma
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use tempfile::tempdir;

    /// Left half black, right half white.
    fn step_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    /// Deterministic pseudo-random texture
    fn noisy_image(width: u32, height: u32) -> RgbImage {
        let mut state = 0x2545_f491u32;
        RgbImage::from_fn(width, height, |_, _| {
            let mut next = || {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            };
            Rgb([next(), next(), next()])
        })
    }

    #[test]
    fn test_flat_image_is_neutral() {
        let img = RgbImage::from_pixel(16, 12, Rgb([90, 140, 200]));
        let normals = synthesize(&img, &Preset::Standard.params());

        assert!(normals.data.iter().all(|n| (*n - Vec3::Z).length() < 1e-4));

        let rgb = normals.to_rgb8();
        for p in rgb.pixels() {
            let n = decode_pixel(p.0);
            assert!((n - Vec3::Z).length() < 2.0 / 255.0 * 2.0, "pixel {:?}", p.0);
            assert_eq!(p.0[2], 255);
        }
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let img = noisy_image(24, 20);
        for preset in [Preset::Standard, Preset::Soft] {
            let normals = synthesize(&img, &preset.params());
            for n in &normals.data {
                assert!((n.length() - 1.0).abs() < 1e-3, "{:?}", n);
                assert!(n.z > 0.0);
            }
        }
    }

    #[test]
    fn test_quantized_pixels_decode_near_unit() {
        let img = noisy_image(24, 20);
        let rgb = synthesize(&img, &Preset::Standard.params()).to_rgb8();
        // Per-channel rounding error is at most 1/255 after decoding
        let tolerance = 3.0_f32.sqrt() / 255.0 + 1e-3;
        for p in rgb.pixels() {
            let len = decode_pixel(p.0).length();
            assert!((len - 1.0).abs() <= tolerance, "{:?} -> {}", p.0, len);
        }
    }

    #[test]
    fn test_step_edge_tilts_against_slope() {
        let img = step_image(16, 8);
        let normals = synthesize(&img, &Preset::Standard.params());

        // Brightness rises with x at the edge, so the normal leans toward -x
        let edge = normals.get(7, 4);
        assert!(edge.x < -0.1, "{:?}", edge);
        assert_eq!(edge.y, 0.0);

        let rgb = normals.to_rgb8();
        let p = rgb.get_pixel(8, 4).0;
        assert!(p[0] < 128);
        assert_eq!(p[1], 128);
    }

    #[test]
    fn test_strength_scales_tilt() {
        let img = step_image(16, 8);
        let soft = synthesize(&img, &SynthesisParams::new(1.0, 2.0).unwrap());
        let strong = synthesize(&img, &SynthesisParams::new(10.0, 2.0).unwrap());
        assert!(strong.get(7, 4).x < soft.get(7, 4).x);
    }

    #[test]
    fn test_huge_sigma_on_tiny_image() {
        let img = noisy_image(2, 2);
        let normals = synthesize(&img, &SynthesisParams::new(10.0, 1e9).unwrap());
        assert_eq!(normals.data.len(), 4);
        for n in &normals.data {
            assert!((n.length() - 1.0).abs() < 1e-3, "{:?}", n);
        }
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let img = noisy_image(17, 9);
        let params = Preset::Soft.params();
        assert_eq!(
            synthesize(&img, &params).to_rgb8().into_raw(),
            synthesize(&img, &params).to_rgb8().into_raw()
        );
    }

    #[test]
    fn test_encode_component_bounds() {
        assert_eq!(encode_component(-1.0), 0);
        assert_eq!(encode_component(1.0), 255);
        assert_eq!(encode_component(0.0), 128);
        assert_eq!(encode_component(3.0), 255);
    }

    #[test]
    fn test_generate_round_trip_on_disk() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("28.png");
        let output = dir.path().join("nested").join("28_normal.png");
        noisy_image(10, 6).save(&input).unwrap();

        generate_normal_map(&input, &output, &Preset::Standard.params()).unwrap();

        let written = image::open(&output).unwrap().to_rgb8();
        assert_eq!(written.dimensions(), (10, 6));
    }

    #[test]
    fn test_undecodable_source_is_image_read_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("broken.jpg");
        std::fs::write(&input, b"not a jpeg").unwrap();

        let err = generate_normal_map(&input, &dir.path().join("out.png"), &Preset::Standard.params())
            .unwrap_err();
        assert!(matches!(err, ForgeError::ImageRead { .. }));
    }

    #[test]
    fn test_blocked_parent_is_path_resolution_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a dir").unwrap();

        let img = RgbImage::from_pixel(2, 2, Rgb([10, 10, 10]));
        let err = save_normal_map(&img, &blocker.join("sub").join("x_normal.png")).unwrap_err();
        assert!(matches!(err, ForgeError::PathResolution { .. }));
    }

    #[test]
    fn test_output_onto_directory_is_image_write_error() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("taken_normal.png");
        std::fs::create_dir(&output).unwrap();

        let img = RgbImage::from_pixel(2, 2, Rgb([10, 10, 10]));
        let err = save_normal_map(&img, &output).unwrap_err();
        assert!(matches!(err, ForgeError::ImageWrite { .. }), "{:?}", err);
        assert!(output.is_dir());

        // No temp file is left next to the target
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }
}
