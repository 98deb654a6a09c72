//! Row-major grids used by the synthesizer

use glam::Vec3;
use image::RgbImage;

/// Scalar height per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl HeightField {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    /// Height = mean of the three channels, each normalized to [0, 1].
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let data = image
            .pixels()
            .map(|p| {
                let sum = p[0] as f32 + p[1] as f32 + p[2] as f32;
                sum / (3.0 * 255.0)
            })
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        self.data[(y * self.width + x) as usize] = value;
    }

    /// Element-wise `self - other`. Both fields must share dimensions.
    pub fn sub(&self, other: &HeightField) -> HeightField {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        HeightField {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| a - b)
                .collect(),
        }
    }

    pub fn scale(mut self, factor: f32) -> HeightField {
        for v in &mut self.data {
            *v *= factor;
        }
        self
    }
}

/// Unit-length tangent-space vector per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<Vec3>,
}

impl NormalMap {
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        self.data[(y * self.width + x) as usize]
    }
}
