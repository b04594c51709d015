use crate::error::Error;

use image::{DynamicImage, GrayImage, ImageFormat};
use image_compare::Algorithm;

pub struct Frame {
    pub index: usize,
    pub image: DynamicImage,
}

impl Frame {
    pub fn new(index: usize, image: DynamicImage) -> Self {
        Self { index, image }
    }

    pub fn from_bytes(index: usize, bytes: &[u8]) -> Result<Self, Error> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        Ok(Self::new(index, image))
    }

    fn luma(&self) -> GrayImage {
        self.image.to_luma8()
    }

    /// Mean of the luma plane, normalized to `[0.0, 1.0]`.
    pub fn average_luma(&self) -> f64 {
        let luma = self.luma();
        let pixels = luma.as_raw();
        if pixels.is_empty() {
            return 0.0;
        }
        let sum: u64 = pixels.iter().map(|&p| p as u64).sum();
        sum as f64 / (pixels.len() as f64 * 255.0)
    }

    /// Root-mean-squared luma difference to `other`, `0.0` for identical frames.
    pub fn difference(&self, other: &Frame) -> Result<f64, Error> {
        let similarity = image_compare::gray_similarity_structure(
            &Algorithm::RootMeanSquared,
            &self.luma(),
            &other.luma(),
        )
        .map_err(|e| Error::Compare(format!("frames {} and {}: {}", self.index, other.index, e)))?;
        Ok((1.0 - similarity.score).clamp(0.0, 1.0))
    }

    /// Mean absolute luma difference to `other`, normalized to `[0.0, 1.0]`.
    pub fn mean_difference(&self, other: &Frame) -> Result<f64, Error> {
        let (first, second) = (self.luma(), other.luma());
        if first.dimensions() != second.dimensions() {
            return Err(Error::Compare(format!(
                "frames {} and {} differ in size: {:?} and {:?}",
                self.index, other.index, first.dimensions(), second.dimensions()
            )));
        }
        let pixels = first.as_raw();
        if pixels.is_empty() {
            return Ok(0.0);
        }
        let sum: u64 = pixels.iter()
            .zip(second.as_raw())
            .map(|(&a, &b)| a.abs_diff(b) as u64)
            .sum();
        Ok(sum as f64 / (pixels.len() as f64 * 255.0))
    }
}

#[cfg(test)]
pub(crate) fn gray_frame(index: usize, value: u8) -> Frame {
    let image = GrayImage::from_pixel(4, 4, image::Luma([value]));
    Frame::new(index, DynamicImage::ImageLuma8(image))
}
