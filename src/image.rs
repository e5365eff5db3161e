use derive_more::{Deref, DerefMut};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use log::*;
use ndarray::{Array2, ArrayView2};
use nshare::RefNdarray2;

type GrayImageBuffer = ImageBuffer<Luma<f32>, Vec<f32>>;

/// A single channel floating point image with samples normalized to `[0, 1]`.
///
/// The buffer is owned by the image crate so it can be created from and
/// converted back to ordinary 8/16-bit images, while the diffusion itself
/// works on an `ndarray` view of the same memory (rows along axis 0).
#[derive(Debug, Clone, Deref, DerefMut)]
pub struct GrayFloatImage(pub GrayImageBuffer);

impl GrayFloatImage {
    /// Create a unit float image from the image crate's DynamicImage type.
    ///
    /// Color images are converted to luma first.
    ///
    /// # Arguments
    /// * `input_image` - the input image.
    /// # Return value
    /// An image with pixel values between 0 and 1.
    pub fn from_dynamic(input_image: &DynamicImage) -> Self {
        let width = input_image.width();
        let height = input_image.height();
        Self(match input_image.grayscale() {
            DynamicImage::ImageLuma8(gray_image) => {
                info!("Loaded a {} x {} 8-bit image", width, height);
                ImageBuffer::from_fn(width, height, |x, y| {
                    Luma([f32::from(gray_image[(x, y)][0]) / 255f32])
                })
            }
            DynamicImage::ImageLumaA8(gray_image) => {
                info!("Loaded a {} x {} 8-bit image with alpha", width, height);
                ImageBuffer::from_fn(width, height, |x, y| {
                    Luma([f32::from(gray_image[(x, y)][0]) / 255f32])
                })
            }
            DynamicImage::ImageLuma16(gray_image) => {
                info!("Loaded a {} x {} 16-bit image", width, height);
                ImageBuffer::from_fn(width, height, |x, y| {
                    Luma([f32::from(gray_image[(x, y)][0]) / 65535f32])
                })
            }
            other => {
                info!(
                    "Loaded a {} x {} image, converting to 16-bit luma",
                    width, height
                );
                let gray_image = other.to_luma16();
                ImageBuffer::from_fn(width, height, |x, y| {
                    Luma([f32::from(gray_image[(x, y)][0]) / 65535f32])
                })
            }
        })
    }

    pub fn from_array2(arr: ArrayView2<f32>) -> Self {
        let (height, width) = arr.dim();
        Self(ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
            Luma([arr[(y as usize, x as usize)]])
        }))
    }

    pub fn ref_array2(&self) -> ArrayView2<f32> {
        self.0.ref_ndarray2()
    }

    pub fn to_array2(&self) -> Array2<f32> {
        self.ref_array2().to_owned()
    }

    /// Quantize to an 8-bit grayscale image, clamping samples to `[0, 1]`.
    pub fn to_luma8(&self) -> GrayImage {
        GrayImage::from_fn(self.0.width(), self.0.height(), |x, y| {
            let value = self.0[(x, y)][0].clamp(0.0, 1.0);
            Luma([(value * 255.0).round() as u8])
        })
    }

    pub fn width(&self) -> usize {
        self.0.width() as usize
    }

    pub fn height(&self) -> usize {
        self.0.height() as usize
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.get_pixel(x as u32, y as u32)[0]
    }
}
