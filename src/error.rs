use image::ImageError;
use thiserror::Error;

/// A parameter or shape violation detected before any diffusion step runs.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidInput {
    #[error("expected a 2-dimensional grayscale image, got {0} dimensions")]
    Dimensionality(usize),
    #[error("image has no pixels")]
    EmptyImage,
    #[error("kappa must be a positive finite number, got {0}")]
    Kappa(f64),
    #[error("kappa percentile must lie within [0, 100], got {0}")]
    Percentile(f64),
    #[error("lambda must be finite, got {0}")]
    Lambda(f64),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("failed to load image: {0}")]
    Image(#[from] ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
