pub mod conductance;
pub mod contrast_factor;
pub mod derivatives;
mod error;
pub mod image;
pub mod nonlinear_diffusion;

pub use crate::conductance::{Conductance, UnknownConductance};
pub use crate::error::{Error, InvalidInput, Result};
pub use crate::image::GrayFloatImage;

use crate::contrast_factor::estimate_kappa;
use ::image::DynamicImage;
use core::fmt;
use log::*;
use ndarray::{Array2, ArrayBase, Data, Dimension, Ix2};
use std::path::Path;

/// Kappa used when estimation finds no gradient at the requested percentile.
pub const FALLBACK_KAPPA: f64 = 0.03;

/// How the contrast parameter kappa is obtained.
///
/// Kappa is expressed on the scale of the image samples. Images loaded through
/// [`GrayFloatImage`] are normalized to `[0, 1]`, where useful values lie
/// roughly between 0.05 and 0.15. A kappa tuned for `[0, 255]` data (around
/// 30) has to be divided by 255 before it is used on normalized images.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kappa {
    /// Use this exact value, which must be positive.
    Fixed(f64),
    /// Estimate kappa once, before the first iteration, as this percentile
    /// (0-100) of the image gradient magnitudes.
    Percentile(f64),
}

impl Kappa {
    pub const DEFAULT_PERCENTILE: f64 = 90.0;

    /// Estimate kappa from the 90th percentile of the gradient magnitudes.
    pub fn estimated() -> Self {
        Kappa::Percentile(Self::DEFAULT_PERCENTILE)
    }
}

impl From<f64> for Kappa {
    fn from(kappa: f64) -> Self {
        Kappa::Fixed(kappa)
    }
}

/// Contains the parameters of one diffusion run.
///
/// The explicit scheme is only stable for `lambda <= 0.25`. Larger steps are
/// accepted, but the result may oscillate or diverge; this is left to the
/// caller.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffusionParameters {
    /// Number of diffusion steps, zero returns the input unchanged
    pub iterations: usize,

    /// The contrast parameter separating edges from noise
    pub kappa: Kappa,

    /// Step size applied to the discrete Laplacian on every iteration
    pub lambda: f64,
}

impl DiffusionParameters {
    pub fn new(iterations: usize, kappa: impl Into<Kappa>, lambda: f64) -> Self {
        Self {
            iterations,
            kappa: kappa.into(),
            lambda,
        }
    }

    /// Checks the parameters without looking at an image.
    pub fn validate(&self) -> core::result::Result<(), InvalidInput> {
        match self.kappa {
            Kappa::Fixed(k) if !(k.is_finite() && k > 0.0) => {
                return Err(InvalidInput::Kappa(k));
            }
            Kappa::Percentile(p) if !(0.0..=100.0).contains(&p) => {
                return Err(InvalidInput::Percentile(p));
            }
            _ => {}
        }
        if !self.lambda.is_finite() {
            return Err(InvalidInput::Lambda(self.lambda));
        }
        Ok(())
    }
}

impl Default for DiffusionParameters {
    fn default() -> Self {
        Self {
            iterations: 10,
            kappa: Kappa::Fixed(0.1),
            lambda: 0.25,
        }
    }
}

/// The parameters a run actually used, with kappa resolved to a value.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedParameters {
    pub iterations: usize,
    pub kappa: f64,
    pub lambda: f64,
}

impl fmt::Display for ResolvedParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iters = {}, λ = {:.3}, κ = {:.3}",
            self.iterations, self.lambda, self.kappa
        )
    }
}

/// Smooth a grayscale image with Perona-Malik anisotropic diffusion.
///
/// The input is validated (it must be a non-empty 2-dimensional array and the
/// parameters must pass [`DiffusionParameters::validate`]), kappa is resolved,
/// and the diffusion runs for exactly `params.iterations` steps on a copy of
/// the input. Nothing is computed when validation fails.
///
/// # Arguments
/// * `image` - The input image, rows along the first axis.
/// * `conductance` - The diffusivity function used for every step.
/// * `params` - Iterations, kappa and lambda.
///
/// Returns the filtered image and the parameters that were applied.
///
/// # Example
/// ```
/// use ndarray::Array2;
/// use perona_malik::{anisotropic_diffusion, Conductance, DiffusionParameters, Kappa};
///
/// let image = Array2::from_shape_fn((32, 32), |(y, x)| {
///     let base = if x < 16 { 0.2f32 } else { 0.8 };
///     base + 0.01 * (y % 2) as f32
/// });
/// let params = DiffusionParameters::new(20, Kappa::estimated(), 0.2);
/// let (filtered, applied) = anisotropic_diffusion(&image, Conductance::Exponential, &params).unwrap();
/// assert_eq!(filtered.dim(), image.dim());
/// assert!(applied.kappa > 0.0);
/// ```
pub fn anisotropic_diffusion<S, D>(
    image: &ArrayBase<S, D>,
    conductance: Conductance,
    params: &DiffusionParameters,
) -> Result<(Array2<f32>, ResolvedParameters)>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let ndim = image.ndim();
    let image = image
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| InvalidInput::Dimensionality(ndim))?;
    if image.is_empty() {
        return Err(InvalidInput::EmptyImage.into());
    }
    params.validate()?;
    if !(params.lambda > 0.0 && params.lambda <= 0.25) {
        warn!(
            "lambda={} is outside (0, 0.25], the explicit scheme may be unstable",
            params.lambda
        );
    }

    let kappa = match params.kappa {
        Kappa::Fixed(kappa) => kappa,
        Kappa::Percentile(percentile) => {
            let estimated = estimate_kappa(image, percentile);
            if estimated > 0.0 {
                estimated
            } else {
                warn!(
                    "No gradient at percentile {}, falling back to kappa={}",
                    percentile, FALLBACK_KAPPA
                );
                FALLBACK_KAPPA
            }
        }
    };
    let resolved = ResolvedParameters {
        iterations: params.iterations,
        kappa,
        lambda: params.lambda,
    };
    debug!(
        "Diffusing {} x {} image with {} conductance, {}",
        image.ncols(),
        image.nrows(),
        conductance,
        resolved
    );

    let mut filtered = image.to_owned();
    nonlinear_diffusion::diffuse(
        &mut filtered,
        conductance,
        kappa,
        params.lambda,
        params.iterations,
    );
    info!("Finished {} diffusion iterations", params.iterations);
    Ok((filtered, resolved))
}

/// Smooth an image from the image crate.
///
/// The image is converted to grayscale and normalized to `[0, 1]` before
/// diffusion, see [`GrayFloatImage::from_dynamic`].
pub fn diffuse_dynamic(
    image: &DynamicImage,
    conductance: Conductance,
    params: &DiffusionParameters,
) -> Result<(GrayFloatImage, ResolvedParameters)> {
    let float_image = GrayFloatImage::from_dynamic(image);
    let (filtered, resolved) =
        anisotropic_diffusion(&float_image.ref_array2(), conductance, params)?;
    Ok((GrayFloatImage::from_array2(filtered.view()), resolved))
}

/// Smooth an image on disk.
///
/// # Examples
/// ```no_run
/// use perona_malik::{diffuse_path, Conductance, DiffusionParameters};
/// let params = DiffusionParameters::new(60, 0.09, 0.095);
/// let (filtered, applied) = diffuse_path("canaletto.jpg", Conductance::Rational, &params).unwrap();
/// filtered.to_luma8().save("canaletto_diffused.png").unwrap();
/// println!("{}", applied);
/// ```
pub fn diffuse_path(
    path: impl AsRef<Path>,
    conductance: Conductance,
    params: &DiffusionParameters,
) -> Result<(GrayFloatImage, ResolvedParameters)> {
    diffuse_dynamic(&::image::open(path)?, conductance, params)
}
