use crate::derivatives::{gradient_x, gradient_y};
use float_ord::FloatOrd;
use log::*;
use ndarray::{azip, ArrayView2};

/// This function computes a good empirical value for the kappa contrast
/// parameter given an input image and a percentile (0-100).
///
/// The image gradient is taken with central differences (one-sided at the
/// borders) and kappa is the requested percentile of the gradient magnitudes
/// of all pixels, linearly interpolated between the two closest ranks.
/// Percentile 0 therefore yields the smallest magnitude and 100 the largest.
///
/// # Arguments
/// * `image` - Input image
/// * `percentile` - Percentile of the gradient magnitude distribution (0-100),
///   values outside of that range are clamped
/// # Return value
/// kappa contrast parameter, 0 for an empty image
pub fn estimate_kappa(image: ArrayView2<f32>, percentile: f64) -> f64 {
    let gx = gradient_x(image);
    let gy = gradient_y(image);
    let mut magnitudes = Vec::with_capacity(image.len());
    azip!((&x in &gx, &y in &gy) {
        magnitudes.push((f64::from(x).powi(2) + f64::from(y).powi(2)).sqrt());
    });
    let kappa = interpolated_percentile(&mut magnitudes, percentile.clamp(0.0, 100.0));
    debug!(
        "Estimated kappa={} at percentile {} of {} gradient magnitudes",
        kappa,
        percentile,
        magnitudes.len()
    );
    kappa
}

/// Sorts `values` and returns the linearly interpolated percentile.
fn interpolated_percentile(values: &mut [f64], percentile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by_key(|&v| FloatOrd(v));
    let rank = percentile / 100.0 * (values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(values.len() - 1);
    let fraction = rank - lower as f64;
    values[lower] + (values[upper] - values[lower]) * fraction
}
