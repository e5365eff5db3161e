use crate::{conductance::Conductance, derivatives::DirectionalDifferences};
use log::*;
use ndarray::{azip, Array2};

/// This function performs a scalar non-linear diffusion step.
///
/// # Arguments
/// * `image` - Image in the evolution, updated in place
/// * `conductance` - The diffusivity function applied to each directional difference
/// * `kappa` - Contrast parameter, must be positive
/// * `lambda` - The step size, stable for values up to 0.25
///
/// Forward Euler scheme on the 4-neighbor stencil:
/// I += lambda * (cN * dN + cS * dS + cE * dE + cW * dW)
///
/// All differences and conductivities are taken from the image before the
/// update, so the order in which pixels are written does not matter.
pub fn calculate_step(image: &mut Array2<f32>, conductance: Conductance, kappa: f64, lambda: f32) {
    let differences = DirectionalDifferences::compute(image.view());
    let conductivities = conductance_maps(&differences, conductance, kappa);
    let mut laplacian = Array2::<f32>::zeros(image.dim());
    for (conductivity, difference) in conductivities.iter().zip(differences.as_array()) {
        azip!((l in &mut laplacian, &c in conductivity, &d in difference) {
            *l += c * d;
        });
    }
    image.scaled_add(lambda, &laplacian);
}

/// Runs `iterations` diffusion steps with fixed parameters.
///
/// Zero iterations leave the image untouched.
pub fn diffuse(
    image: &mut Array2<f32>,
    conductance: Conductance,
    kappa: f64,
    lambda: f64,
    iterations: usize,
) {
    let lambda = lambda as f32;
    for i in 0..iterations {
        trace!("Starting diffusion step {}.", i);
        calculate_step(image, conductance, kappa, lambda);
    }
}

/// Conductance maps in north, south, east, west order.
fn conductance_maps(
    differences: &DirectionalDifferences,
    conductance: Conductance,
    kappa: f64,
) -> [Array2<f32>; 4] {
    let map = |d: &Array2<f32>| conductance.map(d.view(), kappa);
    #[cfg(not(feature = "rayon"))]
    {
        [
            map(&differences.north),
            map(&differences.south),
            map(&differences.east),
            map(&differences.west),
        ]
    }
    #[cfg(feature = "rayon")]
    {
        let ((north, south), (east, west)) = rayon::join(
            || rayon::join(|| map(&differences.north), || map(&differences.south)),
            || rayon::join(|| map(&differences.east), || map(&differences.west)),
        );
        [north, south, east, west]
    }
}
