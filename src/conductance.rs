use core::fmt;
use core::str::FromStr;
use ndarray::{azip, Array2, ArrayView2};
use thiserror::Error;

/// The diffusivity function `g(|∇I|)` of the Perona-Malik scheme.
///
/// Each variant maps the magnitude of a directional difference and the
/// contrast parameter kappa to a weight in `(0, 1]`. Small differences give a
/// weight close to 1 (smoothing), large differences a weight close to 0 (edge
/// preserved). The sign of the difference never changes the weight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Conductance {
    /// `g = exp(-(δ/κ)²)`
    ///
    /// Decays fastest, so it favors high-contrast edges over wide regions.
    Exponential,
    /// `g = 1 / (1 + (δ/κ)²)`
    ///
    /// The Lorentzian diffusivity, with a wider transition band than the
    /// exponential one.
    Rational,
    /// `g = 1 / sqrt(1 + (δ/κ)²)`
    ///
    /// Sub-quadratic penalty, the most permissive towards moderate gradients.
    Charbonnier,
}

impl Conductance {
    pub const ALL: [Conductance; 3] = [
        Conductance::Exponential,
        Conductance::Rational,
        Conductance::Charbonnier,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Conductance::Exponential => "exponential",
            Conductance::Rational => "rational",
            Conductance::Charbonnier => "charbonnier",
        }
    }

    /// Computes the weight of a single signed difference.
    ///
    /// `kappa` must be positive. The ratio is formed in `f64`, so a zero
    /// difference always yields exactly 1 and an overflowing ratio yields 0
    /// instead of NaN.
    pub fn weight(self, delta: f32, kappa: f64) -> f32 {
        let ratio = f64::from(delta.abs()) / kappa;
        let s = ratio * ratio;
        let g = match self {
            Conductance::Exponential => (-s).exp(),
            Conductance::Rational => (1.0 + s).recip(),
            Conductance::Charbonnier => (1.0 + s).sqrt().recip(),
        };
        g as f32
    }

    /// Computes the conductance map of one direction.
    ///
    /// # Arguments
    /// * `differences` - Signed differences towards one neighbor
    /// * `kappa` - Contrast parameter
    /// # Return value
    /// An array of the same shape holding the weights
    pub fn map(self, differences: ArrayView2<f32>, kappa: f64) -> Array2<f32> {
        let mut conductivities = Array2::<f32>::zeros(differences.dim());
        azip!((c in &mut conductivities, &d in differences) {
            *c = self.weight(d, kappa);
        });
        conductivities
    }
}

impl Default for Conductance {
    fn default() -> Self {
        Conductance::Exponential
    }
}

impl fmt::Display for Conductance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown conductance function `{0}`, expected exponential, rational or charbonnier")]
pub struct UnknownConductance(pub String);

impl FromStr for Conductance {
    type Err = UnknownConductance;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exponential" | "exp" => Ok(Conductance::Exponential),
            "rational" | "lorentzian" => Ok(Conductance::Rational),
            "charbonnier" => Ok(Conductance::Charbonnier),
            _ => Err(UnknownConductance(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Conductance;
    use ndarray::array;

    #[test]
    fn zero_difference_has_unit_weight() {
        for conductance in Conductance::ALL {
            assert_eq!(conductance.weight(0.0, 0.1), 1.0);
            assert_eq!(conductance.weight(-0.0, 1e-30), 1.0);
        }
    }

    #[test]
    fn known_values_at_kappa() {
        let kappa = 0.1;
        let expected = [
            (Conductance::Exponential, (-1.0f32).exp()),
            (Conductance::Rational, 0.5),
            (Conductance::Charbonnier, 0.5f32.sqrt()),
        ];
        for (conductance, value) in expected {
            assert!(f32::abs(conductance.weight(0.1, kappa) - value) < 0.0001);
        }
    }

    #[test]
    fn weights_stay_in_unit_interval() {
        for conductance in Conductance::ALL {
            for &kappa in &[0.1, 1.0, 30.0] {
                for &delta in &[-0.8f32, -0.3, -0.01, 0.001, 0.05, 0.2, 0.9] {
                    let g = conductance.weight(delta, kappa);
                    assert!(g > 0.0 && g <= 1.0, "{conductance} gave {g} for {delta}/{kappa}");
                }
            }
        }
    }

    #[test]
    fn weight_ignores_sign() {
        for conductance in Conductance::ALL {
            assert_eq!(conductance.weight(0.37, 0.2), conductance.weight(-0.37, 0.2));
        }
    }

    #[test]
    fn weight_decreases_with_magnitude() {
        for conductance in Conductance::ALL {
            let mut previous = conductance.weight(0.0, 0.1);
            for i in 1..50 {
                let g = conductance.weight(i as f32 * 0.02, 0.1);
                assert!(g < previous);
                previous = g;
            }
        }
    }

    #[test]
    fn large_differences_vanish() {
        for conductance in Conductance::ALL {
            assert!(conductance.weight(1.0e6, 0.1) < 1.0e-6);
            assert_eq!(conductance.weight(f32::MAX, 1e-300), 0.0);
        }
    }

    #[test]
    fn map_preserves_shape() {
        let differences = array![[0.0f32, 0.1, -0.1], [0.5, -0.5, 0.0]];
        let map = Conductance::Rational.map(differences.view(), 0.1);
        assert_eq!(map.dim(), (2, 3));
        assert_eq!(map[(0, 0)], 1.0);
        assert!(f32::abs(map[(0, 1)] - 0.5) < 0.0001);
        assert_eq!(map[(0, 1)], map[(0, 2)]);
        assert_eq!(map[(1, 0)], map[(1, 1)]);
    }

    #[test]
    fn parse_names() {
        assert_eq!("exp".parse(), Ok(Conductance::Exponential));
        assert_eq!("Lorentzian".parse(), Ok(Conductance::Rational));
        assert_eq!(" charbonnier ".parse(), Ok(Conductance::Charbonnier));
        for conductance in Conductance::ALL {
            assert_eq!(conductance.to_string().parse(), Ok(conductance));
        }
        assert!("gaussian".parse::<Conductance>().is_err());
    }
}
