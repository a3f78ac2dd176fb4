// src/calc/window.rs
//! Amplitude tapers for array weighting and FFT input.
use std::f64::consts::PI;
use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Taper {
    /// No weighting.
    #[default]
    Uniform,
    /// Raised cosine.
    Hann,
    /// Slightly lower first sidelobe than Hann.
    Hamming,
    /// Best sidelobe rejection of the set, widest main lobe.
    Blackman,
}
impl Taper {
    pub const ALL: [Taper; 4] = [Taper::Uniform, Taper::Hann, Taper::Hamming, Taper::Blackman];
    pub fn label(self) -> &'static str {
        match self {
            Taper::Uniform => "Uniform",
            Taper::Hann => "Hann",
            Taper::Hamming => "Hamming",
            Taper::Blackman => "Blackman",
        }
    }
    /// Symmetric weights of length `n`.
    ///
    /// The cosine argument runs over `2π(k+1)/(n+1)` so the end elements keep
    /// a non-zero weight; a 4-element Hann array still uses all 4 elements.
    pub fn coefficients(self, n: usize) -> Vec<f64> {
        if n == 0 {
            return Vec::new();
        }
        (0..n)
            .map(|k| {
                let x = 2.0 * PI * (k + 1) as f64 / (n + 1) as f64;
                match self {
                    Taper::Uniform => 1.0,
                    Taper::Hann => 0.5 - 0.5 * x.cos(),
                    Taper::Hamming => 0.54 - 0.46 * x.cos(),
                    Taper::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
                }
            })
            .collect()
    }
}
impl fmt::Display for Taper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn uniform_is_flat() {
        assert_eq!(Taper::Uniform.coefficients(3), vec![1.0, 1.0, 1.0]);
        assert!(Taper::Hann.coefficients(0).is_empty());
    }
    #[test]
    fn tapers_are_symmetric_and_positive() {
        for taper in Taper::ALL {
            let w = taper.coefficients(9);
            for k in 0..w.len() {
                assert!(w[k] > 0.0, "{taper} weight {k} is {}", w[k]);
                assert!((w[k] - w[w.len() - 1 - k]).abs() < 1e-12);
            }
        }
    }
    #[test]
    fn hann_peaks_in_the_middle() {
        let w = Taper::Hann.coefficients(5);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert!(w[0] < w[1] && w[1] < w[2]);
    }
}
