// src/calc/constants.rs
//! Physical constants shared by the radar calculators.
//!
//! The rounded values match the ones the FMCW debug tooling has always used,
//! so printed results stay comparable with older worksheets.

use std::f64::consts::PI;

/// Speed of light used by every radar formula (m/s).
pub const SPEED_OF_LIGHT: f64 = 3.0e8;
/// Boltzmann constant _k_ in joules per kelvin (J/K).
pub const BOLTZMANN: f64 = 1.380_648_52e-23;
/// Reference noise temperature T0 (K).
pub const REFERENCE_TEMP_K: f64 = 290.0;
/// Default impedance for power/voltage conversions (Ω).
pub const DEFAULT_IMPEDANCE_OHMS: f64 = 50.0;

/// `(4π)³`, the denominator of the monostatic radar equation.
#[inline]
#[must_use]
pub fn four_pi_cubed() -> f64 {
    (4.0 * PI).powi(3)
}

/// Free-space wavelength in meters for a frequency in hertz.
#[inline]
#[must_use]
pub fn wavelength(hz: f64) -> f64 {
    SPEED_OF_LIGHT / hz
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn wavelength_at_77_ghz() {
        let lam = wavelength(77e9);
        assert!((lam * 1000.0 - 3.896).abs() < 1e-3);
    }
    #[test]
    fn four_pi_cubed_value() {
        assert!((four_pi_cubed() - 1984.4017).abs() < 1e-3);
    }
}
