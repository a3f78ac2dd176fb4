// src/calc/range_fft.rs
use rustfft::{num_complex::Complex64, FftPlanner};
use std::f64::consts::PI;
use crate::calc::constants::SPEED_OF_LIGHT;
use crate::calc::error::{require_positive, CalcError};
use crate::calc::fmcw::range_per_bin;
use crate::calc::window::Taper;

/// Point-target beat signal to push through a range FFT.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeatSimulation {
    pub slope_hz_per_s: f64,
    pub sample_rate_hz: f64,
    pub fft_size: usize,
    pub target_range_m: f64,
    pub taper: Taper,
}

/// Half-spectrum range profile, peak normalized to 0 dB.
#[derive(Clone, Debug)]
pub struct RangeProfile {
    pub ranges_m: Vec<f64>,
    pub magnitudes_db: Vec<f64>,
    pub peak_bin: usize,
    pub peak_range_m: f64,
    pub beat_hz: f64,
    pub range_per_bin_m: f64,
}

impl BeatSimulation {
    pub fn beat_frequency(&self) -> f64 {
        2.0 * self.slope_hz_per_s * self.target_range_m / SPEED_OF_LIGHT
    }

    pub fn run(&self) -> Result<RangeProfile, CalcError> {
        let bin_m = range_per_bin(self.slope_hz_per_s, self.sample_rate_hz, self.fft_size)?;
        if self.fft_size < 2 {
            return Err(CalcError::invalid("FFT size must be at least 2"));
        }
        require_positive("target range", self.target_range_m)?;
        let beat_hz = self.beat_frequency();
        let nyquist_hz = self.sample_rate_hz / 2.0;
        if beat_hz >= nyquist_hz {
            return Err(CalcError::BeatAboveNyquist { beat_hz, nyquist_hz });
        }

        let weights = self.taper.coefficients(self.fft_size);
        let mut buffer: Vec<Complex64> = weights
            .iter()
            .enumerate()
            .map(|(n, w)| {
                let t = n as f64 / self.sample_rate_hz;
                Complex64::new(w * (2.0 * PI * beat_hz * t).cos(), 0.0)
            })
            .collect();
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(self.fft_size);
        fft.process(&mut buffer);

        let half = self.fft_size / 2;
        let magnitudes: Vec<f64> = buffer.iter().take(half).map(|c| c.norm()).collect();
        let (peak_bin, peak) = magnitudes
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0f64), |best, (i, m)| if m > best.1 { (i, m) } else { best });
        let floor = peak.max(f64::MIN_POSITIVE);
        let magnitudes_db = magnitudes
            .iter()
            .map(|m| (20.0 * (m / floor).log10()).max(-120.0))
            .collect();
        let ranges_m = (0..half).map(|k| k as f64 * bin_m).collect();
        Ok(RangeProfile {
            ranges_m,
            magnitudes_db,
            peak_bin,
            peak_range_m: peak_bin as f64 * bin_m,
            beat_hz,
            range_per_bin_m: bin_m,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn sim(range: f64) -> BeatSimulation {
        BeatSimulation {
            slope_hz_per_s: 30e12,
            sample_rate_hz: 10e6,
            fft_size: 1024,
            target_range_m: range,
            taper: Taper::Hann,
        }
    }
    #[test]
    fn peak_lands_on_the_target_bin() {
        let bin = 0.048828125;
        let profile = sim(100.0 * bin).run().unwrap();
        assert_eq!(profile.peak_bin, 100);
        assert!((profile.peak_range_m - 100.0 * bin).abs() < 1e-9);
        assert_eq!(profile.ranges_m.len(), 512);
        assert!(profile.magnitudes_db[100].abs() < 1e-12);
    }
    #[test]
    fn off_grid_target_is_within_one_bin() {
        let profile = sim(7.3).run().unwrap();
        assert!((profile.peak_range_m - 7.3).abs() <= profile.range_per_bin_m);
    }
    #[test]
    fn rejects_targets_beyond_nyquist() {
        // R_adc for this chirp is 25 m.
        assert!(matches!(sim(30.0).run(), Err(CalcError::BeatAboveNyquist { .. })));
    }
}
