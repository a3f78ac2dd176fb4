// src/calc/fmcw.rs
//! FMCW chirp arithmetic and radar-equation range limits.
//!
//! Slope `S = B / Tc`; a target at range `R` produces a beat tone at
//! `f_b = 2·S·R / c`. All functions take SI units (Hz, s, m, W) unless the
//! parameter name says otherwise.
use std::fmt;
use crate::calc::constants::{four_pi_cubed, wavelength, BOLTZMANN, REFERENCE_TEMP_K, SPEED_OF_LIGHT};
use crate::calc::error::{require_positive, CalcError};
use crate::calc::units::{db_to_power_ratio, dbm_to_watts};

pub fn slope(bandwidth_hz: f64, chirp_time_s: f64) -> Result<f64, CalcError> {
    Ok(require_positive("bandwidth", bandwidth_hz)? / require_positive("chirp time", chirp_time_s)?)
}

/// Range covered by one FFT bin.
pub fn range_per_bin(slope_hz_per_s: f64, sample_rate_hz: f64, fft_size: usize) -> Result<f64, CalcError> {
    let slope_hz_per_s = require_positive("slope", slope_hz_per_s)?;
    let fs = require_positive("sample rate", sample_rate_hz)?;
    if fft_size == 0 {
        return Err(CalcError::invalid("FFT size must be at least 1"));
    }
    let bin_bw = fs / fft_size as f64;
    Ok(SPEED_OF_LIGHT * bin_bw / (2.0 * slope_hz_per_s))
}

/// `c / 2B`.
pub fn range_resolution(bandwidth_hz: f64) -> Result<f64, CalcError> {
    Ok(SPEED_OF_LIGHT / (2.0 * require_positive("bandwidth", bandwidth_hz)?))
}

/// `λ / 4Tc` for a chirp repetition period `Tc`.
pub fn max_velocity(carrier_hz: f64, chirp_period_s: f64) -> Result<f64, CalcError> {
    let lam = wavelength(require_positive("carrier frequency", carrier_hz)?);
    Ok(lam / (4.0 * require_positive("chirp period", chirp_period_s)?))
}

/// `λ / 2·N·Tc`.
pub fn velocity_resolution(carrier_hz: f64, chirp_period_s: f64, num_chirps: usize) -> Result<f64, CalcError> {
    if num_chirps == 0 {
        return Err(CalcError::invalid("number of chirps must be at least 1"));
    }
    let lam = wavelength(require_positive("carrier frequency", carrier_hz)?);
    Ok(lam / (2.0 * num_chirps as f64 * require_positive("chirp period", chirp_period_s)?))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeLimit {
    AdcNyquist,
    IfBandwidth,
    ChirpTiming,
}
impl fmt::Display for RangeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RangeLimit::AdcNyquist => "ADC Nyquist",
            RangeLimit::IfBandwidth => "IF bandwidth",
            RangeLimit::ChirpTiming => "chirp timing",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaxRange {
    pub slope_hz_per_s: f64,
    /// Beat tone at fs/2.
    pub adc_limit_m: f64,
    /// Beat tone at the IF filter edge, if one was given.
    pub if_limit_m: Option<f64>,
    /// Round trip equal to the chirp duration.
    pub timing_limit_m: f64,
    pub unambiguous_m: f64,
    pub limiting: RangeLimit,
}

pub fn max_range(
    sample_rate_hz: f64,
    chirp_time_s: f64,
    bandwidth_hz: f64,
    if_max_hz: Option<f64>,
) -> Result<MaxRange, CalcError> {
    let fs = require_positive("sample rate", sample_rate_hz)?;
    let s = slope(bandwidth_hz, chirp_time_s)?;
    let adc_limit_m = SPEED_OF_LIGHT * fs / (4.0 * s);
    let if_limit_m = if_max_hz
        .map(|f| require_positive("IF bandwidth", f).map(|f| SPEED_OF_LIGHT * f / (2.0 * s)))
        .transpose()?;
    let timing_limit_m = SPEED_OF_LIGHT * chirp_time_s / 2.0;

    let mut limiting = RangeLimit::AdcNyquist;
    let mut unambiguous_m = adc_limit_m;
    if let Some(r_if) = if_limit_m {
        if r_if < unambiguous_m {
            unambiguous_m = r_if;
            limiting = RangeLimit::IfBandwidth;
        }
    }
    if timing_limit_m < unambiguous_m {
        unambiguous_m = timing_limit_m;
        limiting = RangeLimit::ChirpTiming;
    }
    Ok(MaxRange {
        slope_hz_per_s: s,
        adc_limit_m,
        if_limit_m,
        timing_limit_m,
        unambiguous_m,
        limiting,
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearField {
    pub wavelength_m: f64,
    /// Fraunhofer distance `2D²/λ`.
    pub far_field_m: f64,
}

pub fn near_field(carrier_hz: f64, aperture_m: f64) -> Result<NearField, CalcError> {
    let lam = wavelength(require_positive("carrier frequency", carrier_hz)?);
    let d = require_positive("aperture", aperture_m)?;
    Ok(NearField {
        wavelength_m: lam,
        far_field_m: 2.0 * d * d / lam,
    })
}

/// Classic CW radar range for a minimum detectable power (all linear).
pub fn max_range_cw(
    tx_power_w: f64,
    tx_gain: f64,
    rx_gain: f64,
    carrier_hz: f64,
    rcs_m2: f64,
    loss: f64,
    min_power_w: f64,
) -> Result<f64, CalcError> {
    let lam = wavelength(require_positive("carrier frequency", carrier_hz)?);
    let numerator = require_positive("Tx power", tx_power_w)?
        * require_positive("Tx gain", tx_gain)?
        * require_positive("Rx gain", rx_gain)?
        * lam.powi(2)
        * require_positive("RCS", rcs_m2)?;
    let denominator =
        four_pi_cubed() * require_positive("loss", loss)? * require_positive("minimum power", min_power_w)?;
    Ok((numerator / denominator).powf(0.25))
}

/// Radar-equation inputs as they are entered on the FMCW tab (dB units).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadarEquationInputs {
    pub tx_power_dbm: f64,
    pub tx_gain_dbi: f64,
    pub rx_gain_dbi: f64,
    pub carrier_hz: f64,
    pub rcs_m2: f64,
    pub system_loss_db: f64,
    pub noise_figure_db: f64,
    pub noise_temp_k: f64,
    pub if_bandwidth_hz: f64,
    pub snr_min_db: f64,
    pub range_bins: usize,
    pub doppler_bins: usize,
}
impl Default for RadarEquationInputs {
    fn default() -> Self {
        Self {
            tx_power_dbm: 12.0,
            tx_gain_dbi: 10.0,
            rx_gain_dbi: 10.0,
            carrier_hz: 77e9,
            rcs_m2: 1.0,
            system_loss_db: 2.0,
            noise_figure_db: 10.0,
            noise_temp_k: REFERENCE_TEMP_K,
            if_bandwidth_hz: 10e6,
            snr_min_db: 15.0,
            range_bins: 1024,
            doppler_bins: 64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FmcwRange {
    pub max_range_m: f64,
    /// `k·T0·NF·B_IF` in watts.
    pub noise_power_w: f64,
    /// Coherent integration gain `N_range·N_doppler` (linear).
    pub processing_gain: f64,
    pub processing_gain_db: f64,
    /// Same link without integration gain, `Pmin = Pn·SNR_min`.
    pub cw_range_m: f64,
}

pub fn max_range_fmcw(inputs: &RadarEquationInputs) -> Result<FmcwRange, CalcError> {
    if inputs.range_bins == 0 || inputs.doppler_bins == 0 {
        return Err(CalcError::invalid("range and Doppler bin counts must be at least 1"));
    }
    let pt = dbm_to_watts(inputs.tx_power_dbm);
    let gt = db_to_power_ratio(inputs.tx_gain_dbi);
    let gr = db_to_power_ratio(inputs.rx_gain_dbi);
    let loss = db_to_power_ratio(inputs.system_loss_db);
    let nf = db_to_power_ratio(inputs.noise_figure_db);
    let snr_min = db_to_power_ratio(inputs.snr_min_db);
    let noise_power_w = BOLTZMANN
        * require_positive("noise temperature", inputs.noise_temp_k)?
        * nf
        * require_positive("IF bandwidth", inputs.if_bandwidth_hz)?;
    let processing_gain = inputs.range_bins as f64 * inputs.doppler_bins as f64;

    let cw_range_m = max_range_cw(
        pt,
        gt,
        gr,
        inputs.carrier_hz,
        inputs.rcs_m2,
        loss,
        noise_power_w * snr_min,
    )?;
    // Integration gain enters the numerator, so it scales range by G^(1/4).
    let max_range_m = cw_range_m * processing_gain.powf(0.25);
    Ok(FmcwRange {
        max_range_m,
        noise_power_w,
        processing_gain,
        processing_gain_db: 10.0 * processing_gain.log10(),
        cw_range_m,
    })
}

/// Chirp parameters as entered on the FMCW tab.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChirpConfig {
    pub carrier_hz: f64,
    pub bandwidth_hz: f64,
    pub chirp_time_s: f64,
    /// Chirp repetition period, at least the ramp time.
    pub chirp_period_s: f64,
    pub sample_rate_hz: f64,
    pub fft_size: usize,
    pub num_chirps: usize,
    pub if_max_hz: Option<f64>,
}
impl Default for ChirpConfig {
    fn default() -> Self {
        Self {
            carrier_hz: 77e9,
            bandwidth_hz: 2e9,
            chirp_time_s: 50e-6,
            chirp_period_s: 60e-6,
            sample_rate_hz: 10e6,
            fft_size: 1024,
            num_chirps: 64,
            if_max_hz: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChirpSummary {
    pub slope_hz_per_s: f64,
    pub range_resolution_m: f64,
    pub range_per_bin_m: f64,
    pub max_range: MaxRange,
    pub max_velocity_mps: f64,
    pub velocity_resolution_mps: f64,
    pub wavelength_m: f64,
}
impl ChirpConfig {
    pub fn summarize(&self) -> Result<ChirpSummary, CalcError> {
        if self.chirp_period_s < self.chirp_time_s {
            return Err(CalcError::invalid("chirp period cannot be shorter than the chirp ramp"));
        }
        let s = slope(self.bandwidth_hz, self.chirp_time_s)?;
        Ok(ChirpSummary {
            slope_hz_per_s: s,
            range_resolution_m: range_resolution(self.bandwidth_hz)?,
            range_per_bin_m: range_per_bin(s, self.sample_rate_hz, self.fft_size)?,
            max_range: max_range(self.sample_rate_hz, self.chirp_time_s, self.bandwidth_hz, self.if_max_hz)?,
            max_velocity_mps: max_velocity(self.carrier_hz, self.chirp_period_s)?,
            velocity_resolution_mps: velocity_resolution(self.carrier_hz, self.chirp_period_s, self.num_chirps)?,
            wavelength_m: wavelength(require_positive("carrier frequency", self.carrier_hz)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn close(a: f64, b: f64, rel: f64) -> bool {
        ((a - b) / b).abs() < rel
    }
    #[test]
    fn range_per_bin_matches_debug_case() {
        // 30 MHz/us, 10 MS/s, 1024-point FFT.
        let r = range_per_bin(30e12, 10e6, 1024).unwrap();
        assert!((r - 0.048828125).abs() < 1e-9);
        assert!(range_per_bin(30e12, 10e6, 0).is_err());
    }
    #[test]
    fn max_range_limits() {
        let r = max_range(10e6, 50e-6, 2e9, None).unwrap();
        assert!((r.slope_hz_per_s - 4e13).abs() < 1.0);
        assert!((r.adc_limit_m - 18.75).abs() < 1e-9);
        assert!((r.timing_limit_m - 7500.0).abs() < 1e-6);
        assert_eq!(r.if_limit_m, None);
        assert_eq!(r.limiting, RangeLimit::AdcNyquist);
        assert!((r.unambiguous_m - 18.75).abs() < 1e-9);

        let r = max_range(10e6, 50e-6, 2e9, Some(2e6)).unwrap();
        assert!((r.if_limit_m.unwrap() - 7.5).abs() < 1e-9);
        assert_eq!(r.limiting, RangeLimit::IfBandwidth);

        // Slow ramp, fast ADC: the round trip dominates.
        let r = max_range(1e9, 1e-9, 1e6, None).unwrap();
        assert_eq!(r.limiting, RangeLimit::ChirpTiming);
        assert!((r.unambiguous_m - 0.15).abs() < 1e-12);
    }
    #[test]
    fn fraunhofer_distance() {
        let nf = near_field(77e9, 0.1).unwrap();
        assert!((nf.wavelength_m * 1000.0 - 3.896).abs() < 1e-3);
        assert!((nf.far_field_m - 5.1333).abs() < 1e-3);
    }
    #[test]
    fn fmcw_range_scales_with_fourth_root_of_gain() {
        let r = max_range_fmcw(&RadarEquationInputs::default()).unwrap();
        assert_eq!(r.processing_gain, 65_536.0);
        assert!((r.max_range_m / r.cw_range_m - 16.0).abs() < 1e-9);
        assert!((r.processing_gain_db - 48.165).abs() < 1e-3);
        assert!(close(r.noise_power_w, 4.004e-13, 1e-3));
        assert!(r.max_range_m > 70.0 && r.max_range_m < 90.0);
    }
    #[test]
    fn cw_range_closed_form() {
        // Unity everything: R^4 = λ² / (4π)³.
        let lam = wavelength(3e8);
        let r = max_range_cw(1.0, 1.0, 1.0, 3e8, 1.0, 1.0, 1.0).unwrap();
        assert!(close(r.powi(4), lam * lam / four_pi_cubed(), 1e-12));
        assert!(max_range_cw(0.0, 1.0, 1.0, 3e8, 1.0, 1.0, 1.0).is_err());
    }
    #[test]
    fn chirp_summary_velocity_terms() {
        let s = ChirpConfig::default().summarize().unwrap();
        let lam = 3e8 / 77e9;
        assert!(close(s.max_velocity_mps, lam / (4.0 * 60e-6), 1e-12));
        assert!(close(s.velocity_resolution_mps, lam / (2.0 * 64.0 * 60e-6), 1e-12));
        assert!((s.range_resolution_m - 0.075).abs() < 1e-12);
        let bad = ChirpConfig {
            chirp_period_s: 10e-6,
            ..ChirpConfig::default()
        };
        assert!(bad.summarize().is_err());
    }
}
