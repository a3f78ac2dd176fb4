// src/calc/array.rs
//! T-shaped MIMO array geometry and array-factor analysis.
//!
//! Transmit elements form the horizontal bar of the T, receive elements the
//! vertical stem hanging below its center. The virtual array seen after MIMO
//! processing is every Tx position plus every Rx position, which for this
//! geometry is a full `tx_count × rx_count` rectangular grid.
//!
//! Positions are in wavelengths. The array factor along a principal cut is
//!
//! `AF(θ) = |Σ w_n · exp(j·2π·x_n·(sin θ − sin θ0))| / Σ|w_n|`
//!
//! evaluated for every angle sample at once as an `M × N` phase matrix.
use std::f64::consts::PI;
use std::fmt;
use log::debug;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use crate::calc::error::CalcError;
use crate::calc::window::Taper;

pub const MAX_VIRTUAL_ELEMENTS: usize = 4096;
pub const MIN_SAMPLES: usize = 3;
pub const MAX_SAMPLES: usize = 20_000;
/// Floor applied to the dB pattern so nulls stay plottable.
pub const PATTERN_FLOOR_DB: f64 = -100.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleSampling {
    pub min_deg: f64,
    pub max_deg: f64,
    pub samples: usize,
}
impl Default for AngleSampling {
    fn default() -> Self {
        // 0.1° steps over the visible half space.
        Self {
            min_deg: -90.0,
            max_deg: 90.0,
            samples: 1801,
        }
    }
}
impl AngleSampling {
    fn angles(&self) -> Result<Array1<f64>, CalcError> {
        if !(MIN_SAMPLES..=MAX_SAMPLES).contains(&self.samples) {
            return Err(CalcError::invalid(format!(
                "angle samples must be between {MIN_SAMPLES} and {MAX_SAMPLES}"
            )));
        }
        if !(self.min_deg >= -90.0 && self.max_deg <= 90.0 && self.min_deg < self.max_deg) {
            return Err(CalcError::invalid("angle span must be an increasing range within ±90°"));
        }
        Ok(Array1::linspace(self.min_deg, self.max_deg, self.samples))
    }
}

#[derive(Clone, Debug)]
pub struct BeamPattern {
    pub angles_deg: Vec<f64>,
    pub linear: Vec<f64>,
    pub db: Vec<f64>,
}

/// Array factor of a linear arrangement of elements at `positions_wl`.
pub fn compute_pattern(
    positions_wl: &[f64],
    weights: &[f64],
    steer_deg: f64,
    sampling: &AngleSampling,
) -> Result<BeamPattern, CalcError> {
    if positions_wl.is_empty() || positions_wl.len() != weights.len() {
        return Err(CalcError::InvalidArray(format!(
            "{} positions but {} weights",
            positions_wl.len(),
            weights.len()
        )));
    }
    if !steer_deg.is_finite() || steer_deg.abs() > 90.0 {
        return Err(CalcError::invalid("steering angle must be within ±90°"));
    }
    let angles = sampling.angles()?;
    let x = Array1::from(positions_wl.to_vec());
    let w = Array1::from(weights.to_vec());
    let norm = w.mapv(f64::abs).sum();
    if norm == 0.0 {
        return Err(CalcError::InvalidArray("all element weights are zero".into()));
    }
    let u0 = steer_deg.to_radians().sin();
    let du = angles.mapv(|a| a.to_radians().sin() - u0);
    let phase = Array2::from_shape_fn((du.len(), x.len()), |(i, n)| 2.0 * PI * x[n] * du[i]);
    let re = phase.mapv(f64::cos).dot(&w);
    let im = phase.mapv(f64::sin).dot(&w);
    let linear = (&re * &re + &im * &im).mapv(f64::sqrt) / norm;
    let db = linear.mapv(|v| (20.0 * v.log10()).max(PATTERN_FLOOR_DB));
    Ok(BeamPattern {
        angles_deg: angles.to_vec(),
        linear: linear.to_vec(),
        db: db.to_vec(),
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct BeamMetrics {
    pub peak_deg: f64,
    pub peak_db: f64,
    pub half_power_deg: Option<(f64, f64)>,
    pub beamwidth_3db_deg: Option<f64>,
    pub first_nulls_deg: (Option<f64>, Option<f64>),
    /// Highest non-grating sidelobe relative to the peak.
    pub peak_sidelobe_db: Option<f64>,
    pub grating_lobes_deg: Vec<f64>,
}

/// Main-lobe, sidelobe and grating-lobe figures for a computed pattern.
///
/// The main lobe is the local maximum reached by climbing from the sample
/// closest to `steer_deg`. Lobes outside the first nulls that come within
/// `grating_threshold_db` of the peak are reported as grating lobes.
pub fn analyze(
    pattern: &BeamPattern,
    steer_deg: f64,
    grating_threshold_db: f64,
) -> Result<BeamMetrics, CalcError> {
    let a = &pattern.angles_deg;
    let db = &pattern.db;
    let len = db.len();
    if len < MIN_SAMPLES || a.len() != len {
        return Err(CalcError::invalid("pattern has too few samples"));
    }
    if !(grating_threshold_db.is_finite() && grating_threshold_db >= 0.0) {
        return Err(CalcError::invalid("grating threshold must be a non-negative dB value"));
    }

    let mut peak = a
        .iter()
        .enumerate()
        .min_by(|(_, x), (_, y)| (*x - steer_deg).abs().total_cmp(&(*y - steer_deg).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0);
    loop {
        if peak + 1 < len && db[peak + 1] > db[peak] {
            peak += 1;
        } else if peak > 0 && db[peak - 1] > db[peak] {
            peak -= 1;
        } else {
            break;
        }
    }
    let peak_db = db[peak];

    let level = peak_db - 3.0;
    let lerp = |i: usize, j: usize| a[i] + (level - db[i]) * (a[j] - a[i]) / (db[j] - db[i]);
    let left = (1..=peak).rev().find(|&j| db[j - 1] < level).map(|j| lerp(j - 1, j));
    let right = (peak..len - 1).find(|&j| db[j + 1] < level).map(|j| lerp(j + 1, j));
    let half_power_deg = left.zip(right);
    let beamwidth_3db_deg = half_power_deg.map(|(l, r)| r - l);

    let mut lo = peak;
    while lo > 0 && db[lo - 1] <= db[lo] {
        lo -= 1;
    }
    let mut hi = peak;
    while hi + 1 < len && db[hi + 1] <= db[hi] {
        hi += 1;
    }
    let first_nulls_deg = (
        (lo > 0).then(|| a[lo]),
        (hi + 1 < len).then(|| a[hi]),
    );

    let mut grating_lobes_deg = Vec::new();
    let mut peak_sidelobe_db: Option<f64> = None;
    for i in (0..len).filter(|&i| i < lo || i > hi) {
        let rising = i == 0 || db[i] > db[i - 1];
        let falling = i == len - 1 || db[i] >= db[i + 1];
        if !(rising && falling) {
            continue;
        }
        let rel = db[i] - peak_db;
        if rel >= -grating_threshold_db {
            grating_lobes_deg.push(a[i]);
        } else {
            peak_sidelobe_db = Some(peak_sidelobe_db.map_or(rel, |p| p.max(rel)));
        }
    }
    debug!(
        "beam metrics: peak {:.2}° bw {:?} psl {:?} grating {:?}",
        a[peak], beamwidth_3db_deg, peak_sidelobe_db, grating_lobes_deg
    );
    Ok(BeamMetrics {
        peak_deg: a[peak],
        peak_db,
        half_power_deg,
        beamwidth_3db_deg,
        first_nulls_deg,
        peak_sidelobe_db,
        grating_lobes_deg,
    })
}

/// Grating lobe directions of a uniform linear array, `asin(sin θ0 + m/d)`.
pub fn predicted_grating_lobes(spacing_wl: f64, steer_deg: f64) -> Vec<f64> {
    if !(spacing_wl.is_finite() && spacing_wl > 0.0) {
        return Vec::new();
    }
    let u0 = steer_deg.to_radians().sin();
    let reach = (2.0 * spacing_wl).ceil() as i64;
    let mut lobes: Vec<f64> = (-reach..=reach)
        .filter(|&m| m != 0)
        .map(|m| u0 + m as f64 / spacing_wl)
        .filter(|u| u.abs() <= 1.0 + 1e-12)
        .map(|u| u.clamp(-1.0, 1.0).asin().to_degrees())
        .collect();
    lobes.sort_by(f64::total_cmp);
    lobes
}

/// Largest element spacing (in wavelengths) that keeps grating lobes out of
/// visible space when steering to `steer_deg`.
pub fn max_grating_free_spacing(steer_deg: f64) -> f64 {
    1.0 / (1.0 + steer_deg.to_radians().sin().abs())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementRole {
    Tx,
    Rx,
    Virtual,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Element {
    pub role: ElementRole,
    pub x_wl: f64,
    pub y_wl: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cut {
    /// Pattern in the x–z plane, driven by the Tx bar.
    #[default]
    Azimuth,
    /// Pattern in the y–z plane, driven by the Rx stem.
    Elevation,
}
impl fmt::Display for Cut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cut::Azimuth => "Azimuth",
            Cut::Elevation => "Elevation",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TShapeLayout {
    pub tx_count: usize,
    pub rx_count: usize,
    pub tx_spacing_wl: f64,
    pub rx_spacing_wl: f64,
}
impl Default for TShapeLayout {
    fn default() -> Self {
        Self {
            tx_count: 8,
            rx_count: 4,
            tx_spacing_wl: 0.5,
            rx_spacing_wl: 0.5,
        }
    }
}
impl TShapeLayout {
    pub fn validate(&self) -> Result<(), CalcError> {
        if self.tx_count == 0 || self.rx_count == 0 {
            return Err(CalcError::InvalidArray("need at least one Tx and one Rx element".into()));
        }
        for (name, d) in [("Tx", self.tx_spacing_wl), ("Rx", self.rx_spacing_wl)] {
            if !(d.is_finite() && d > 0.0) {
                return Err(CalcError::InvalidArray(format!("{name} spacing must be positive")));
            }
        }
        if self.virtual_count() > MAX_VIRTUAL_ELEMENTS {
            return Err(CalcError::InvalidArray(format!(
                "{} virtual elements exceeds the limit of {MAX_VIRTUAL_ELEMENTS}",
                self.virtual_count()
            )));
        }
        Ok(())
    }
    pub fn virtual_count(&self) -> usize {
        self.tx_count.saturating_mul(self.rx_count)
    }
    pub fn tx_elements(&self) -> Vec<Element> {
        let center = (self.tx_count as f64 - 1.0) / 2.0;
        (0..self.tx_count)
            .map(|i| Element {
                role: ElementRole::Tx,
                x_wl: (i as f64 - center) * self.tx_spacing_wl,
                y_wl: 0.0,
            })
            .collect()
    }
    pub fn rx_elements(&self) -> Vec<Element> {
        (0..self.rx_count)
            .map(|j| Element {
                role: ElementRole::Rx,
                x_wl: 0.0,
                y_wl: -((j + 1) as f64) * self.rx_spacing_wl,
            })
            .collect()
    }
    /// Tx-major list of `tx + rx` position sums.
    pub fn virtual_elements(&self) -> Vec<Element> {
        let rx = self.rx_elements();
        self.tx_elements()
            .iter()
            .flat_map(|t| {
                rx.iter().map(move |r| Element {
                    role: ElementRole::Virtual,
                    x_wl: t.x_wl + r.x_wl,
                    y_wl: t.y_wl + r.y_wl,
                })
            })
            .collect()
    }
    /// Array factor of the virtual array along one principal cut.
    pub fn pattern(
        &self,
        cut: Cut,
        steer_deg: f64,
        taper: Taper,
        sampling: &AngleSampling,
    ) -> Result<BeamPattern, CalcError> {
        self.validate()?;
        let w_tx = taper.coefficients(self.tx_count);
        let w_rx = taper.coefficients(self.rx_count);
        let weights: Vec<f64> = w_tx
            .iter()
            .flat_map(|wt| w_rx.iter().map(move |wr| wt * wr))
            .collect();
        let positions: Vec<f64> = self
            .virtual_elements()
            .iter()
            .map(|e| match cut {
                Cut::Azimuth => e.x_wl,
                Cut::Elevation => e.y_wl,
            })
            .collect();
        compute_pattern(&positions, &weights, steer_deg, sampling)
    }
    /// Uniform spacing along `cut`, used for the analytic grating check.
    pub fn spacing_for(&self, cut: Cut) -> f64 {
        match cut {
            Cut::Azimuth => self.tx_spacing_wl,
            Cut::Elevation => self.rx_spacing_wl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn ula(n: usize, d: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * d).collect()
    }
    #[test]
    fn broadside_ula_textbook_figures() {
        let pattern = compute_pattern(&ula(8, 0.5), &[1.0; 8], 0.0, &AngleSampling::default()).unwrap();
        assert_eq!(pattern.angles_deg.len(), 1801);
        let m = analyze(&pattern, 0.0, 3.0).unwrap();
        assert!(m.peak_deg.abs() < 1e-9);
        assert!(m.peak_db.abs() < 1e-9);
        let bw = m.beamwidth_3db_deg.unwrap();
        assert!(bw > 12.0 && bw < 13.5, "beamwidth {bw}");
        let psl = m.peak_sidelobe_db.unwrap();
        assert!(psl > -14.0 && psl < -12.0, "psl {psl}");
        assert!(m.grating_lobes_deg.is_empty());
        // First nulls of an 8-element λ/2 array sit at asin(2/8) = 14.48°.
        let (l, r) = m.first_nulls_deg;
        assert!((r.unwrap() - 14.48).abs() < 0.2);
        assert!((l.unwrap() + 14.48).abs() < 0.2);
    }
    #[test]
    fn one_wavelength_spacing_has_endfire_grating_lobes() {
        let pattern = compute_pattern(&ula(8, 1.0), &[1.0; 8], 0.0, &AngleSampling::default()).unwrap();
        let m = analyze(&pattern, 0.0, 3.0).unwrap();
        assert_eq!(m.grating_lobes_deg.len(), 2);
        assert!((m.grating_lobes_deg[0] + 90.0).abs() < 1e-9);
        assert!((m.grating_lobes_deg[1] - 90.0).abs() < 1e-9);
        let predicted = predicted_grating_lobes(1.0, 0.0);
        assert_eq!(predicted.len(), 2);
        assert!((predicted[0] + 90.0).abs() < 1e-9 && (predicted[1] - 90.0).abs() < 1e-9);
    }
    #[test]
    fn steering_moves_the_main_lobe() {
        let pattern = compute_pattern(&ula(16, 0.5), &[1.0; 16], 30.0, &AngleSampling::default()).unwrap();
        let m = analyze(&pattern, 30.0, 3.0).unwrap();
        assert!((m.peak_deg - 30.0).abs() < 0.06);
        assert!(m.grating_lobes_deg.is_empty());
        assert!(predicted_grating_lobes(0.5, 30.0).is_empty());
    }
    #[test]
    fn grating_free_limit() {
        assert!((max_grating_free_spacing(0.0) - 1.0).abs() < 1e-12);
        assert!((max_grating_free_spacing(30.0) - 2.0 / 3.0).abs() < 1e-12);
        // d = 0.7 steered to 60°: lobe at asin(0.866 - 1/0.7) = -34.2°.
        let lobes = predicted_grating_lobes(0.7, 60.0);
        assert_eq!(lobes.len(), 1);
        assert!((lobes[0] + 34.2).abs() < 0.1);
    }
    #[test]
    fn taper_lowers_sidelobes_and_widens_beam() {
        let sampling = AngleSampling::default();
        let layout = TShapeLayout {
            tx_count: 12,
            rx_count: 1,
            tx_spacing_wl: 0.5,
            rx_spacing_wl: 0.5,
        };
        let uniform = analyze(&layout.pattern(Cut::Azimuth, 0.0, Taper::Uniform, &sampling).unwrap(), 0.0, 3.0).unwrap();
        let hann = analyze(&layout.pattern(Cut::Azimuth, 0.0, Taper::Hann, &sampling).unwrap(), 0.0, 3.0).unwrap();
        assert!(hann.peak_sidelobe_db.unwrap() < uniform.peak_sidelobe_db.unwrap() - 10.0);
        assert!(hann.beamwidth_3db_deg.unwrap() > uniform.beamwidth_3db_deg.unwrap());
    }
    #[test]
    fn t_shape_virtual_array_is_a_grid() {
        let layout = TShapeLayout {
            tx_count: 3,
            rx_count: 2,
            tx_spacing_wl: 0.5,
            rx_spacing_wl: 0.5,
        };
        let tx = layout.tx_elements();
        assert_eq!(tx.iter().map(|e| e.x_wl).collect::<Vec<_>>(), vec![-0.5, 0.0, 0.5]);
        let rx = layout.rx_elements();
        assert_eq!(rx.iter().map(|e| e.y_wl).collect::<Vec<_>>(), vec![-0.5, -1.0]);
        let v = layout.virtual_elements();
        assert_eq!(v.len(), 6);
        assert_eq!((v[1].x_wl, v[1].y_wl), (-0.5, -1.0));
        assert!(v.iter().all(|e| e.role == ElementRole::Virtual));
    }
    #[test]
    fn elevation_cut_follows_rx_stem() {
        let layout = TShapeLayout::default();
        let sampling = AngleSampling::default();
        let az = analyze(&layout.pattern(Cut::Azimuth, 0.0, Taper::Uniform, &sampling).unwrap(), 0.0, 3.0).unwrap();
        let el = analyze(&layout.pattern(Cut::Elevation, 0.0, Taper::Uniform, &sampling).unwrap(), 0.0, 3.0).unwrap();
        // 8 Tx vs 4 Rx at the same spacing: elevation beam is about twice as wide.
        let ratio = el.beamwidth_3db_deg.unwrap() / az.beamwidth_3db_deg.unwrap();
        assert!(ratio > 1.8 && ratio < 2.3, "ratio {ratio}");
    }
    #[test]
    fn rejects_bad_layouts() {
        let bad = TShapeLayout {
            tx_count: 0,
            ..TShapeLayout::default()
        };
        assert!(matches!(bad.validate(), Err(CalcError::InvalidArray(_))));
        let big = TShapeLayout {
            tx_count: 100,
            rx_count: 100,
            ..TShapeLayout::default()
        };
        assert!(big.validate().is_err());
        let sampling = AngleSampling {
            samples: 2,
            ..AngleSampling::default()
        };
        assert!(compute_pattern(&[0.0], &[1.0], 0.0, &sampling).is_err());
        assert!(compute_pattern(&[0.0, 0.5], &[1.0], 0.0, &AngleSampling::default()).is_err());
        let dense = AngleSampling {
            samples: MAX_SAMPLES + 1,
            ..AngleSampling::default()
        };
        assert!(compute_pattern(&[0.0], &[1.0], 0.0, &dense).is_err());
        for d in [f64::NAN, f64::INFINITY] {
            let layout = TShapeLayout {
                rx_spacing_wl: d,
                ..TShapeLayout::default()
            };
            assert!(matches!(layout.validate(), Err(CalcError::InvalidArray(_))));
        }
    }
    #[test]
    fn lobe_cut_off_by_the_span_has_no_beamwidth() {
        // Two elements at λ/2 steered to 60°: the right half-power point and
        // right null fall past +90°. Left null at asin(sin 60° - 1) = -7.70°.
        let pattern = compute_pattern(&ula(2, 0.5), &[1.0; 2], 60.0, &AngleSampling::default()).unwrap();
        let m = analyze(&pattern, 60.0, 3.0).unwrap();
        assert!((m.peak_deg - 60.0).abs() < 0.06);
        assert_eq!(m.half_power_deg, None);
        assert_eq!(m.beamwidth_3db_deg, None);
        let (left, right) = m.first_nulls_deg;
        assert!((left.unwrap() + 7.70).abs() < 0.1, "left null {left:?}");
        assert_eq!(right, None);
    }
}
