// src/calc/power_budget.rs
//! Monostatic radar power budget, accumulated line by line in dB.
use log::debug;
use crate::calc::constants::{four_pi_cubed, wavelength, BOLTZMANN, REFERENCE_TEMP_K};
use crate::calc::error::{require_positive, CalcError};
use crate::calc::units::db_to_power_ratio;

pub const MIN_SEARCH_RANGE_M: f64 = 1e-3;
pub const MAX_SEARCH_RANGE_M: f64 = 1e7;
const MAX_BISECTION_STEPS: usize = 200;
const BISECTION_REL_TOL: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonostaticBudget {
    pub tx_power_dbm: f64,
    pub tx_gain_dbi: f64,
    pub tx_losses_db: f64,
    pub carrier_hz: f64,
    pub rcs_dbsm: f64,
    pub range_m: f64,
    /// One-way specific attenuation, applied over the round trip.
    pub atmospheric_loss_db_per_km: f64,
    pub rx_gain_dbi: f64,
    pub rx_losses_db: f64,
    pub noise_figure_db: f64,
    pub noise_temp_k: f64,
    pub if_bandwidth_hz: f64,
    pub range_bins: usize,
    pub doppler_bins: usize,
    pub virtual_channels: usize,
    pub required_snr_db: f64,
}
impl Default for MonostaticBudget {
    fn default() -> Self {
        Self {
            tx_power_dbm: 12.0,
            tx_gain_dbi: 10.0,
            tx_losses_db: 1.0,
            carrier_hz: 77e9,
            rcs_dbsm: 0.0,
            range_m: 50.0,
            atmospheric_loss_db_per_km: 0.0,
            rx_gain_dbi: 10.0,
            rx_losses_db: 1.0,
            noise_figure_db: 10.0,
            noise_temp_k: REFERENCE_TEMP_K,
            if_bandwidth_hz: 10e6,
            range_bins: 1024,
            doppler_bins: 64,
            virtual_channels: 1,
            required_snr_db: 15.0,
        }
    }
}

/// One row of the running budget table.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetLine {
    pub label: &'static str,
    pub value_db: f64,
    pub running_dbm: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BudgetReport {
    pub lines: Vec<BudgetLine>,
    pub received_power_dbm: f64,
    pub noise_floor_dbm: f64,
    pub processing_gain_db: f64,
    pub snr_db: f64,
    pub margin_db: f64,
    /// Range where the margin reaches zero; `None` if the link never closes.
    pub max_range_m: Option<f64>,
}

impl MonostaticBudget {
    pub fn validate(&self) -> Result<(), CalcError> {
        require_positive("carrier frequency", self.carrier_hz)?;
        require_positive("range", self.range_m)?;
        require_positive("noise temperature", self.noise_temp_k)?;
        require_positive("IF bandwidth", self.if_bandwidth_hz)?;
        if self.range_bins == 0 || self.doppler_bins == 0 || self.virtual_channels == 0 {
            return Err(CalcError::invalid("bin and channel counts must be at least 1"));
        }
        if !(self.atmospheric_loss_db_per_km.is_finite() && self.atmospheric_loss_db_per_km >= 0.0) {
            return Err(CalcError::invalid("atmospheric loss cannot be negative"));
        }
        let db_fields = [
            self.tx_power_dbm,
            self.tx_gain_dbi,
            self.tx_losses_db,
            self.rcs_dbsm,
            self.rx_gain_dbi,
            self.rx_losses_db,
            self.noise_figure_db,
            self.required_snr_db,
        ];
        if db_fields.iter().any(|v| !v.is_finite()) {
            return Err(CalcError::invalid("budget entries must be finite numbers"));
        }
        Ok(())
    }

    /// Uses the cascaded noise figure of a receiver chain.
    pub fn with_cascade(mut self, chain: &CascadeResult) -> Self {
        self.noise_figure_db = chain.noise_figure_db;
        self
    }

    fn wavelength_term_db(&self) -> f64 {
        let lam = wavelength(self.carrier_hz);
        10.0 * (lam * lam / four_pi_cubed()).log10()
    }

    fn lines_at(&self, range_m: f64) -> Vec<BudgetLine> {
        let steps: [(&'static str, f64); 9] = [
            ("Tx power", self.tx_power_dbm),
            ("Tx antenna gain", self.tx_gain_dbi),
            ("Tx losses", -self.tx_losses_db),
            ("Wavelength term λ²/(4π)³", self.wavelength_term_db()),
            ("Target RCS", self.rcs_dbsm),
            ("Spreading loss 40·log10(R)", -40.0 * range_m.log10()),
            ("Atmospheric loss (two-way)", -2.0 * self.atmospheric_loss_db_per_km * range_m / 1000.0),
            ("Rx antenna gain", self.rx_gain_dbi),
            ("Rx losses", -self.rx_losses_db),
        ];
        let mut running = 0.0;
        steps
            .iter()
            .map(|&(label, value_db)| {
                running += value_db;
                BudgetLine {
                    label,
                    value_db,
                    running_dbm: running,
                }
            })
            .collect()
    }

    fn received_power_dbm(&self, range_m: f64) -> f64 {
        self.lines_at(range_m)
            .last()
            .map(|l| l.running_dbm)
            .unwrap_or(self.tx_power_dbm)
    }

    /// `k·T·B` in dBm plus the receiver noise figure.
    pub fn noise_floor_dbm(&self) -> f64 {
        10.0 * (BOLTZMANN * self.noise_temp_k * self.if_bandwidth_hz * 1000.0).log10() + self.noise_figure_db
    }

    pub fn processing_gain_db(&self) -> f64 {
        let n = self.range_bins as f64 * self.doppler_bins as f64 * self.virtual_channels as f64;
        10.0 * n.log10()
    }

    fn snr_at(&self, range_m: f64) -> f64 {
        self.received_power_dbm(range_m) - self.noise_floor_dbm() + self.processing_gain_db()
    }

    pub fn evaluate(&self) -> Result<BudgetReport, CalcError> {
        self.validate()?;
        let lines = self.lines_at(self.range_m);
        let received_power_dbm = lines.last().map(|l| l.running_dbm).unwrap_or(self.tx_power_dbm);
        let noise_floor_dbm = self.noise_floor_dbm();
        let processing_gain_db = self.processing_gain_db();
        let snr_db = received_power_dbm - noise_floor_dbm + processing_gain_db;
        Ok(BudgetReport {
            lines,
            received_power_dbm,
            noise_floor_dbm,
            processing_gain_db,
            snr_db,
            margin_db: snr_db - self.required_snr_db,
            max_range_m: self.max_range().ok(),
        })
    }

    /// Range where SNR equals the required SNR, by bisection in log(range).
    ///
    /// Margin falls monotonically with range (spreading and atmospheric loss
    /// both grow), so one sign change brackets the answer.
    pub fn max_range(&self) -> Result<f64, CalcError> {
        self.validate()?;
        let margin = |r: f64| self.snr_at(r) - self.required_snr_db;
        let (mut lo, mut hi) = (MIN_SEARCH_RANGE_M, MAX_SEARCH_RANGE_M);
        if margin(lo) < 0.0 {
            return Err(CalcError::NoSolution(format!(
                "SNR is below the requirement even at {MIN_SEARCH_RANGE_M} m"
            )));
        }
        if margin(hi) >= 0.0 {
            return Err(CalcError::NoSolution(format!(
                "link still closes at {MAX_SEARCH_RANGE_M} m"
            )));
        }
        for step in 0..MAX_BISECTION_STEPS {
            let mid = (lo * hi).sqrt();
            if margin(mid) >= 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
            if (hi - lo) / lo < BISECTION_REL_TOL {
                debug!("max range bisection converged after {} steps", step + 1);
                break;
            }
        }
        Ok((lo * hi).sqrt())
    }

    /// (range, SNR dB) pairs for plotting.
    pub fn snr_vs_range(&self, ranges_m: &[f64]) -> Result<Vec<(f64, f64)>, CalcError> {
        self.validate()?;
        ranges_m
            .iter()
            .map(|&r| require_positive("range", r).map(|r| (r, self.snr_at(r))))
            .collect()
    }
}

/// `n` log-spaced points from `min` to `max` inclusive.
pub fn log_ranges(min_m: f64, max_m: f64, n: usize) -> Result<Vec<f64>, CalcError> {
    let min_m = require_positive("minimum range", min_m)?;
    let max_m = require_positive("maximum range", max_m)?;
    if n < 2 || max_m <= min_m {
        return Err(CalcError::invalid("range sweep needs at least 2 increasing points"));
    }
    let (a, b) = (min_m.log10(), max_m.log10());
    Ok((0..n)
        .map(|i| 10f64.powf(a + (b - a) * i as f64 / (n - 1) as f64))
        .collect())
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReceiverStage {
    pub name: String,
    pub gain_db: f64,
    pub noise_figure_db: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CascadeNode {
    pub name: String,
    pub cumulative_gain_db: f64,
    pub cumulative_noise_figure_db: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CascadeResult {
    pub gain_db: f64,
    pub noise_figure_db: f64,
    pub nodes: Vec<CascadeNode>,
}

/// Friis cascade: `F = F1 + (F2 − 1)/G1 + (F3 − 1)/(G1·G2) + …`.
pub fn cascade(stages: &[ReceiverStage]) -> Result<CascadeResult, CalcError> {
    if stages.is_empty() {
        return Err(CalcError::invalid("receiver chain has no stages"));
    }
    let mut gain_lin = 1.0;
    let mut factor = 0.0;
    let mut nodes = Vec::with_capacity(stages.len());
    for (i, stage) in stages.iter().enumerate() {
        if !(stage.gain_db.is_finite() && stage.noise_figure_db.is_finite()) || stage.noise_figure_db < 0.0 {
            return Err(CalcError::invalid(format!("stage {:?} has an invalid gain or NF", stage.name)));
        }
        let f = db_to_power_ratio(stage.noise_figure_db);
        factor += if i == 0 { f } else { (f - 1.0) / gain_lin };
        gain_lin *= db_to_power_ratio(stage.gain_db);
        nodes.push(CascadeNode {
            name: stage.name.clone(),
            cumulative_gain_db: 10.0 * gain_lin.log10(),
            cumulative_noise_figure_db: 10.0 * factor.log10(),
        });
    }
    Ok(CascadeResult {
        gain_db: 10.0 * gain_lin.log10(),
        noise_figure_db: 10.0 * factor.log10(),
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::fmcw::{max_range_fmcw, RadarEquationInputs};
    fn stage(name: &str, gain_db: f64, nf_db: f64) -> ReceiverStage {
        ReceiverStage {
            name: name.into(),
            gain_db,
            noise_figure_db: nf_db,
        }
    }
    #[test]
    fn running_total_ends_at_received_power() {
        let budget = MonostaticBudget::default();
        let report = budget.evaluate().unwrap();
        assert_eq!(report.lines.len(), 9);
        let sum: f64 = report.lines.iter().map(|l| l.value_db).sum();
        assert!((sum - report.received_power_dbm).abs() < 1e-9);
        assert!((report.lines[0].running_dbm - 12.0).abs() < 1e-12);
        assert!((report.snr_db - report.margin_db - 15.0).abs() < 1e-9);
    }
    #[test]
    fn noise_floor_is_kTB_plus_nf() {
        let budget = MonostaticBudget {
            if_bandwidth_hz: 1.0,
            noise_figure_db: 0.0,
            ..MonostaticBudget::default()
        };
        assert!((budget.noise_floor_dbm() + 173.98).abs() < 0.01);
    }
    #[test]
    fn bisection_matches_fourth_power_law() {
        let budget = MonostaticBudget::default();
        let report = budget.evaluate().unwrap();
        let closed = budget.range_m * 10f64.powf(report.margin_db / 40.0);
        let r = report.max_range_m.unwrap();
        assert!(((r - closed) / closed).abs() < 1e-6, "{r} vs {closed}");
    }
    #[test]
    fn agrees_with_fmcw_radar_equation() {
        let eq = RadarEquationInputs::default();
        let budget = MonostaticBudget {
            tx_power_dbm: eq.tx_power_dbm,
            tx_gain_dbi: eq.tx_gain_dbi,
            tx_losses_db: eq.system_loss_db,
            carrier_hz: eq.carrier_hz,
            rcs_dbsm: 10.0 * eq.rcs_m2.log10(),
            rx_gain_dbi: eq.rx_gain_dbi,
            rx_losses_db: 0.0,
            noise_figure_db: eq.noise_figure_db,
            noise_temp_k: eq.noise_temp_k,
            if_bandwidth_hz: eq.if_bandwidth_hz,
            range_bins: eq.range_bins,
            doppler_bins: eq.doppler_bins,
            virtual_channels: 1,
            required_snr_db: eq.snr_min_db,
            ..MonostaticBudget::default()
        };
        let expected = max_range_fmcw(&eq).unwrap().max_range_m;
        let r = budget.max_range().unwrap();
        assert!(((r - expected) / expected).abs() < 1e-6);
    }
    #[test]
    fn atmosphere_shortens_range() {
        let clear = MonostaticBudget::default().max_range().unwrap();
        let foggy = MonostaticBudget {
            atmospheric_loss_db_per_km: 50.0,
            ..MonostaticBudget::default()
        }
        .max_range()
        .unwrap();
        assert!(foggy < clear);
    }
    #[test]
    fn unreachable_link_reports_no_solution() {
        let budget = MonostaticBudget {
            tx_power_dbm: -200.0,
            ..MonostaticBudget::default()
        };
        assert!(matches!(budget.max_range(), Err(CalcError::NoSolution(_))));
        assert!(budget.evaluate().unwrap().max_range_m.is_none());
    }
    #[test]
    fn link_that_closes_past_the_search_span_reports_no_solution() {
        let budget = MonostaticBudget {
            tx_power_dbm: 300.0,
            ..MonostaticBudget::default()
        };
        match budget.max_range() {
            Err(CalcError::NoSolution(msg)) => assert!(msg.contains("still closes"), "{msg}"),
            other => panic!("expected NoSolution, got {other:?}"),
        }
        let report = budget.evaluate().unwrap();
        assert!(report.margin_db > 0.0);
        assert!(report.max_range_m.is_none());
    }
    #[test]
    fn snr_sweep_falls_40_db_per_decade() {
        let budget = MonostaticBudget::default();
        let pts = budget.snr_vs_range(&[10.0, 100.0]).unwrap();
        assert!((pts[0].1 - pts[1].1 - 40.0).abs() < 1e-9);
        assert!(budget.snr_vs_range(&[0.0]).is_err());
        let sweep = log_ranges(1.0, 1000.0, 4).unwrap();
        assert!((sweep[1] - 10.0).abs() < 1e-9 && (sweep[3] - 1000.0).abs() < 1e-9);
    }
    #[test]
    fn friis_cascade() {
        let lna_first = cascade(&[stage("LNA", 20.0, 2.0), stage("Mixer", -6.0, 10.0)]).unwrap();
        assert!((lna_first.gain_db - 14.0).abs() < 1e-9);
        assert!((lna_first.noise_figure_db - 2.24).abs() < 0.01);
        // A passive loss in front adds its loss to the NF of what follows.
        let pad_first = cascade(&[stage("Pad", -3.0, 3.0), stage("LNA", 20.0, 2.0)]).unwrap();
        assert!((pad_first.noise_figure_db - 5.0).abs() < 0.01);
        assert_eq!(pad_first.nodes.len(), 2);
        assert!((pad_first.nodes[0].cumulative_noise_figure_db - 3.0).abs() < 1e-9);
        let budget = MonostaticBudget::default().with_cascade(&lna_first);
        assert!((budget.noise_figure_db - lna_first.noise_figure_db).abs() < 1e-12);
        assert!(cascade(&[]).is_err());
    }
}
