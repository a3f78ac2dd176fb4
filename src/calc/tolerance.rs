// src/calc/tolerance.rs
//! Monte Carlo spread of divider outputs for toleranced resistors.
use rand::Rng;
use crate::calc::error::{require_positive, CalcError};

pub const MAX_TRIALS: usize = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToleranceSpec {
    pub r1_ohms: f64,
    pub r2_ohms: f64,
    /// Symmetric tolerance, e.g. `1.0` for ±1 %.
    pub tolerance_pct: f64,
    pub trials: usize,
}
impl ToleranceSpec {
    fn validate(&self) -> Result<(), CalcError> {
        require_positive("R1", self.r1_ohms)?;
        require_positive("R2", self.r2_ohms)?;
        if !(self.tolerance_pct.is_finite() && (0.0..100.0).contains(&self.tolerance_pct)) {
            return Err(CalcError::invalid("tolerance must be between 0 and 100 %"));
        }
        if self.trials == 0 || self.trials > MAX_TRIALS {
            return Err(CalcError::invalid(format!(
                "trial count must be between 1 and {MAX_TRIALS}"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToleranceReport {
    pub nominal: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub worst_case_low: f64,
    pub worst_case_high: f64,
}

/// `Vin · R2 / (R1 + R2)` with both resistors drawn uniformly in tolerance.
pub fn divider_monte_carlo<R: Rng>(
    vin: f64,
    spec: &ToleranceSpec,
    rng: &mut R,
) -> Result<ToleranceReport, CalcError> {
    run(spec, rng, |r1, r2| vin * r2 / (r1 + r2))
}

/// `Vfb · (1 + R1/R2)` with both resistors drawn uniformly in tolerance.
pub fn feedback_monte_carlo<R: Rng>(
    vfb: f64,
    spec: &ToleranceSpec,
    rng: &mut R,
) -> Result<ToleranceReport, CalcError> {
    run(spec, rng, |r1, r2| vfb * (1.0 + r1 / r2))
}

fn run<R: Rng>(
    spec: &ToleranceSpec,
    rng: &mut R,
    eval: impl Fn(f64, f64) -> f64,
) -> Result<ToleranceReport, CalcError> {
    spec.validate()?;
    let t = spec.tolerance_pct / 100.0;
    // Both outputs are monotonic in each resistor, so the corners bound them.
    let corners = [
        eval(spec.r1_ohms * (1.0 - t), spec.r2_ohms * (1.0 - t)),
        eval(spec.r1_ohms * (1.0 - t), spec.r2_ohms * (1.0 + t)),
        eval(spec.r1_ohms * (1.0 + t), spec.r2_ohms * (1.0 - t)),
        eval(spec.r1_ohms * (1.0 + t), spec.r2_ohms * (1.0 + t)),
    ];
    let worst_case_low = corners.iter().copied().fold(f64::INFINITY, f64::min);
    let worst_case_high = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for _ in 0..spec.trials {
        let (d1, d2) = if t > 0.0 {
            (rng.gen_range(-t..=t), rng.gen_range(-t..=t))
        } else {
            (0.0, 0.0)
        };
        let v = eval(spec.r1_ohms * (1.0 + d1), spec.r2_ohms * (1.0 + d2));
        min = min.min(v);
        max = max.max(v);
        sum += v;
        sum_sq += v * v;
    }
    let n = spec.trials as f64;
    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    Ok(ToleranceReport {
        nominal: eval(spec.r1_ohms, spec.r2_ohms),
        min,
        max,
        mean,
        std_dev: variance.sqrt(),
        worst_case_low,
        worst_case_high,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    fn spec(tol: f64, trials: usize) -> ToleranceSpec {
        ToleranceSpec {
            r1_ohms: 10_000.0,
            r2_ohms: 10_000.0,
            tolerance_pct: tol,
            trials,
        }
    }
    #[test]
    fn samples_stay_inside_worst_case() {
        let mut rng = StdRng::seed_from_u64(7);
        let r = divider_monte_carlo(5.0, &spec(5.0, 20_000), &mut rng).unwrap();
        assert!((r.nominal - 2.5).abs() < 1e-12);
        assert!(r.min >= r.worst_case_low - 1e-12);
        assert!(r.max <= r.worst_case_high + 1e-12);
        assert!((r.mean - 2.5).abs() < 0.01);
        assert!(r.std_dev > 0.0);
        // R1 at -5 %, R2 at +5 %: 5 * 1.05 / 2.0.
        assert!((r.worst_case_high - 2.625).abs() < 1e-9);
    }
    #[test]
    fn zero_tolerance_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        let r = feedback_monte_carlo(0.8, &spec(0.0, 10), &mut rng).unwrap();
        assert!((r.min - 1.6).abs() < 1e-12 && (r.max - 1.6).abs() < 1e-12);
        assert!(r.std_dev < 1e-6);
    }
    #[test]
    fn rejects_bad_tolerance_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(divider_monte_carlo(5.0, &spec(1.0, 0), &mut rng).is_err());
        assert!(divider_monte_carlo(5.0, &spec(150.0, 10), &mut rng).is_err());
    }
}
