// src/calc/feedback.rs
//! Feedback divider for DC/DC converters and LDOs: `Vout = Vfb · (1 + R1/R2)`.
use log::warn;
use serde::{Deserialize, Serialize};
use crate::calc::eseries::{self, ESeries};
use crate::calc::error::CalcError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnownResistor {
    #[default]
    R1,
    R2,
}
impl KnownResistor {
    pub fn label(self) -> &'static str {
        match self {
            KnownResistor::R1 => "R1",
            KnownResistor::R2 => "R2",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeedbackTarget {
    pub vout: f64,
    pub vfb: f64,
    /// Lower bound on R1 + R2; zero disables the constraint.
    pub min_total_ohms: f64,
}
impl FeedbackTarget {
    pub fn validate(&self) -> Result<(), CalcError> {
        if !(self.vfb.is_finite() && self.vfb > 0.0) {
            return Err(CalcError::invalid("Vfb must be greater than zero"));
        }
        if !self.vout.is_finite() || self.vout <= self.vfb {
            return Err(CalcError::VoutNotAboveVfb);
        }
        if !(self.min_total_ohms.is_finite() && self.min_total_ohms >= 0.0) {
            return Err(CalcError::invalid("minimum total resistance cannot be negative"));
        }
        Ok(())
    }
    /// `Vout / Vfb - 1`, which equals R1/R2.
    fn ratio(&self) -> f64 {
        self.vout / self.vfb - 1.0
    }
}

pub fn output_voltage(vfb: f64, r1: f64, r2: f64) -> Result<f64, CalcError> {
    if r2 == 0.0 {
        return Err(CalcError::DivisionByZero("R2 is zero"));
    }
    Ok(vfb * (1.0 + r1 / r2))
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeedbackSolution {
    pub r1: f64,
    pub r2: f64,
    /// Resistor that was computed, with its exact value, when solving from
    /// a fixed resistor. `None` for list searches.
    pub computed: Option<(KnownResistor, f64)>,
    pub series: Option<ESeries>,
    pub target_vout: f64,
    pub actual_vout: f64,
    pub below_min_total: bool,
}
impl FeedbackSolution {
    fn new(
        target: &FeedbackTarget,
        r1: f64,
        r2: f64,
        computed: Option<(KnownResistor, f64)>,
        series: Option<ESeries>,
    ) -> Result<Self, CalcError> {
        let actual_vout = output_voltage(target.vfb, r1, r2)?;
        Ok(Self {
            r1,
            r2,
            computed,
            series,
            target_vout: target.vout,
            actual_vout,
            below_min_total: r1 + r2 < target.min_total_ohms,
        })
    }
    pub fn total_resistance(&self) -> f64 {
        self.r1 + self.r2
    }
    pub fn error_volts(&self) -> f64 {
        self.actual_vout - self.target_vout
    }
    pub fn error_percent(&self) -> f64 {
        self.error_volts() / self.target_vout * 100.0
    }
    /// Current drawn by the divider from the output rail.
    pub fn quiescent_current_amps(&self) -> f64 {
        self.actual_vout / self.total_resistance()
    }
}

/// Fixes one resistor and snaps the other to `series`.
pub fn solve_eseries(
    target: &FeedbackTarget,
    known: KnownResistor,
    known_ohms: f64,
    series: ESeries,
) -> Result<FeedbackSolution, CalcError> {
    target.validate()?;
    if !(known_ohms.is_finite() && known_ohms > 0.0) {
        return Err(CalcError::invalid("Resistor value must be positive"));
    }
    let ratio = target.ratio();
    let solution = match known {
        KnownResistor::R1 => {
            let calc_r2 = known_ohms / ratio;
            let r2 = eseries::nearest(calc_r2, series);
            FeedbackSolution::new(
                target,
                known_ohms,
                r2,
                Some((KnownResistor::R2, calc_r2)),
                Some(series),
            )?
        }
        KnownResistor::R2 => {
            let calc_r1 = known_ohms * ratio;
            let r1 = eseries::nearest(calc_r1, series);
            FeedbackSolution::new(
                target,
                r1,
                known_ohms,
                Some((KnownResistor::R1, calc_r1)),
                Some(series),
            )?
        }
    };
    if solution.below_min_total {
        warn!(
            "feedback divider total {:.2} Ω is below the requested minimum {:.2} Ω",
            solution.total_resistance(),
            target.min_total_ohms
        );
    }
    Ok(solution)
}

/// Searches every ordered pair with `R1 + R2 >= min_total_ohms`.
pub fn best_pair(target: &FeedbackTarget, resistors: &[f64]) -> Result<FeedbackSolution, CalcError> {
    target.validate()?;
    if resistors.is_empty() {
        return Err(CalcError::NoResistors);
    }
    let mut best: Option<(f64, f64, f64)> = None;
    for &r1 in resistors {
        for &r2 in resistors {
            if r1 + r2 < target.min_total_ohms || r2 == 0.0 {
                continue;
            }
            let calc_vout = target.vfb * (1.0 + r1 / r2);
            let diff = (target.vout - calc_vout).abs();
            if best.map_or(true, |(_, _, d)| diff < d) {
                best = Some((r1, r2, diff));
            }
        }
    }
    let (r1, r2, _) = best.ok_or(CalcError::NoValidCombination)?;
    FeedbackSolution::new(target, r1, r2, None, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    fn target(vout: f64, vfb: f64, min_total: f64) -> FeedbackTarget {
        FeedbackTarget {
            vout,
            vfb,
            min_total_ohms: min_total,
        }
    }
    #[test]
    fn validation_rules() {
        assert!(matches!(target(0.8, 0.8, 0.0).validate(), Err(CalcError::VoutNotAboveVfb)));
        assert!(matches!(target(0.5, 0.8, 0.0).validate(), Err(CalcError::VoutNotAboveVfb)));
        assert!(matches!(target(3.3, 0.0, 0.0).validate(), Err(CalcError::InvalidInput(_))));
        assert!(target(3.3, 0.8, -1.0).validate().is_err());
        assert!(target(3.3, 0.8, 0.0).validate().is_ok());
    }
    #[test]
    fn known_r1_computes_r2() {
        // 3.3 V from 0.8 V with R1 = 100k: R2 = 100k / 3.125 = 32k -> E24 33k.
        let s = solve_eseries(&target(3.3, 0.8, 0.0), KnownResistor::R1, 100_000.0, ESeries::E24).unwrap();
        let (which, exact) = s.computed.unwrap();
        assert_eq!(which, KnownResistor::R2);
        assert!((exact - 32_000.0).abs() < 1e-9);
        assert_eq!(s.r2, 33_000.0);
        assert!((s.actual_vout - 0.8 * (1.0 + 100_000.0 / 33_000.0)).abs() < 1e-12);
        assert!(s.error_volts() < 0.0);
    }
    #[test]
    fn known_r2_computes_r1() {
        let s = solve_eseries(&target(5.0, 1.25, 0.0), KnownResistor::R2, 10_000.0, ESeries::E96).unwrap();
        assert_eq!(s.r1, 30_100.0);
        assert_eq!(s.computed.map(|(w, _)| w), Some(KnownResistor::R1));
        assert!((s.quiescent_current_amps() - s.actual_vout / 40_100.0).abs() < 1e-15);
    }
    #[test]
    fn warns_when_below_min_total() {
        let s = solve_eseries(&target(3.3, 0.8, 1e6), KnownResistor::R1, 100_000.0, ESeries::E24).unwrap();
        assert!(s.below_min_total);
    }
    #[test]
    fn rejects_non_positive_known_resistor() {
        let err = solve_eseries(&target(3.3, 0.8, 0.0), KnownResistor::R2, 0.0, ESeries::E24).unwrap_err();
        assert_eq!(err.to_string(), "Resistor value must be positive");
    }
    #[test]
    fn list_search_honours_min_total() {
        let list = [100.0, 220.0, 330.0, 470.0, 1000.0, 2200.0, 4700.0, 10_000.0];
        let free = best_pair(&target(3.3, 0.8, 0.0), &list).unwrap();
        let constrained = best_pair(&target(3.3, 0.8, 10_000.0), &list).unwrap();
        assert!(constrained.total_resistance() >= 10_000.0);
        assert!(free.error_volts().abs() <= constrained.error_volts().abs());
        assert!(!constrained.below_min_total);
    }
    #[test]
    fn list_search_errors() {
        assert!(matches!(best_pair(&target(3.3, 0.8, 0.0), &[]), Err(CalcError::NoResistors)));
        assert!(matches!(
            best_pair(&target(3.3, 0.8, 1e9), &[100.0, 200.0]),
            Err(CalcError::NoValidCombination)
        ));
    }
}
