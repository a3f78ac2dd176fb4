// src/calc/divider.rs
//! Voltage divider solver: `Vout = Vin · R2 / (R1 + R2)`.
use crate::calc::eseries::{self, ESeries};
use crate::calc::error::CalcError;

/// Form values; exactly one must be `None` for [`solve`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DividerInputs {
    pub r1: Option<f64>,
    pub r2: Option<f64>,
    pub vin: Option<f64>,
    pub vout: Option<f64>,
}
impl DividerInputs {
    fn provided(&self) -> usize {
        [self.r1, self.r2, self.vin, self.vout]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DividerUnknown {
    R1,
    R2,
    Vin,
    Vout,
}
impl DividerUnknown {
    pub fn label(self) -> &'static str {
        match self {
            DividerUnknown::R1 => "R1",
            DividerUnknown::R2 => "R2",
            DividerUnknown::Vin => "Vin",
            DividerUnknown::Vout => "Vout",
        }
    }
    pub fn is_resistor(self) -> bool {
        matches!(self, DividerUnknown::R1 | DividerUnknown::R2)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DividerSolution {
    pub unknown: DividerUnknown,
    /// Exact value of the unknown before snapping.
    pub calculated: f64,
    /// Preferred value used in place of `calculated` for resistor unknowns.
    pub snapped: Option<f64>,
    pub series: Option<ESeries>,
    pub r1: f64,
    pub r2: f64,
    pub vin: f64,
    /// Output with the final (possibly snapped) resistors.
    pub vout: f64,
    /// Output the user asked for, when Vout was an input.
    pub target_vout: Option<f64>,
}
impl DividerSolution {
    pub fn total_resistance(&self) -> f64 {
        self.r1 + self.r2
    }
    pub fn current_amps(&self) -> f64 {
        self.vin / self.total_resistance()
    }
    /// Dissipation in (R1, R2) in watts.
    pub fn power_watts(&self) -> (f64, f64) {
        let i = self.current_amps();
        (i * i * self.r1, i * i * self.r2)
    }
    pub fn error_volts(&self) -> f64 {
        self.target_vout.map(|t| self.vout - t).unwrap_or(0.0)
    }
    pub fn error_percent(&self) -> f64 {
        match self.target_vout {
            Some(t) if t != 0.0 => (self.vout - t) / t * 100.0,
            _ => 0.0,
        }
    }
}

pub fn output_voltage(vin: f64, r1: f64, r2: f64) -> Result<f64, CalcError> {
    let total = r1 + r2;
    if total == 0.0 {
        return Err(CalcError::DivisionByZero("R1 + R2 is zero"));
    }
    Ok(vin * r2 / total)
}

/// Computes the missing quantity from the other three, snapping a computed
/// resistor to the nearest value of `series`.
pub fn solve(inputs: &DividerInputs, series: ESeries) -> Result<DividerSolution, CalcError> {
    let provided = inputs.provided();
    if provided != 3 {
        return Err(CalcError::WrongInputCount {
            expected: 3,
            actual: provided,
        });
    }
    match (inputs.r1, inputs.r2, inputs.vin, inputs.vout) {
        (Some(r1), Some(r2), Some(vin), None) => {
            let vout = output_voltage(vin, r1, r2)?;
            Ok(DividerSolution {
                unknown: DividerUnknown::Vout,
                calculated: vout,
                snapped: None,
                series: None,
                r1,
                r2,
                vin,
                vout,
                target_vout: None,
            })
        }
        (Some(r1), Some(r2), None, Some(vout)) => {
            if r2 == 0.0 {
                return Err(CalcError::DivisionByZero("R2 is zero"));
            }
            let vin = vout * (r1 + r2) / r2;
            Ok(DividerSolution {
                unknown: DividerUnknown::Vin,
                calculated: vin,
                snapped: None,
                series: None,
                r1,
                r2,
                vin,
                vout,
                target_vout: Some(vout),
            })
        }
        (None, Some(r2), Some(vin), Some(vout)) => {
            if vout == 0.0 {
                return Err(CalcError::invalid("Vout cannot be 0 for R1 calculation"));
            }
            let calc_r1 = r2 * (vin - vout) / vout;
            if calc_r1 < 0.0 {
                return Err(CalcError::NegativeResistance("R1"));
            }
            let r1 = eseries::nearest(calc_r1, series);
            Ok(DividerSolution {
                unknown: DividerUnknown::R1,
                calculated: calc_r1,
                snapped: Some(r1),
                series: Some(series),
                r1,
                r2,
                vin,
                vout: output_voltage(vin, r1, r2)?,
                target_vout: Some(vout),
            })
        }
        (Some(r1), None, Some(vin), Some(vout)) => {
            if vin == vout {
                return Err(CalcError::invalid(
                    "Vin equals Vout, implies R1 = 0 or R2 = infinity",
                ));
            }
            let calc_r2 = vout * r1 / (vin - vout);
            if calc_r2 < 0.0 {
                return Err(CalcError::NegativeResistance("R2"));
            }
            let r2 = eseries::nearest(calc_r2, series);
            Ok(DividerSolution {
                unknown: DividerUnknown::R2,
                calculated: calc_r2,
                snapped: Some(r2),
                series: Some(series),
                r1,
                r2,
                vin,
                vout: output_voltage(vin, r1, r2)?,
                target_vout: Some(vout),
            })
        }
        _ => Err(CalcError::WrongInputCount {
            expected: 3,
            actual: provided,
        }),
    }
}

/// Best pair drawn from a user resistor list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairMatch {
    pub r1: f64,
    pub r2: f64,
    pub vout: f64,
    pub error_volts: f64,
    pub error_percent: f64,
}

/// Tries every ordered (R1, R2) pair and keeps the first one with the
/// smallest output error.
pub fn best_pair(vin: f64, vout: f64, resistors: &[f64]) -> Result<PairMatch, CalcError> {
    if resistors.is_empty() {
        return Err(CalcError::NoResistors);
    }
    let mut best: Option<(f64, f64, f64)> = None;
    for &r1 in resistors {
        for &r2 in resistors {
            if r1 + r2 == 0.0 {
                continue;
            }
            let calc_vout = vin * r2 / (r1 + r2);
            let diff = (vout - calc_vout).abs();
            if best.map_or(true, |(_, _, d)| diff < d) {
                best = Some((r1, r2, diff));
            }
        }
    }
    let (r1, r2, _) = best.ok_or(CalcError::NoValidCombination)?;
    let actual = vin * r2 / (r1 + r2);
    let error_volts = actual - vout;
    let error_percent = if vout != 0.0 {
        error_volts / vout * 100.0
    } else {
        0.0
    };
    Ok(PairMatch {
        r1,
        r2,
        vout: actual,
        error_volts,
        error_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    fn inputs(r1: Option<f64>, r2: Option<f64>, vin: Option<f64>, vout: Option<f64>) -> DividerInputs {
        DividerInputs { r1, r2, vin, vout }
    }
    #[test]
    fn computes_vout_from_textbook_formula() {
        let s = solve(&inputs(Some(10_000.0), Some(10_000.0), Some(5.0), None), ESeries::E24).unwrap();
        assert_eq!(s.unknown, DividerUnknown::Vout);
        assert!((s.vout - 2.5).abs() < 1e-12);
        assert!((s.current_amps() - 250e-6).abs() < 1e-12);
        let (p1, p2) = s.power_watts();
        assert!((p1 - 625e-6).abs() < 1e-12 && (p1 - p2).abs() < 1e-15);
    }
    #[test]
    fn computes_vin() {
        let s = solve(&inputs(Some(3000.0), Some(1000.0), None, Some(1.0)), ESeries::E24).unwrap();
        assert!((s.vin - 4.0).abs() < 1e-12);
    }
    #[test]
    fn vin_with_zero_r2_is_division_by_zero() {
        let err = solve(&inputs(Some(1000.0), Some(0.0), None, Some(1.0)), ESeries::E24).unwrap_err();
        assert!(matches!(err, CalcError::DivisionByZero(_)), "{err:?}");
    }
    #[test]
    fn snaps_r1_and_recomputes_vout() {
        // 12 V -> 3.3 V with R2 = 10k needs R1 = 26.36k, E24 gives 27k.
        let s = solve(&inputs(None, Some(10_000.0), Some(12.0), Some(3.3)), ESeries::E24).unwrap();
        assert!((s.calculated - 26_363.636).abs() < 1e-2);
        assert_eq!(s.snapped, Some(27_000.0));
        assert!((s.vout - 12.0 * 10_000.0 / 37_000.0).abs() < 1e-12);
        assert!(s.error_percent() < 0.0);
    }
    #[test]
    fn snaps_r2() {
        let s = solve(&inputs(Some(10_000.0), None, Some(5.0), Some(1.8)), ESeries::E96).unwrap();
        assert!((s.calculated - 5625.0).abs() < 1e-9);
        assert_eq!(s.snapped, Some(5620.0));
    }
    #[test]
    fn rejects_wrong_input_count() {
        let err = solve(&inputs(Some(1.0), None, Some(5.0), None), ESeries::E24).unwrap_err();
        assert!(matches!(err, CalcError::WrongInputCount { expected: 3, actual: 2 }));
        let err = solve(&inputs(Some(1.0), Some(1.0), Some(5.0), Some(2.0)), ESeries::E24).unwrap_err();
        assert!(matches!(err, CalcError::WrongInputCount { actual: 4, .. }));
    }
    #[test]
    fn rejects_degenerate_voltages() {
        assert!(matches!(
            solve(&inputs(None, Some(1000.0), Some(5.0), Some(0.0)), ESeries::E24),
            Err(CalcError::InvalidInput(_))
        ));
        assert!(matches!(
            solve(&inputs(None, Some(1000.0), Some(3.0), Some(5.0)), ESeries::E24),
            Err(CalcError::NegativeResistance("R1"))
        ));
        assert!(matches!(
            solve(&inputs(Some(1000.0), None, Some(5.0), Some(5.0)), ESeries::E24),
            Err(CalcError::InvalidInput(_))
        ));
        assert!(matches!(
            solve(&inputs(Some(0.0), Some(0.0), Some(5.0), None), ESeries::E24),
            Err(CalcError::DivisionByZero(_))
        ));
    }
    #[test]
    fn best_pair_finds_exact_match() {
        let list = [100.0, 220.0, 330.0, 470.0, 1000.0, 2200.0, 4700.0, 10_000.0];
        let m = best_pair(5.0, 2.5, &list).unwrap();
        assert_eq!(m.r1, 100.0);
        assert_eq!(m.r2, 100.0);
        assert!(m.error_volts.abs() < 1e-12);
    }
    #[test]
    fn best_pair_minimizes_error() {
        let list = [1000.0, 2200.0, 4700.0];
        let m = best_pair(10.0, 3.0, &list).unwrap();
        // 10 * 2200 / 6900 = 3.188, 10 * 1000 / 3200 = 3.125 wins.
        assert_eq!((m.r1, m.r2), (2200.0, 1000.0));
        assert!((m.vout - 3.125).abs() < 1e-12);
    }
    #[test]
    fn best_pair_requires_resistors() {
        assert!(matches!(best_pair(5.0, 1.0, &[]), Err(CalcError::NoResistors)));
        assert!(matches!(best_pair(5.0, 1.0, &[0.0]), Err(CalcError::NoValidCombination)));
    }
}
