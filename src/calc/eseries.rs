// src/calc/eseries.rs
//! IEC 60063 preferred resistor values.
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::calc::error::CalcError;
use crate::calc::units::parse_engineering;

const E24: [f64; 24] = [
    1.0, 1.1, 1.2, 1.3, 1.5, 1.6, 1.8, 2.0, 2.2, 2.4, 2.7, 3.0, //
    3.3, 3.6, 3.9, 4.3, 4.7, 5.1, 5.6, 6.2, 6.8, 7.5, 8.2, 9.1,
];
const E48: [f64; 48] = [
    1.00, 1.05, 1.10, 1.15, 1.21, 1.27, 1.33, 1.40, 1.47, 1.54, 1.62, 1.69, //
    1.78, 1.87, 1.96, 2.05, 2.15, 2.26, 2.37, 2.49, 2.61, 2.74, 2.87, 3.01, //
    3.16, 3.32, 3.48, 3.65, 3.83, 4.02, 4.22, 4.42, 4.64, 4.87, 5.11, 5.36, //
    5.62, 5.90, 6.19, 6.49, 6.81, 7.15, 7.50, 7.87, 8.25, 8.66, 9.09, 9.53,
];
const E96: [f64; 96] = [
    1.00, 1.02, 1.05, 1.07, 1.10, 1.13, 1.15, 1.18, 1.21, 1.24, 1.27, 1.30, //
    1.33, 1.37, 1.40, 1.43, 1.47, 1.50, 1.54, 1.58, 1.62, 1.65, 1.69, 1.74, //
    1.78, 1.82, 1.87, 1.91, 1.96, 2.00, 2.05, 2.10, 2.15, 2.21, 2.26, 2.32, //
    2.37, 2.43, 2.49, 2.55, 2.61, 2.67, 2.74, 2.80, 2.87, 2.94, 3.01, 3.09, //
    3.16, 3.24, 3.32, 3.40, 3.48, 3.57, 3.65, 3.74, 3.83, 3.92, 4.02, 4.12, //
    4.22, 4.32, 4.42, 4.53, 4.64, 4.75, 4.87, 4.99, 5.11, 5.23, 5.36, 5.49, //
    5.62, 5.76, 5.90, 6.04, 6.19, 6.34, 6.49, 6.65, 6.81, 6.98, 7.15, 7.32, //
    7.50, 7.68, 7.87, 8.06, 8.25, 8.45, 8.66, 8.87, 9.09, 9.31, 9.53, 9.76,
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ESeries {
    #[default]
    E24,
    E48,
    E96,
}
impl ESeries {
    pub const ALL: [ESeries; 3] = [ESeries::E24, ESeries::E48, ESeries::E96];
    pub fn label(self) -> &'static str {
        match self {
            ESeries::E24 => "E24",
            ESeries::E48 => "E48",
            ESeries::E96 => "E96",
        }
    }
    /// Mantissas of one decade, ascending, in `[1, 10)`.
    pub fn mantissas(self) -> &'static [f64] {
        match self {
            ESeries::E24 => &E24,
            ESeries::E48 => &E48,
            ESeries::E96 => &E96,
        }
    }
}
impl fmt::Display for ESeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
impl FromStr for ESeries {
    type Err = CalcError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ESeries::ALL
            .into_iter()
            .find(|series| series.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CalcError::invalid(format!("unknown resistor series {s:?}")))
    }
}

/// Closest preferred value to `value`.
///
/// Non-positive and non-finite inputs come back unchanged. The search also
/// considers the first value of the next decade, so 9.8 kΩ snaps to 10 kΩ
/// in E24 rather than 9.1 kΩ.
pub fn nearest(value: f64, series: ESeries) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return value;
    }
    let exponent = value.log10().floor() as i32;
    let scale = 10f64.powi(exponent);
    let mantissa = value / scale;
    let closest = series
        .mantissas()
        .iter()
        .copied()
        .chain(std::iter::once(10.0))
        .fold(f64::NAN, |best, candidate| {
            if best.is_nan() || (candidate - mantissa).abs() < (best - mantissa).abs() {
                candidate
            } else {
                best
            }
        });
    round_significant(closest * scale, 3)
}

fn round_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let shift = digits - 1 - magnitude;
    // Scale by an exact integer power of ten in both directions.
    if shift >= 0 {
        let factor = 10f64.powi(shift);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-shift);
        (value / factor).round() * factor
    }
}

/// Sorted, de-duplicated list of resistor values in ohms.
///
/// Tokens may be separated by commas, semicolons or whitespace and use
/// engineering notation (`4k7`, `2.2M`).
pub fn parse_resistor_list(text: &str) -> Result<Vec<f64>, CalcError> {
    let mut values = Vec::new();
    for token in text
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let value = parse_engineering(token)
            .map_err(|_| CalcError::InvalidResistorList(token.to_owned()))?;
        if value <= 0.0 {
            return Err(CalcError::InvalidResistorList(token.to_owned()));
        }
        values.push(value);
    }
    values.sort_by(f64::total_cmp);
    values.dedup();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn series_sizes() {
        assert_eq!(ESeries::E24.mantissas().len(), 24);
        assert_eq!(ESeries::E48.mantissas().len(), 48);
        assert_eq!(ESeries::E96.mantissas().len(), 96);
        for series in ESeries::ALL {
            let m = series.mantissas();
            assert!(m.windows(2).all(|w| w[0] < w[1]));
        }
    }
    #[test]
    fn nearest_snaps_within_decade() {
        assert_eq!(nearest(4650.0, ESeries::E24), 4700.0);
        assert_eq!(nearest(1234.0, ESeries::E96), 1240.0);
        assert_eq!(nearest(0.33, ESeries::E24), 0.33);
        assert_eq!(nearest(5000.0, ESeries::E48), 5110.0);
    }
    #[test]
    fn nearest_crosses_decade_boundary() {
        assert_eq!(nearest(9800.0, ESeries::E24), 10_000.0);
        assert_eq!(nearest(97.0, ESeries::E24), 100.0);
    }
    #[test]
    fn nearest_passes_through_non_positive() {
        assert_eq!(nearest(0.0, ESeries::E24), 0.0);
        assert_eq!(nearest(-5.0, ESeries::E96), -5.0);
    }
    #[test]
    fn series_parses_case_insensitively() {
        assert_eq!("e96".parse::<ESeries>().unwrap(), ESeries::E96);
        assert!("E12".parse::<ESeries>().is_err());
    }
    #[test]
    fn resistor_list_is_sorted_and_deduplicated() {
        let list = parse_resistor_list("10k, 220; 4k7 220\n1000").unwrap();
        assert_eq!(list, vec![220.0, 1000.0, 4700.0, 10_000.0]);
    }
    #[test]
    fn resistor_list_rejects_bad_tokens() {
        match parse_resistor_list("100, abc") {
            Err(CalcError::InvalidResistorList(tok)) => assert_eq!(tok, "abc"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(parse_resistor_list("0, 100").is_err());
        assert!(parse_resistor_list("").unwrap().is_empty());
    }
}
