// src/calc/units.rs
//! dB math, RF unit conversions and engineering-notation text helpers.
//!
//! Everything here is a direct closed form; the GUI converter tab shows a
//! value in every unit at once by round-tripping through the SI base unit
//! (watts, volts RMS, hertz).
use std::fmt;
use crate::calc::constants::SPEED_OF_LIGHT;
use crate::calc::error::{require_positive, CalcError};

pub fn dbm_to_watts(dbm: f64) -> f64 {
    10f64.powf((dbm - 30.0) / 10.0)
}
pub fn watts_to_dbm(watts: f64) -> Result<f64, CalcError> {
    let watts = require_positive("power", watts)?;
    Ok(10.0 * watts.log10() + 30.0)
}
pub fn db_to_power_ratio(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}
pub fn power_ratio_to_db(ratio: f64) -> Result<f64, CalcError> {
    let ratio = require_positive("power ratio", ratio)?;
    Ok(10.0 * ratio.log10())
}
pub fn db_to_voltage_ratio(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}
pub fn voltage_ratio_to_db(ratio: f64) -> Result<f64, CalcError> {
    let ratio = require_positive("voltage ratio", ratio)?;
    Ok(20.0 * ratio.log10())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUnit {
    Watt,
    Milliwatt,
    Dbm,
    Dbw,
}
impl PowerUnit {
    pub const ALL: [PowerUnit; 4] = [
        PowerUnit::Watt,
        PowerUnit::Milliwatt,
        PowerUnit::Dbm,
        PowerUnit::Dbw,
    ];
    pub fn label(self) -> &'static str {
        match self {
            PowerUnit::Watt => "W",
            PowerUnit::Milliwatt => "mW",
            PowerUnit::Dbm => "dBm",
            PowerUnit::Dbw => "dBW",
        }
    }
}
impl fmt::Display for PowerUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A power level stored in watts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerReading {
    watts: f64,
}
impl PowerReading {
    pub fn from_unit(value: f64, unit: PowerUnit) -> Result<Self, CalcError> {
        if !value.is_finite() {
            return Err(CalcError::invalid("power must be a finite number"));
        }
        let watts = match unit {
            PowerUnit::Watt => require_positive("power", value)?,
            PowerUnit::Milliwatt => require_positive("power", value)? * 1e-3,
            PowerUnit::Dbm => dbm_to_watts(value),
            PowerUnit::Dbw => dbm_to_watts(value + 30.0),
        };
        Ok(Self { watts })
    }
    pub fn watts(&self) -> f64 {
        self.watts
    }
    pub fn in_unit(&self, unit: PowerUnit) -> f64 {
        let dbw = 10.0 * self.watts.log10();
        match unit {
            PowerUnit::Watt => self.watts,
            PowerUnit::Milliwatt => self.watts * 1e3,
            PowerUnit::Dbm => dbw + 30.0,
            PowerUnit::Dbw => dbw,
        }
    }
    /// RMS voltage across `impedance_ohms` carrying this power.
    pub fn to_voltage(&self, impedance_ohms: f64) -> Result<VoltageReading, CalcError> {
        let r = require_positive("impedance", impedance_ohms)?;
        Ok(VoltageReading {
            volts: (self.watts * r).sqrt(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoltageUnit {
    Volt,
    Millivolt,
    Microvolt,
    Dbv,
    Dbmv,
    Dbuv,
}
impl VoltageUnit {
    pub const ALL: [VoltageUnit; 6] = [
        VoltageUnit::Volt,
        VoltageUnit::Millivolt,
        VoltageUnit::Microvolt,
        VoltageUnit::Dbv,
        VoltageUnit::Dbmv,
        VoltageUnit::Dbuv,
    ];
    pub fn label(self) -> &'static str {
        match self {
            VoltageUnit::Volt => "V",
            VoltageUnit::Millivolt => "mV",
            VoltageUnit::Microvolt => "µV",
            VoltageUnit::Dbv => "dBV",
            VoltageUnit::Dbmv => "dBmV",
            VoltageUnit::Dbuv => "dBµV",
        }
    }
    fn reference_volts(self) -> f64 {
        match self {
            VoltageUnit::Volt | VoltageUnit::Dbv => 1.0,
            VoltageUnit::Millivolt | VoltageUnit::Dbmv => 1e-3,
            VoltageUnit::Microvolt | VoltageUnit::Dbuv => 1e-6,
        }
    }
    fn is_log(self) -> bool {
        matches!(self, VoltageUnit::Dbv | VoltageUnit::Dbmv | VoltageUnit::Dbuv)
    }
}
impl fmt::Display for VoltageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An RMS voltage stored in volts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoltageReading {
    volts: f64,
}
impl VoltageReading {
    pub fn from_unit(value: f64, unit: VoltageUnit) -> Result<Self, CalcError> {
        if !value.is_finite() {
            return Err(CalcError::invalid("voltage must be a finite number"));
        }
        let volts = if unit.is_log() {
            unit.reference_volts() * db_to_voltage_ratio(value)
        } else {
            require_positive("voltage", value)? * unit.reference_volts()
        };
        Ok(Self { volts })
    }
    pub fn volts(&self) -> f64 {
        self.volts
    }
    pub fn in_unit(&self, unit: VoltageUnit) -> f64 {
        let ratio = self.volts / unit.reference_volts();
        if unit.is_log() {
            20.0 * ratio.log10()
        } else {
            ratio
        }
    }
    pub fn to_power(&self, impedance_ohms: f64) -> Result<PowerReading, CalcError> {
        let r = require_positive("impedance", impedance_ohms)?;
        Ok(PowerReading {
            watts: self.volts * self.volts / r,
        })
    }
}

pub fn frequency_to_wavelength(hz: f64) -> Result<f64, CalcError> {
    Ok(SPEED_OF_LIGHT / require_positive("frequency", hz)?)
}
pub fn wavelength_to_frequency(meters: f64) -> Result<f64, CalcError> {
    Ok(SPEED_OF_LIGHT / require_positive("wavelength", meters)?)
}

/// |Γ| for a return loss given as a positive dB number.
pub fn reflection_coefficient(return_loss_db: f64) -> Result<f64, CalcError> {
    let rl = require_positive("return loss", return_loss_db)?;
    Ok(10f64.powf(-rl / 20.0))
}
pub fn return_loss_to_vswr(return_loss_db: f64) -> Result<f64, CalcError> {
    let gamma = reflection_coefficient(return_loss_db)?;
    Ok((1.0 + gamma) / (1.0 - gamma))
}
/// Infinite for a perfect match (VSWR = 1).
pub fn vswr_to_return_loss(vswr: f64) -> Result<f64, CalcError> {
    if !vswr.is_finite() || vswr < 1.0 {
        return Err(CalcError::invalid(format!("VSWR must be >= 1 (got {vswr})")));
    }
    let gamma = (vswr - 1.0) / (vswr + 1.0);
    if gamma == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(-20.0 * gamma.log10())
}

fn prefix_factor(c: char) -> Option<f64> {
    match c {
        'p' => Some(1e-12),
        'n' => Some(1e-9),
        'u' | 'µ' | 'μ' => Some(1e-6),
        'm' => Some(1e-3),
        'R' | 'r' => Some(1.0),
        'k' | 'K' => Some(1e3),
        'M' => Some(1e6),
        'G' => Some(1e9),
        _ => None,
    }
}

/// Parses `100`, `1e3`, `4k7`, `4R7`, `2.2M`, `100n` and similar.
///
/// A trailing `Ω` or `ohm(s)` is accepted and ignored.
pub fn parse_engineering(text: &str) -> Result<f64, CalcError> {
    let mut s = text.trim();
    for suffix in ["Ω", "ohms", "ohm", "Ohms", "Ohm"] {
        if let Some(stripped) = s.strip_suffix(suffix) {
            s = stripped.trim_end();
            break;
        }
    }
    let bad = || CalcError::invalid(format!("cannot parse {:?} as a number", text.trim()));
    if s.is_empty() {
        return Err(bad());
    }
    if let Ok(v) = s.parse::<f64>() {
        return if v.is_finite() { Ok(v) } else { Err(bad()) };
    }
    let (idx, letter) = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .ok_or_else(bad)?;
    let factor = prefix_factor(letter).ok_or_else(bad)?;
    let head = &s[..idx];
    let tail = s[idx + letter.len_utf8()..].trim();
    let digits = if tail.is_empty() {
        head.trim().to_owned()
    } else {
        if head.contains('.') || !tail.chars().all(|c| c.is_ascii_digit()) {
            return Err(bad());
        }
        format!("{}.{}", head.trim(), tail)
    };
    let digits = if digits.is_empty() || digits.starts_with('.') {
        format!("0{digits}")
    } else {
        digits
    };
    let mantissa: f64 = digits.parse().map_err(|_| bad())?;
    let value = mantissa * factor;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(bad())
    }
}

/// Empty input means "unknown".
pub fn parse_optional(text: &str) -> Result<Option<f64>, CalcError> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        parse_engineering(text).map(Some)
    }
}

const PREFIXES: [(i32, &str); 8] = [
    (-12, "p"),
    (-9, "n"),
    (-6, "µ"),
    (-3, "m"),
    (0, ""),
    (3, "k"),
    (6, "M"),
    (9, "G"),
];

/// Three significant figures with an SI prefix, e.g. `4.70 kΩ`.
pub fn format_engineering(value: f64, unit: &str) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value} {unit}");
    }
    let exp3 = ((value.abs().log10() / 3.0).floor() as i32 * 3).clamp(-12, 9);
    let mut idx = PREFIXES
        .iter()
        .position(|(e, _)| *e == exp3)
        .unwrap_or(4);
    let mut scaled = value / 10f64.powi(PREFIXES[idx].0);
    let decimals = |v: f64| -> usize {
        let a = v.abs();
        if a < 10.0 {
            2
        } else if a < 100.0 {
            1
        } else {
            0
        }
    };
    let rounded: f64 = format!("{:.*}", decimals(scaled), scaled)
        .parse()
        .unwrap_or(scaled);
    if rounded.abs() >= 1000.0 && idx + 1 < PREFIXES.len() {
        idx += 1;
        scaled = value / 10f64.powi(PREFIXES[idx].0);
    }
    format!(
        "{:.*} {}{}",
        decimals(scaled),
        scaled,
        PREFIXES[idx].1,
        unit
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn dbm_watt_round_trip_values() {
        assert!((dbm_to_watts(30.0) - 1.0).abs() < 1e-12);
        assert!((dbm_to_watts(0.0) - 1e-3).abs() < 1e-15);
        assert!((watts_to_dbm(0.01585).unwrap() - 12.0).abs() < 0.01);
        assert!(watts_to_dbm(0.0).is_err());
    }
    #[test]
    fn power_reading_expresses_every_unit() {
        let p = PowerReading::from_unit(20.0, PowerUnit::Dbm).unwrap();
        assert!((p.in_unit(PowerUnit::Milliwatt) - 100.0).abs() < 1e-9);
        assert!((p.in_unit(PowerUnit::Dbw) + 10.0).abs() < 1e-9);
        assert!(PowerReading::from_unit(-1.0, PowerUnit::Watt).is_err());
    }
    #[test]
    fn zero_dbm_in_fifty_ohms_is_107_dbuv() {
        let v = PowerReading::from_unit(0.0, PowerUnit::Dbm)
            .unwrap()
            .to_voltage(50.0)
            .unwrap();
        assert!((v.in_unit(VoltageUnit::Dbuv) - 106.99).abs() < 0.01);
        let back = v.to_power(50.0).unwrap();
        assert!(back.in_unit(PowerUnit::Dbm).abs() < 1e-9);
    }
    #[test]
    fn voltage_ratio_and_power_ratio_db() {
        assert!((voltage_ratio_to_db(10.0).unwrap() - 20.0).abs() < 1e-12);
        assert!((power_ratio_to_db(10.0).unwrap() - 10.0).abs() < 1e-12);
        assert!((db_to_voltage_ratio(6.0206) - 2.0).abs() < 1e-4);
    }
    #[test]
    fn vswr_and_return_loss() {
        let vswr = return_loss_to_vswr(20.0).unwrap();
        assert!((vswr - 1.2222).abs() < 1e-3);
        assert!((vswr_to_return_loss(vswr).unwrap() - 20.0).abs() < 1e-9);
        assert!(vswr_to_return_loss(1.0).unwrap().is_infinite());
        assert!(vswr_to_return_loss(0.5).is_err());
    }
    #[test]
    fn parses_engineering_notation() {
        assert_eq!(parse_engineering("4k7").unwrap(), 4700.0);
        assert_eq!(parse_engineering("10k").unwrap(), 10_000.0);
        assert!((parse_engineering("4R7").unwrap() - 4.7).abs() < 1e-12);
        assert!((parse_engineering("2.2M").unwrap() - 2.2e6).abs() < 1e-6);
        assert!((parse_engineering("100n").unwrap() - 1e-7).abs() < 1e-20);
        assert_eq!(parse_engineering(" 330 Ω").unwrap(), 330.0);
        assert_eq!(parse_engineering("1e3").unwrap(), 1000.0);
        assert!(parse_engineering("abc").is_err());
        assert!(parse_engineering("4.7k7").is_err());
        assert_eq!(parse_optional("  ").unwrap(), None);
    }
    #[test]
    fn formats_with_si_prefix() {
        assert_eq!(format_engineering(4700.0, "Ω"), "4.70 kΩ");
        assert_eq!(format_engineering(0.0039, "m"), "3.90 mm");
        assert_eq!(format_engineering(999_960.0, "Hz"), "1.00 MHz");
        assert_eq!(format_engineering(120.0, "V"), "120 V");
    }
}
