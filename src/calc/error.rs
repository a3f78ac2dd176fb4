// src/calc/error.rs
use thiserror::Error;
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("please enter exactly {expected} values (got {actual})")]
    WrongInputCount { expected: usize, actual: usize },
    #[error("{0}")]
    InvalidInput(String),
    #[error("division by zero: {0}")]
    DivisionByZero(&'static str),
    #[error("calculated {0} is negative; check voltages")]
    NegativeResistance(&'static str),
    #[error("Vout must be greater than Vfb")]
    VoutNotAboveVfb,
    #[error("no resistors selected")]
    NoResistors,
    #[error("could not find a valid combination satisfying constraints")]
    NoValidCombination,
    #[error("invalid entry in resistor list: {0:?}")]
    InvalidResistorList(String),
    #[error("beat frequency {beat_hz:.1} Hz is above the Nyquist limit {nyquist_hz:.1} Hz")]
    BeatAboveNyquist { beat_hz: f64, nyquist_hz: f64 },
    #[error("invalid array layout: {0}")]
    InvalidArray(String),
    #[error("no solution: {0}")]
    NoSolution(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl CalcError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CalcError::InvalidInput(msg.into())
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for CalcError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        CalcError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for CalcError {
    fn from(value: image::ImageError) -> Self {
        CalcError::Plot(value.to_string())
    }
}
/// Rejects zero, negative and non-finite physical quantities.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64, CalcError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CalcError::InvalidInput(format!(
            "{name} must be a positive number (got {value})"
        )))
    }
}
