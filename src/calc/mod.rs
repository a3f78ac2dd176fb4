// src/calc/mod.rs
// Numeric core: every calculator, no UI types.
pub mod array;
pub mod constants;
pub mod divider;
pub mod error;
pub mod eseries;
pub mod feedback;
pub mod fmcw;
pub mod plot;
pub mod power_budget;
pub mod range_fft;
pub mod tolerance;
pub mod units;
pub mod window;
// Re-exports used by the GUI and report layers
pub use array::{AngleSampling, BeamMetrics, BeamPattern, Cut, Element, ElementRole, TShapeLayout};
pub use divider::{DividerInputs, DividerSolution, PairMatch};
pub use error::CalcError;
pub use eseries::ESeries;
pub use feedback::{FeedbackSolution, FeedbackTarget, KnownResistor};
pub use plot::{
    render_array_layout_png, render_beam_pattern_png, render_range_profile_png, render_snr_curve_png,
    PlotStyle,
};
pub use power_budget::{BudgetLine, BudgetReport, MonostaticBudget, ReceiverStage};
pub use range_fft::{BeatSimulation, RangeProfile};
pub use tolerance::{ToleranceReport, ToleranceSpec};
pub use window::Taper;
