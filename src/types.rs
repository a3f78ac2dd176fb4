// src/types.rs
use eframe::egui::Color32;

// Tool tabs
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum Tab {
    #[default]
    Divider,
    Feedback,
    Converter,
    Fmcw,
    Budget,
    Array,
}
impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Divider,
        Tab::Feedback,
        Tab::Converter,
        Tab::Fmcw,
        Tab::Budget,
        Tab::Array,
    ];
    pub fn title(self) -> &'static str {
        match self {
            Tab::Divider => "Voltage Divider",
            Tab::Feedback => "Feedback Resistor (DC/DC & LDO)",
            Tab::Converter => "dB / Unit Converter",
            Tab::Fmcw => "FMCW Radar Debug",
            Tab::Budget => "Power Budget",
            Tab::Array => "Array Visualizer",
        }
    }
    pub fn help(self) -> &'static str {
        match self {
            Tab::Divider => "Leave exactly one of R1, R2, Vin, Vout empty. Values accept 4k7, 2.2M, 100n.",
            Tab::Feedback => "Vout = Vfb·(1 + R1/R2). R1 goes from Vout to FB, R2 from FB to ground.",
            Tab::Converter => "Every field converts live into all other units.",
            Tab::Fmcw => "Chirp limits, near field and the FMCW radar equation, plus a range-FFT simulator.",
            Tab::Budget => "Monostatic link budget with noise floor, SNR margin and maximum range.",
            Tab::Array => "T-shape MIMO array: Tx bar, Rx stem and the virtual array they form.",
        }
    }
}

// Resistor search mode shared by the divider and feedback tools
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum SolveMode {
    #[default]
    ESeries,
    ResistorList,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum StatusKind {
    /// Exact or in-range result.
    Good,
    /// Result snapped to a preferred value.
    Info,
    Warning,
    Error,
}
impl StatusKind {
    pub fn color(self) -> Color32 {
        match self {
            StatusKind::Good => Color32::from_rgb(80, 200, 120),
            StatusKind::Info => Color32::from_rgb(100, 160, 255),
            StatusKind::Warning => Color32::YELLOW,
            StatusKind::Error => Color32::from_rgb(255, 90, 90),
        }
    }
}

// Result text shown under a form
#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}
impl StatusMessage {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
    pub fn error(err: impl std::fmt::Display) -> Self {
        Self::new(StatusKind::Error, err.to_string())
    }
}
