// src/gui/divider.rs
use eframe::egui;
use crate::calc::divider::{self, DividerInputs, DividerUnknown};
use crate::calc::tolerance::{divider_monte_carlo, ToleranceReport, ToleranceSpec};
use crate::calc::units::{format_engineering, parse_engineering, parse_optional};
use crate::calc::{CalcError, ESeries};
use crate::config::AppConfig;
use crate::gui::widgets::{self, ResistorPicker};
use crate::gui::EventLog;
use crate::schematic;
use crate::types::{SolveMode, StatusKind, StatusMessage};

/// Values drawn on the schematic after the last successful solve.
#[derive(Clone, Copy, Default)]
struct Drawn {
    r1: Option<f64>,
    r2: Option<f64>,
    vin: Option<f64>,
    vout: Option<f64>,
}

pub struct DividerTab {
    mode: SolveMode,
    series: ESeries,
    r1: String,
    r2: String,
    vin: String,
    vout: String,
    picker: ResistorPicker,
    status: Option<StatusMessage>,
    drawn: Drawn,
    tolerance_pct: f64,
    trials: usize,
    tolerance: Option<Result<ToleranceReport, CalcError>>,
}

impl DividerTab {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            mode: SolveMode::ESeries,
            series: cfg.default_series,
            r1: String::new(),
            r2: String::new(),
            vin: String::new(),
            vout: String::new(),
            picker: ResistorPicker::new(&cfg.default_resistor_list),
            status: None,
            drawn: Drawn::default(),
            tolerance_pct: 1.0,
            trials: 10_000,
            tolerance: None,
        }
    }

    fn read_inputs(&self) -> Result<DividerInputs, CalcError> {
        Ok(DividerInputs {
            r1: parse_optional(&self.r1)?,
            r2: parse_optional(&self.r2)?,
            vin: parse_optional(&self.vin)?,
            vout: parse_optional(&self.vout)?,
        })
    }

    fn solve_eseries(&mut self) -> Result<StatusMessage, CalcError> {
        let s = divider::solve(&self.read_inputs()?, self.series)?;
        self.drawn = Drawn {
            r1: Some(s.r1),
            r2: Some(s.r2),
            vin: Some(s.vin),
            vout: Some(s.vout),
        };
        let msg = match s.unknown {
            DividerUnknown::Vout => StatusMessage::new(
                StatusKind::Good,
                format!("Vout = {:.4} V", s.vout),
            ),
            DividerUnknown::Vin => StatusMessage::new(
                StatusKind::Good,
                format!("Vin = {:.4} V", s.vin),
            ),
            DividerUnknown::R1 | DividerUnknown::R2 => {
                let snapped = s.snapped.unwrap_or(s.calculated);
                StatusMessage::new(
                    StatusKind::Info,
                    format!(
                        "Calculated {} = {:.2} Ω → nearest {} {}\nActual Vout = {:.4} V (error {:+.4} V, {:+.2} %)",
                        s.unknown.label(),
                        s.calculated,
                        self.series,
                        format_engineering(snapped, "Ω"),
                        s.vout,
                        s.error_volts(),
                        s.error_percent()
                    ),
                )
            }
        };
        let (p1, p2) = s.power_watts();
        Ok(StatusMessage::new(
            msg.kind,
            format!(
                "{}\nI = {}, P(R1) = {}, P(R2) = {}",
                msg.text,
                format_engineering(s.current_amps(), "A"),
                format_engineering(p1, "W"),
                format_engineering(p2, "W")
            ),
        ))
    }

    fn solve_list(&mut self) -> Result<StatusMessage, CalcError> {
        let vin = parse_engineering(&self.vin)?;
        let vout = parse_engineering(&self.vout)?;
        let best = divider::best_pair(vin, vout, &self.picker.selected())?;
        self.drawn = Drawn {
            r1: Some(best.r1),
            r2: Some(best.r2),
            vin: Some(vin),
            vout: Some(best.vout),
        };
        let kind = if best.error_percent.abs() < 1.0 {
            StatusKind::Good
        } else {
            StatusKind::Warning
        };
        Ok(StatusMessage::new(
            kind,
            format!(
                "Best pair: R1 = {}, R2 = {}\nActual Vout = {:.4} V (error {:+.4} V, {:+.2} %)",
                format_engineering(best.r1, "Ω"),
                format_engineering(best.r2, "Ω"),
                best.vout,
                best.error_volts,
                best.error_percent
            ),
        ))
    }

    fn calculate(&mut self, log: &mut EventLog) {
        let result = match self.mode {
            SolveMode::ESeries => self.solve_eseries(),
            SolveMode::ResistorList => self.solve_list(),
        };
        self.status = Some(match result {
            Ok(msg) => {
                log.push(format!("Divider: {}", msg.text.lines().next().unwrap_or_default()));
                msg
            }
            Err(err) => {
                log.push(format!("Divider error: {err}"));
                StatusMessage::error(err)
            }
        });
        self.tolerance = None;
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, log: &mut EventLog) {
        ui.heading("Voltage Divider");
        ui.horizontal(|ui| {
            ui.label("Mode");
            ui.selectable_value(&mut self.mode, SolveMode::ESeries, "E-Series");
            ui.selectable_value(&mut self.mode, SolveMode::ResistorList, "Resistor List");
        });
        ui.separator();
        ui.columns(2, |cols| {
            let ui = &mut cols[0];
            match self.mode {
                SolveMode::ESeries => {
                    ui.label("Leave exactly one field empty.");
                    egui::Grid::new("vd_inputs").num_columns(2).show(ui, |ui| {
                        widgets::text_row(ui, "R1 (Ω)", &mut self.r1);
                        widgets::text_row(ui, "R2 (Ω)", &mut self.r2);
                        widgets::text_row(ui, "Vin (V)", &mut self.vin);
                        widgets::text_row(ui, "Vout (V)", &mut self.vout);
                        ui.label("Series");
                        egui::ComboBox::from_id_source("vd_series")
                            .selected_text(self.series.label())
                            .show_ui(ui, |ui| {
                                for s in ESeries::ALL {
                                    ui.selectable_value(&mut self.series, s, s.label());
                                }
                            });
                        ui.end_row();
                    });
                }
                SolveMode::ResistorList => {
                    egui::Grid::new("vd_list_inputs").num_columns(2).show(ui, |ui| {
                        widgets::text_row(ui, "Vin (V)", &mut self.vin);
                        widgets::text_row(ui, "Target Vout (V)", &mut self.vout);
                    });
                    self.picker.ui(ui, "vd_list");
                }
            }
            ui.add_space(6.0);
            if ui.button("Calculate").clicked() {
                self.calculate(log);
            }
            widgets::status_label(ui, &self.status);

            let ui = &mut cols[1];
            schematic::draw_divider(ui, self.drawn.r1, self.drawn.r2, self.drawn.vin, self.drawn.vout);
        });
        ui.separator();
        self.tolerance_ui(ui, log);
    }

    fn tolerance_ui(&mut self, ui: &mut egui::Ui, log: &mut EventLog) {
        ui.collapsing("Tolerance analysis (Monte Carlo)", |ui| {
            let (Some(r1), Some(r2), Some(vin)) = (self.drawn.r1, self.drawn.r2, self.drawn.vin) else {
                ui.label("Solve the divider first.");
                return;
            };
            ui.horizontal(|ui| {
                ui.label("Tolerance ±");
                ui.add(egui::DragValue::new(&mut self.tolerance_pct).speed(0.1).clamp_range(0.0..=20.0).suffix(" %"));
                ui.label("Trials");
                ui.add(egui::DragValue::new(&mut self.trials).clamp_range(100..=1_000_000));
                if ui.button("Run").clicked() {
                    let spec = ToleranceSpec {
                        r1_ohms: r1,
                        r2_ohms: r2,
                        tolerance_pct: self.tolerance_pct,
                        trials: self.trials,
                    };
                    let result = divider_monte_carlo(vin, &spec, &mut rand::thread_rng());
                    if let Ok(r) = &result {
                        log.push(format!("Divider MC: Vout {:.4}..{:.4} V", r.min, r.max));
                    }
                    self.tolerance = Some(result);
                }
            });
            match &self.tolerance {
                Some(Ok(r)) => tolerance_grid(ui, "vd_tol", r),
                Some(Err(err)) => widgets::error_label(ui, err),
                None => {}
            }
        });
    }
}

pub(crate) fn tolerance_grid(ui: &mut egui::Ui, id: &str, r: &ToleranceReport) {
    egui::Grid::new(id).num_columns(2).show(ui, |ui| {
        widgets::value_row(ui, "Nominal", format!("{:.4} V", r.nominal));
        widgets::value_row(ui, "Mean ± σ", format!("{:.4} V ± {:.4} mV", r.mean, r.std_dev * 1e3));
        widgets::value_row(ui, "Simulated range", format!("{:.4} … {:.4} V", r.min, r.max));
        widgets::value_row(
            ui,
            "Worst case",
            format!("{:.4} … {:.4} V", r.worst_case_low, r.worst_case_high),
        );
    });
}
