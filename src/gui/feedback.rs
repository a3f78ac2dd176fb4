// src/gui/feedback.rs
use eframe::egui;
use crate::calc::feedback::{self, FeedbackSolution, FeedbackTarget, KnownResistor};
use crate::calc::tolerance::{feedback_monte_carlo, ToleranceReport, ToleranceSpec};
use crate::calc::units::{format_engineering, parse_engineering, parse_optional};
use crate::calc::{CalcError, ESeries};
use crate::config::AppConfig;
use crate::gui::divider::tolerance_grid;
use crate::gui::widgets::{self, ResistorPicker};
use crate::gui::EventLog;
use crate::schematic;
use crate::types::{SolveMode, StatusKind, StatusMessage};

pub struct FeedbackTab {
    mode: SolveMode,
    series: ESeries,
    vout: String,
    vfb: String,
    min_total: String,
    known: KnownResistor,
    known_value: String,
    picker: ResistorPicker,
    status: Option<StatusMessage>,
    solution: Option<FeedbackSolution>,
    tolerance_pct: f64,
    trials: usize,
    tolerance: Option<Result<ToleranceReport, CalcError>>,
}

impl FeedbackTab {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            mode: SolveMode::ESeries,
            series: cfg.default_series,
            vout: "3.3".to_owned(),
            vfb: "0.8".to_owned(),
            min_total: String::new(),
            known: KnownResistor::R2,
            known_value: "10k".to_owned(),
            picker: ResistorPicker::new(&cfg.default_resistor_list),
            status: None,
            solution: None,
            tolerance_pct: 1.0,
            trials: 10_000,
            tolerance: None,
        }
    }

    fn target(&self) -> Result<FeedbackTarget, CalcError> {
        let target = FeedbackTarget {
            vout: parse_engineering(&self.vout)?,
            vfb: parse_engineering(&self.vfb)?,
            min_total_ohms: parse_optional(&self.min_total)?.unwrap_or(0.0),
        };
        target.validate()?;
        Ok(target)
    }

    fn solve(&self) -> Result<FeedbackSolution, CalcError> {
        let target = self.target()?;
        match self.mode {
            SolveMode::ESeries => {
                let known_ohms = parse_engineering(&self.known_value)?;
                feedback::solve_eseries(&target, self.known, known_ohms, self.series)
            }
            SolveMode::ResistorList => feedback::best_pair(&target, &self.picker.selected()),
        }
    }

    fn describe(s: &FeedbackSolution) -> StatusMessage {
        let mut text = String::new();
        if let Some((which, exact)) = s.computed {
            text.push_str(&format!(
                "Calculated {} = {:.2} Ω → {}\n",
                which.label(),
                exact,
                format_engineering(if which == KnownResistor::R1 { s.r1 } else { s.r2 }, "Ω"),
            ));
        }
        text.push_str(&format!(
            "R1 = {}, R2 = {}, total {}\nActual Vout = {:.4} V (error {:+.4} V, {:+.2} %)\nDivider current {}",
            format_engineering(s.r1, "Ω"),
            format_engineering(s.r2, "Ω"),
            format_engineering(s.total_resistance(), "Ω"),
            s.actual_vout,
            s.error_volts(),
            s.error_percent(),
            format_engineering(s.quiescent_current_amps(), "A"),
        ));
        let kind = if s.below_min_total {
            text.push_str("\nWarning: total resistance is below the requested minimum");
            StatusKind::Warning
        } else if s.computed.is_some() {
            StatusKind::Info
        } else {
            StatusKind::Good
        };
        StatusMessage::new(kind, text)
    }

    fn calculate(&mut self, log: &mut EventLog) {
        self.tolerance = None;
        match self.solve() {
            Ok(s) => {
                log.push(format!(
                    "Feedback: R1 {} / R2 {} → {:.4} V",
                    format_engineering(s.r1, "Ω"),
                    format_engineering(s.r2, "Ω"),
                    s.actual_vout
                ));
                self.status = Some(Self::describe(&s));
                self.solution = Some(s);
            }
            Err(err) => {
                log.push(format!("Feedback error: {err}"));
                self.status = Some(StatusMessage::error(err));
                self.solution = None;
            }
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, log: &mut EventLog) {
        ui.heading("Feedback Resistor Calculator (DC/DC & LDO)");
        ui.horizontal(|ui| {
            ui.label("Mode");
            ui.selectable_value(&mut self.mode, SolveMode::ESeries, "E-Series");
            ui.selectable_value(&mut self.mode, SolveMode::ResistorList, "Resistor List");
        });
        ui.separator();
        ui.columns(2, |cols| {
            let ui = &mut cols[0];
            egui::Grid::new("fb_inputs").num_columns(2).show(ui, |ui| {
                widgets::text_row(ui, "Target Vout (V)", &mut self.vout);
                widgets::text_row(ui, "Vfb (V)", &mut self.vfb);
                widgets::text_row(ui, "Min R1+R2 (Ω, optional)", &mut self.min_total);
                if self.mode == SolveMode::ESeries {
                    ui.label("Series");
                    egui::ComboBox::from_id_source("fb_series")
                        .selected_text(self.series.label())
                        .show_ui(ui, |ui| {
                            for s in ESeries::ALL {
                                ui.selectable_value(&mut self.series, s, s.label());
                            }
                        });
                    ui.end_row();
                    ui.label("Known resistor");
                    ui.horizontal(|ui| {
                        ui.radio_value(&mut self.known, KnownResistor::R1, "R1");
                        ui.radio_value(&mut self.known, KnownResistor::R2, "R2");
                    });
                    ui.end_row();
                    let label = format!("{} value (Ω)", self.known.label());
                    widgets::text_row(ui, &label, &mut self.known_value);
                }
            });
            if self.mode == SolveMode::ResistorList {
                self.picker.ui(ui, "fb_list");
            }
            ui.add_space(6.0);
            if ui.button("Calculate").clicked() {
                self.calculate(log);
            }
            widgets::status_label(ui, &self.status);

            let ui = &mut cols[1];
            let s = self.solution.as_ref();
            schematic::draw_feedback(
                ui,
                s.map(|s| s.r1),
                s.map(|s| s.r2),
                s.map(|s| s.actual_vout),
                parse_engineering(&self.vfb).ok(),
            );
        });
        ui.separator();
        ui.collapsing("Tolerance analysis (Monte Carlo)", |ui| {
            let Some(s) = self.solution.clone() else {
                ui.label("Solve the feedback divider first.");
                return;
            };
            let Ok(vfb) = parse_engineering(&self.vfb) else {
                ui.label("Vfb is not a number.");
                return;
            };
            ui.horizontal(|ui| {
                ui.label("Tolerance ±");
                ui.add(egui::DragValue::new(&mut self.tolerance_pct).speed(0.1).clamp_range(0.0..=20.0).suffix(" %"));
                ui.label("Trials");
                ui.add(egui::DragValue::new(&mut self.trials).clamp_range(100..=1_000_000));
                if ui.button("Run").clicked() {
                    let spec = ToleranceSpec {
                        r1_ohms: s.r1,
                        r2_ohms: s.r2,
                        tolerance_pct: self.tolerance_pct,
                        trials: self.trials,
                    };
                    let result = feedback_monte_carlo(vfb, &spec, &mut rand::thread_rng());
                    if let Ok(r) = &result {
                        log.push(format!("Feedback MC: Vout {:.4}..{:.4} V", r.min, r.max));
                    }
                    self.tolerance = Some(result);
                }
            });
            match &self.tolerance {
                Some(Ok(r)) => tolerance_grid(ui, "fb_tol", r),
                Some(Err(err)) => widgets::error_label(ui, err),
                None => {}
            }
        });
    }
}
