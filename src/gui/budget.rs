// src/gui/budget.rs
use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{HLine, Line, Plot, PlotPoints, VLine};
use crate::calc::power_budget::{cascade, log_ranges, CascadeResult};
use crate::calc::{render_snr_curve_png, BudgetReport, CalcError, MonostaticBudget, PlotStyle, ReceiverStage};
use crate::config::AppConfig;
use crate::gui::widgets::{self, count_row, number_row, scaled_row, value_row};
use crate::gui::{report_export, EventLog};
use crate::report::ReportWriter;

const SWEEP_POINTS: usize = 200;

pub struct BudgetTab {
    budget: MonostaticBudget,
    use_cascade: bool,
    stages: Vec<ReceiverStage>,
    sweep_min_m: f64,
    sweep_max_m: f64,
    label: String,
    writer: ReportWriter,
    style: PlotStyle,
}

impl BudgetTab {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            budget: MonostaticBudget::default(),
            use_cascade: false,
            stages: vec![
                ReceiverStage {
                    name: "LNA".into(),
                    gain_db: 20.0,
                    noise_figure_db: 2.0,
                },
                ReceiverStage {
                    name: "Mixer".into(),
                    gain_db: -8.0,
                    noise_figure_db: 12.0,
                },
            ],
            sweep_min_m: 1.0,
            sweep_max_m: 1000.0,
            label: "link".to_owned(),
            writer: ReportWriter::new(cfg.export_dir.clone()),
            style: PlotStyle::sized(cfg.plot_width, cfg.plot_height),
        }
    }

    fn effective_budget(&self) -> (MonostaticBudget, Option<Result<CascadeResult, CalcError>>) {
        if !self.use_cascade {
            return (self.budget, None);
        }
        let chain = cascade(&self.stages);
        let budget = match &chain {
            Ok(c) => self.budget.with_cascade(c),
            Err(_) => self.budget,
        };
        (budget, Some(chain))
    }

    fn sweep(&self, budget: &MonostaticBudget) -> Result<Vec<(f64, f64)>, CalcError> {
        let ranges = log_ranges(self.sweep_min_m, self.sweep_max_m, SWEEP_POINTS)?;
        budget.snr_vs_range(&ranges)
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, log: &mut EventLog) {
        ui.heading("Monostatic Power Budget");
        ui.columns(2, |cols| {
            self.inputs_ui(&mut cols[0]);
            let (budget, chain) = self.effective_budget();
            let ui = &mut cols[1];
            if let Some(chain) = &chain {
                match chain {
                    Ok(c) => {
                        ui.label(format!(
                            "Receiver chain: G = {:.2} dB, NF = {:.2} dB",
                            c.gain_db, c.noise_figure_db
                        ));
                        egui::Grid::new("cascade_nodes").num_columns(3).striped(true).show(ui, |ui| {
                            ui.strong("After");
                            ui.strong("ΣG");
                            ui.strong("ΣNF");
                            ui.end_row();
                            for node in &c.nodes {
                                ui.label(node.name.as_str());
                                ui.monospace(format!("{:.2} dB", node.cumulative_gain_db));
                                ui.monospace(format!("{:.2} dB", node.cumulative_noise_figure_db));
                                ui.end_row();
                            }
                        });
                    }
                    Err(err) => {
                        ui.label(RichText::new(err.to_string()).color(Color32::from_rgb(255, 90, 90)));
                    }
                }
            }
            match budget.evaluate() {
                Ok(report) => self.report_ui(ui, log, &budget, &report),
                Err(err) => widgets::error_label(ui, err),
            }
        });
    }

    fn inputs_ui(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("budget_in").num_columns(2).show(ui, |ui| {
            let b = &mut self.budget;
            number_row(ui, "Tx power", &mut b.tx_power_dbm, 0.1, " dBm");
            number_row(ui, "Tx gain", &mut b.tx_gain_dbi, 0.1, " dBi");
            number_row(ui, "Tx losses", &mut b.tx_losses_db, 0.1, " dB");
            scaled_row(ui, "Carrier", &mut b.carrier_hz, 1e9, 0.1, " GHz");
            number_row(ui, "Target RCS", &mut b.rcs_dbsm, 0.1, " dBsm");
            number_row(ui, "Range", &mut b.range_m, 0.5, " m");
            number_row(ui, "Atmospheric loss", &mut b.atmospheric_loss_db_per_km, 0.01, " dB/km");
            number_row(ui, "Rx gain", &mut b.rx_gain_dbi, 0.1, " dBi");
            number_row(ui, "Rx losses", &mut b.rx_losses_db, 0.1, " dB");
            number_row(ui, "Noise figure", &mut b.noise_figure_db, 0.1, " dB");
            number_row(ui, "Noise temperature", &mut b.noise_temp_k, 1.0, " K");
            scaled_row(ui, "IF bandwidth", &mut b.if_bandwidth_hz, 1e6, 0.1, " MHz");
            count_row(ui, "Range bins", &mut b.range_bins, 1 << 16);
            count_row(ui, "Doppler bins", &mut b.doppler_bins, 4096);
            count_row(ui, "Virtual channels", &mut b.virtual_channels, 4096);
            number_row(ui, "Required SNR", &mut b.required_snr_db, 0.1, " dB");
        });
        ui.add_space(6.0);
        ui.checkbox(&mut self.use_cascade, "Noise figure from receiver chain (Friis)");
        if self.use_cascade {
            let mut remove = None;
            egui::Grid::new("stages").num_columns(4).show(ui, |ui| {
                ui.label("Stage");
                ui.label("Gain");
                ui.label("NF");
                ui.end_row();
                for (i, stage) in self.stages.iter_mut().enumerate() {
                    ui.add(egui::TextEdit::singleline(&mut stage.name).desired_width(80.0));
                    ui.add(egui::DragValue::new(&mut stage.gain_db).speed(0.1).suffix(" dB"));
                    ui.add(egui::DragValue::new(&mut stage.noise_figure_db).speed(0.1).suffix(" dB"));
                    if ui.small_button("✖").clicked() {
                        remove = Some(i);
                    }
                    ui.end_row();
                }
            });
            if let Some(i) = remove {
                self.stages.remove(i);
            }
            if ui.small_button("Add stage").clicked() {
                self.stages.push(ReceiverStage {
                    name: format!("Stage {}", self.stages.len() + 1),
                    gain_db: 10.0,
                    noise_figure_db: 3.0,
                });
            }
        }
    }

    fn report_ui(&mut self, ui: &mut egui::Ui, log: &mut EventLog, budget: &MonostaticBudget, report: &BudgetReport) {
        egui::Grid::new("budget_lines").num_columns(3).striped(true).show(ui, |ui| {
            ui.strong("Item");
            ui.strong("dB");
            ui.strong("Running (dBm)");
            ui.end_row();
            for line in &report.lines {
                ui.label(line.label);
                ui.monospace(format!("{:+.2}", line.value_db));
                ui.monospace(format!("{:.2}", line.running_dbm));
                ui.end_row();
            }
        });
        ui.separator();
        let margin_color = if report.margin_db >= 0.0 {
            Color32::from_rgb(80, 200, 120)
        } else {
            Color32::from_rgb(255, 90, 90)
        };
        egui::Grid::new("budget_out").num_columns(2).show(ui, |ui| {
            value_row(ui, "Received power", format!("{:.2} dBm", report.received_power_dbm));
            value_row(ui, "Noise floor", format!("{:.2} dBm", report.noise_floor_dbm));
            value_row(ui, "Processing gain", format!("{:.2} dB", report.processing_gain_db));
            value_row(ui, "SNR", format!("{:.2} dB", report.snr_db));
            ui.label("Margin");
            ui.label(RichText::new(format!("{:+.2} dB", report.margin_db)).color(margin_color).monospace());
            ui.end_row();
            let max_range = report
                .max_range_m
                .map(|r| format!("{r:.2} m"))
                .unwrap_or_else(|| "no solution".to_owned());
            value_row(ui, "Max range", max_range);
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Sweep");
            ui.add(egui::DragValue::new(&mut self.sweep_min_m).speed(0.1).clamp_range(0.001..=1e6).suffix(" m"));
            ui.label("to");
            ui.add(egui::DragValue::new(&mut self.sweep_max_m).speed(1.0).clamp_range(0.01..=1e7).suffix(" m"));
        });
        let sweep = match self.sweep(budget) {
            Ok(points) => points,
            Err(err) => return widgets::error_label(ui, err),
        };
        // Range axis is log10(m).
        let curve: Vec<[f64; 2]> = sweep.iter().map(|&(r, s)| [r.log10(), s]).collect();
        Plot::new("snr_curve").height(240.0).show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::new(curve)).name("SNR (dB)"));
            plot_ui.hline(HLine::new(budget.required_snr_db).name("required").color(Color32::YELLOW));
            if let Some(r) = report.max_range_m {
                plot_ui.vline(VLine::new(r.log10()).name("max range"));
            }
        });
        ui.label("x axis: log10(range / m)");

        ui.horizontal(|ui| {
            ui.label("Export label");
            ui.text_edit_singleline(&mut self.label);
        });
        ui.horizontal(|ui| {
            if ui.button("Budget CSV").clicked() {
                report_export(log, "budget CSV", || self.writer.export_budget(&self.label, report));
            }
            if ui.button("SNR sweep CSV").clicked() {
                report_export(log, "SNR sweep CSV", || {
                    self.writer.export_snr_sweep(&self.label, &sweep, budget.required_snr_db)
                });
            }
            if ui.button("SNR plot PNG").clicked() {
                report_export(log, "SNR plot PNG", || {
                    let png = render_snr_curve_png(&sweep, budget.required_snr_db, &self.style)?;
                    self.writer.write_png("snr_curve", &self.label, &png)
                });
            }
        });
    }
}
