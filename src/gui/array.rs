// src/gui/array.rs
use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{HLine, Legend, Line, MarkerShape, Plot, PlotPoints, Points, VLine};
use crate::calc::array::{analyze, max_grating_free_spacing, predicted_grating_lobes};
use crate::calc::{
    render_array_layout_png, render_beam_pattern_png, AngleSampling, BeamMetrics, BeamPattern, CalcError, Cut,
    Element, ElementRole, PlotStyle, TShapeLayout, Taper,
};
use crate::config::AppConfig;
use crate::gui::widgets::{self, value_row};
use crate::gui::{report_export, EventLog};
use crate::report::ReportWriter;

#[derive(Clone, Copy, PartialEq)]
struct ArrayInputs {
    layout: TShapeLayout,
    sampling: AngleSampling,
    steer_deg: f64,
    taper: Taper,
    cut: Cut,
    grating_threshold_db: f64,
}

struct Solved {
    elements: Vec<Element>,
    pattern: BeamPattern,
    metrics: BeamMetrics,
}

pub struct ArrayTab {
    inputs: ArrayInputs,
    solved_for: Option<ArrayInputs>,
    solved: Option<Result<Solved, CalcError>>,
    writer: ReportWriter,
    style: PlotStyle,
}

impl ArrayTab {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            inputs: ArrayInputs {
                layout: cfg.array.layout,
                sampling: cfg.array.sampling,
                steer_deg: 0.0,
                taper: Taper::Uniform,
                cut: Cut::Azimuth,
                grating_threshold_db: cfg.array.grating_threshold_db,
            },
            solved_for: None,
            solved: None,
            writer: ReportWriter::new(cfg.export_dir.clone()),
            style: PlotStyle::sized(cfg.plot_width, cfg.plot_height),
        }
    }

    fn solve(inputs: &ArrayInputs) -> Result<Solved, CalcError> {
        let l = &inputs.layout;
        let pattern = l.pattern(inputs.cut, inputs.steer_deg, inputs.taper, &inputs.sampling)?;
        let metrics = analyze(&pattern, inputs.steer_deg, inputs.grating_threshold_db)?;
        let mut elements = l.tx_elements();
        elements.extend(l.rx_elements());
        elements.extend(l.virtual_elements());
        Ok(Solved {
            elements,
            pattern,
            metrics,
        })
    }

    // Recompute only when an input moved.
    fn refresh(&mut self) {
        if self.solved_for != Some(self.inputs) {
            self.solved = Some(Self::solve(&self.inputs));
            self.solved_for = Some(self.inputs);
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, log: &mut EventLog) {
        ui.heading("T-Shape Array Visualizer");
        self.controls_ui(ui);
        self.refresh();
        ui.separator();
        match &self.solved {
            Some(Ok(solved)) => self.results_ui(ui, log, solved),
            Some(Err(err)) => widgets::error_label(ui, err),
            None => {}
        }
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui) {
        let i = &mut self.inputs;
        egui::Grid::new("array_in").num_columns(4).show(ui, |ui| {
            ui.label("Tx elements");
            ui.add(egui::DragValue::new(&mut i.layout.tx_count).clamp_range(1..=256));
            ui.label("Tx spacing");
            ui.add(egui::DragValue::new(&mut i.layout.tx_spacing_wl).speed(0.01).clamp_range(0.05..=4.0).suffix(" λ"));
            ui.end_row();
            ui.label("Rx elements");
            ui.add(egui::DragValue::new(&mut i.layout.rx_count).clamp_range(1..=256));
            ui.label("Rx spacing");
            ui.add(egui::DragValue::new(&mut i.layout.rx_spacing_wl).speed(0.01).clamp_range(0.05..=4.0).suffix(" λ"));
            ui.end_row();
            ui.label("Taper");
            egui::ComboBox::from_id_source("array_taper")
                .selected_text(i.taper.label())
                .show_ui(ui, |ui| {
                    for t in Taper::ALL {
                        ui.selectable_value(&mut i.taper, t, t.label());
                    }
                });
            ui.label("Cut");
            ui.horizontal(|ui| {
                ui.selectable_value(&mut i.cut, Cut::Azimuth, "Azimuth (Tx bar)");
                ui.selectable_value(&mut i.cut, Cut::Elevation, "Elevation (Rx stem)");
            });
            ui.end_row();
            ui.label("Grating threshold");
            ui.add(egui::DragValue::new(&mut i.grating_threshold_db).speed(0.1).clamp_range(0.0..=30.0).suffix(" dB"));
            ui.label("Angle samples");
            ui.add(egui::DragValue::new(&mut i.sampling.samples).clamp_range(3..=20_000));
            ui.end_row();
        });
        ui.add(egui::Slider::new(&mut i.steer_deg, -60.0..=60.0).text("Steering (deg)"));
    }

    fn results_ui(&self, ui: &mut egui::Ui, log: &mut EventLog, solved: &Solved) {
        let inputs = &self.inputs;
        let layout = &inputs.layout;
        ui.label(format!(
            "{} Tx × {} Rx → {} virtual elements",
            layout.tx_count,
            layout.rx_count,
            layout.virtual_count()
        ));
        let spacing = layout.spacing_for(inputs.cut);
        let limit = max_grating_free_spacing(inputs.steer_deg);
        if spacing > limit {
            let lobes: Vec<String> = predicted_grating_lobes(spacing, inputs.steer_deg)
                .iter()
                .map(|a| format!("{a:.1}°"))
                .collect();
            ui.label(
                RichText::new(format!(
                    "Spacing {spacing:.2} λ exceeds the grating-free limit {limit:.2} λ at {:.0}°; expect lobes at {}",
                    inputs.steer_deg,
                    lobes.join(", ")
                ))
                .color(Color32::YELLOW),
            );
        }

        ui.columns(2, |cols| {
            layout_plot(&mut cols[0], &solved.elements);
            pattern_plot(&mut cols[1], &solved.pattern, inputs.steer_deg);
        });
        metrics_grid(ui, &solved.metrics);

        ui.horizontal(|ui| {
            let label = format!("{}_{}x{}", inputs.cut, layout.tx_count, layout.rx_count);
            if ui.button("Pattern CSV").clicked() {
                report_export(log, "beam pattern CSV", || self.writer.export_beam_pattern(&label, &solved.pattern));
            }
            if ui.button("Pattern PNG").clicked() {
                report_export(log, "beam pattern PNG", || {
                    let name = inputs.cut.to_string();
                    let png = render_beam_pattern_png(&[(name.as_str(), &solved.pattern)], inputs.steer_deg, -60.0, &self.style)?;
                    self.writer.write_png("beam_pattern", &label, &png)
                });
            }
            if ui.button("Layout PNG").clicked() {
                report_export(log, "array layout PNG", || {
                    let png = render_array_layout_png(&solved.elements, &self.style)?;
                    self.writer.write_png("array_layout", &label, &png)
                });
            }
        });
    }
}

fn layout_plot(ui: &mut egui::Ui, elements: &[Element]) {
    let group = |role: ElementRole| -> Vec<[f64; 2]> {
        elements
            .iter()
            .filter(|e| e.role == role)
            .map(|e| [e.x_wl, e.y_wl])
            .collect()
    };
    Plot::new("array_layout")
        .height(280.0)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::new(group(ElementRole::Virtual)))
                    .radius(3.0)
                    .color(Color32::from_rgb(80, 200, 120))
                    .name("Virtual"),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(group(ElementRole::Tx)))
                    .radius(5.0)
                    .shape(MarkerShape::Square)
                    .color(Color32::from_rgb(0, 160, 255))
                    .name("Tx"),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(group(ElementRole::Rx)))
                    .radius(5.0)
                    .shape(MarkerShape::Diamond)
                    .color(Color32::from_rgb(255, 90, 90))
                    .name("Rx"),
            );
        });
}

fn pattern_plot(ui: &mut egui::Ui, pattern: &BeamPattern, steer_deg: f64) {
    let points: Vec<[f64; 2]> = pattern
        .angles_deg
        .iter()
        .zip(&pattern.db)
        .map(|(&a, &d)| [a, d.max(-60.0)])
        .collect();
    Plot::new("beam_pattern")
        .height(280.0)
        .include_y(-60.0)
        .include_y(0.0)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::new(points)).name("AF (dB)").color(Color32::from_rgb(0, 255, 255)));
            plot_ui.hline(HLine::new(-3.0).name("-3 dB").color(Color32::YELLOW));
            plot_ui.vline(VLine::new(steer_deg).name("steer"));
        });
}

fn metrics_grid(ui: &mut egui::Ui, m: &BeamMetrics) {
    let opt = |v: Option<f64>, unit: &str| v.map(|v| format!("{v:.2}{unit}")).unwrap_or_else(|| "n/a".to_owned());
    egui::Grid::new("array_metrics").num_columns(2).show(ui, |ui| {
        value_row(ui, "Main lobe", format!("{:.2}°", m.peak_deg));
        value_row(ui, "3 dB beamwidth", opt(m.beamwidth_3db_deg, "°"));
        if let Some((lo, hi)) = m.half_power_deg {
            value_row(ui, "Half-power points", format!("{lo:.2}° … {hi:.2}°"));
        }
        value_row(
            ui,
            "First nulls",
            format!("{} / {}", opt(m.first_nulls_deg.0, "°"), opt(m.first_nulls_deg.1, "°")),
        );
        value_row(ui, "Peak sidelobe", opt(m.peak_sidelobe_db, " dB"));
        let lobes = if m.grating_lobes_deg.is_empty() {
            "none".to_owned()
        } else {
            m.grating_lobes_deg
                .iter()
                .map(|a| format!("{a:.1}°"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        value_row(ui, "Grating lobes", lobes);
    });
}
