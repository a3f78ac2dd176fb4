// src/gui/widgets.rs
use eframe::egui;
use egui::{Color32, RichText};
use crate::calc::eseries::parse_resistor_list;
use crate::calc::units::format_engineering;
use crate::types::StatusMessage;

/// Resistor list text plus one enable checkbox per parsed value.
pub struct ResistorPicker {
    text: String,
    entries: Vec<(f64, bool)>,
    error: Option<String>,
}

impl ResistorPicker {
    pub fn new(text: &str) -> Self {
        let mut picker = Self {
            text: text.to_owned(),
            entries: Vec::new(),
            error: None,
        };
        picker.reparse();
        picker
    }

    // Values that survive an edit keep their checkbox state. A parse error
    // keeps the last good entries so their flags outlive the typo.
    fn reparse(&mut self) {
        match parse_resistor_list(&self.text) {
            Ok(values) => {
                let previous = std::mem::take(&mut self.entries);
                self.entries = values
                    .into_iter()
                    .map(|v| {
                        let enabled = previous
                            .iter()
                            .find(|(p, _)| (p - v).abs() <= 1e-9 * v)
                            .map_or(true, |(_, on)| *on);
                        (v, enabled)
                    })
                    .collect();
                self.error = None;
            }
            Err(err) => {
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn selected(&self) -> Vec<f64> {
        if self.error.is_some() {
            return Vec::new();
        }
        self.entries.iter().filter(|(_, on)| *on).map(|(v, _)| *v).collect()
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, id: &str) {
        ui.label("Resistor list (comma separated, 4k7 / 2.2M accepted)");
        let edit = egui::TextEdit::multiline(&mut self.text)
            .id_source(id)
            .desired_rows(2)
            .desired_width(f32::INFINITY);
        if ui.add(edit).changed() {
            self.reparse();
        }
        if let Some(err) = &self.error {
            ui.label(RichText::new(err).color(Color32::from_rgb(255, 90, 90)));
            return;
        }
        ui.horizontal(|ui| {
            if ui.small_button("All").clicked() {
                self.entries.iter_mut().for_each(|(_, on)| *on = true);
            }
            if ui.small_button("None").clicked() {
                self.entries.iter_mut().for_each(|(_, on)| *on = false);
            }
            ui.label(format!("{} of {} enabled", self.selected().len(), self.entries.len()));
        });
        ui.horizontal_wrapped(|ui| {
            for (value, on) in &mut self.entries {
                ui.checkbox(on, format_engineering(*value, "Ω"));
            }
        });
    }
}

/// One labelled single-line text field inside a `Grid`.
pub fn text_row(ui: &mut egui::Ui, label: &str, value: &mut String) -> egui::Response {
    ui.label(label);
    let response = ui.add(egui::TextEdit::singleline(value).desired_width(140.0));
    ui.end_row();
    response
}

/// One labelled drag value inside a `Grid`.
pub fn number_row(ui: &mut egui::Ui, label: &str, value: &mut f64, speed: f64, suffix: &str) -> egui::Response {
    ui.label(label);
    let response = ui.add(egui::DragValue::new(value).speed(speed).suffix(suffix).max_decimals(6));
    ui.end_row();
    response
}

/// Edits an SI value shown in `scale` units (e.g. GHz with `scale = 1e9`).
pub fn scaled_row(ui: &mut egui::Ui, label: &str, value_si: &mut f64, scale: f64, speed: f64, suffix: &str) -> egui::Response {
    let mut shown = *value_si / scale;
    let response = number_row(ui, label, &mut shown, speed, suffix);
    if response.changed() {
        *value_si = shown * scale;
    }
    response
}

pub fn count_row(ui: &mut egui::Ui, label: &str, value: &mut usize, max: usize) -> egui::Response {
    ui.label(label);
    let response = ui.add(egui::DragValue::new(value).clamp_range(1..=max));
    ui.end_row();
    response
}

/// A read-only result row.
pub fn value_row(ui: &mut egui::Ui, label: &str, value: impl Into<String>) {
    ui.label(label);
    ui.monospace(value.into());
    ui.end_row();
}

pub fn status_label(ui: &mut egui::Ui, status: &Option<StatusMessage>) {
    if let Some(msg) = status {
        ui.label(RichText::new(&msg.text).color(msg.kind.color()));
    }
}

pub fn error_label(ui: &mut egui::Ui, err: impl std::fmt::Display) {
    ui.label(RichText::new(err.to_string()).color(Color32::from_rgb(255, 90, 90)));
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn picker_keeps_flags_across_edits() {
        let mut picker = ResistorPicker::new("1k, 2k2, 4k7");
        assert_eq!(picker.selected(), vec![1000.0, 2200.0, 4700.0]);
        picker.entries[1].1 = false;
        picker.text.push_str(", 10k");
        picker.reparse();
        assert_eq!(picker.selected(), vec![1000.0, 4700.0, 10_000.0]);
        let good = picker.text.clone();
        picker.text.push_str(", 1o");
        picker.reparse();
        assert!(picker.error.is_some());
        assert!(picker.selected().is_empty());
        picker.text = good;
        picker.reparse();
        assert!(picker.error.is_none());
        assert_eq!(picker.selected(), vec![1000.0, 4700.0, 10_000.0]);
    }
}
