// src/gui/converter.rs
use eframe::egui;
use crate::calc::constants::DEFAULT_IMPEDANCE_OHMS;
use crate::calc::units::{
    db_to_power_ratio, db_to_voltage_ratio, format_engineering, frequency_to_wavelength,
    reflection_coefficient, return_loss_to_vswr, vswr_to_return_loss, wavelength_to_frequency,
    PowerReading, PowerUnit, VoltageReading, VoltageUnit,
};
use crate::gui::widgets;

pub struct ConverterTab {
    impedance_ohms: f64,
    power_value: f64,
    power_unit: PowerUnit,
    voltage_value: f64,
    voltage_unit: VoltageUnit,
    ratio_db: f64,
    frequency_ghz: f64,
    wavelength_mm: f64,
    return_loss_db: f64,
    vswr: f64,
}

impl Default for ConverterTab {
    fn default() -> Self {
        Self {
            impedance_ohms: DEFAULT_IMPEDANCE_OHMS,
            power_value: 0.0,
            power_unit: PowerUnit::Dbm,
            voltage_value: 1.0,
            voltage_unit: VoltageUnit::Volt,
            ratio_db: 3.0,
            frequency_ghz: 77.0,
            wavelength_mm: 3.9,
            return_loss_db: 10.0,
            vswr: 2.0,
        }
    }
}

impl ConverterTab {
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("dB / Unit Converter");
        ui.horizontal(|ui| {
            ui.label("Reference impedance");
            ui.add(
                egui::DragValue::new(&mut self.impedance_ohms)
                    .speed(1.0)
                    .clamp_range(0.001..=1e6)
                    .suffix(" Ω"),
            );
        });
        ui.separator();
        ui.columns(2, |cols| {
            self.power_ui(&mut cols[0]);
            self.voltage_ui(&mut cols[1]);
        });
        ui.separator();
        ui.columns(3, |cols| {
            self.ratio_ui(&mut cols[0]);
            self.wavelength_ui(&mut cols[1]);
            self.match_ui(&mut cols[2]);
        });
    }

    fn power_ui(&mut self, ui: &mut egui::Ui) {
        ui.strong("Power");
        ui.horizontal(|ui| {
            ui.add(egui::DragValue::new(&mut self.power_value).speed(0.1).max_decimals(6));
            unit_combo(ui, "pw_unit", &mut self.power_unit, &PowerUnit::ALL, |u| u.label());
        });
        let reading = match PowerReading::from_unit(self.power_value, self.power_unit) {
            Ok(r) => r,
            Err(err) => return widgets::error_label(ui, err),
        };
        egui::Grid::new("pw_out").num_columns(2).show(ui, |ui| {
            for unit in PowerUnit::ALL {
                widgets::value_row(ui, unit.label(), format!("{:.6}", reading.in_unit(unit)));
            }
            match reading.to_voltage(self.impedance_ohms) {
                Ok(v) => {
                    widgets::value_row(ui, "Vrms", format_engineering(v.volts(), "V"));
                    widgets::value_row(ui, "Vpeak", format_engineering(v.volts() * 2f64.sqrt(), "V"));
                    widgets::value_row(ui, "dBµV", format!("{:.3}", v.in_unit(VoltageUnit::Dbuv)));
                }
                Err(err) => widgets::value_row(ui, "Vrms", err.to_string()),
            }
        });
    }

    fn voltage_ui(&mut self, ui: &mut egui::Ui) {
        ui.strong("Voltage (RMS)");
        ui.horizontal(|ui| {
            ui.add(egui::DragValue::new(&mut self.voltage_value).speed(0.01).max_decimals(6));
            unit_combo(ui, "v_unit", &mut self.voltage_unit, &VoltageUnit::ALL, |u| u.label());
        });
        let reading = match VoltageReading::from_unit(self.voltage_value, self.voltage_unit) {
            Ok(r) => r,
            Err(err) => return widgets::error_label(ui, err),
        };
        egui::Grid::new("v_out").num_columns(2).show(ui, |ui| {
            for unit in VoltageUnit::ALL {
                widgets::value_row(ui, unit.label(), format!("{:.6}", reading.in_unit(unit)));
            }
            match reading.to_power(self.impedance_ohms) {
                Ok(p) => {
                    widgets::value_row(ui, "Power", format_engineering(p.watts(), "W"));
                    widgets::value_row(ui, "dBm", format!("{:.3}", p.in_unit(PowerUnit::Dbm)));
                }
                Err(err) => widgets::value_row(ui, "Power", err.to_string()),
            }
        });
    }

    fn ratio_ui(&mut self, ui: &mut egui::Ui) {
        ui.strong("dB ratio");
        egui::Grid::new("db_ratio").num_columns(2).show(ui, |ui| {
            widgets::number_row(ui, "Ratio", &mut self.ratio_db, 0.1, " dB");
            widgets::value_row(ui, "Power ×", format!("{:.6}", db_to_power_ratio(self.ratio_db)));
            widgets::value_row(ui, "Voltage ×", format!("{:.6}", db_to_voltage_ratio(self.ratio_db)));
        });
    }

    fn wavelength_ui(&mut self, ui: &mut egui::Ui) {
        ui.strong("Frequency ↔ wavelength");
        egui::Grid::new("lambda").num_columns(2).show(ui, |ui| {
            if widgets::number_row(ui, "Frequency", &mut self.frequency_ghz, 0.1, " GHz").changed() {
                if let Ok(m) = frequency_to_wavelength(self.frequency_ghz * 1e9) {
                    self.wavelength_mm = m * 1e3;
                }
            }
            if widgets::number_row(ui, "Wavelength", &mut self.wavelength_mm, 0.01, " mm").changed() {
                if let Ok(hz) = wavelength_to_frequency(self.wavelength_mm * 1e-3) {
                    self.frequency_ghz = hz / 1e9;
                }
            }
            if let Ok(m) = frequency_to_wavelength(self.frequency_ghz * 1e9) {
                widgets::value_row(ui, "λ/2", format_engineering(m / 2.0, "m"));
            }
        });
    }

    fn match_ui(&mut self, ui: &mut egui::Ui) {
        ui.strong("Return loss / VSWR");
        egui::Grid::new("rl_vswr").num_columns(2).show(ui, |ui| {
            if widgets::number_row(ui, "Return loss", &mut self.return_loss_db, 0.1, " dB").changed() {
                if let Ok(v) = return_loss_to_vswr(self.return_loss_db) {
                    self.vswr = v;
                }
            }
            if widgets::number_row(ui, "VSWR", &mut self.vswr, 0.01, ":1").changed() {
                if let Ok(rl) = vswr_to_return_loss(self.vswr) {
                    if rl.is_finite() {
                        self.return_loss_db = rl;
                    }
                }
            }
            match reflection_coefficient(self.return_loss_db) {
                Ok(gamma) => {
                    widgets::value_row(ui, "|Γ|", format!("{gamma:.4}"));
                    widgets::value_row(ui, "Mismatch loss", format!("{:.3} dB", -10.0 * (1.0 - gamma * gamma).log10()));
                }
                Err(err) => widgets::value_row(ui, "|Γ|", err.to_string()),
            }
        });
    }
}

fn unit_combo<U: Copy + PartialEq>(
    ui: &mut egui::Ui,
    id: &str,
    current: &mut U,
    all: &[U],
    label: impl Fn(U) -> &'static str,
) {
    egui::ComboBox::from_id_source(id)
        .selected_text(label(*current))
        .show_ui(ui, |ui| {
            for &unit in all {
                ui.selectable_value(current, unit, label(unit));
            }
        });
}
