// src/gui/fmcw.rs
use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints, VLine};
use crate::calc::fmcw::{max_range_fmcw, near_field, ChirpConfig, RadarEquationInputs};
use crate::calc::units::{format_engineering, watts_to_dbm};
use crate::calc::{render_range_profile_png, BeatSimulation, CalcError, PlotStyle, RangeProfile, Taper};
use crate::config::AppConfig;
use crate::gui::widgets::{self, count_row, number_row, scaled_row, value_row};
use crate::gui::{report_export, EventLog};
use crate::report::ReportWriter;

pub struct FmcwTab {
    chirp: ChirpConfig,
    use_if_limit: bool,
    if_limit_hz: f64,
    aperture_m: f64,
    radar: RadarEquationInputs,
    target_range_m: f64,
    taper: Taper,
    profile: Option<Result<RangeProfile, CalcError>>,
    writer: ReportWriter,
    style: PlotStyle,
}

impl FmcwTab {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            chirp: ChirpConfig::default(),
            use_if_limit: false,
            if_limit_hz: 5e6,
            aperture_m: 0.1,
            radar: RadarEquationInputs::default(),
            target_range_m: 10.0,
            taper: Taper::Hann,
            profile: None,
            writer: ReportWriter::new(cfg.export_dir.clone()),
            style: PlotStyle::sized(cfg.plot_width, cfg.plot_height),
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, log: &mut EventLog) {
        ui.heading("FMCW Radar Debug");
        ui.columns(2, |cols| {
            self.chirp_ui(&mut cols[0]);
            self.radar_ui(&mut cols[1]);
        });
        ui.separator();
        self.simulator_ui(ui, log);
    }

    fn chirp_ui(&mut self, ui: &mut egui::Ui) {
        ui.strong("Chirp");
        egui::Grid::new("chirp_in").num_columns(2).show(ui, |ui| {
            let c = &mut self.chirp;
            scaled_row(ui, "Carrier", &mut c.carrier_hz, 1e9, 0.1, " GHz");
            scaled_row(ui, "Bandwidth", &mut c.bandwidth_hz, 1e9, 0.01, " GHz");
            scaled_row(ui, "Ramp time", &mut c.chirp_time_s, 1e-6, 0.1, " µs");
            scaled_row(ui, "Chirp period", &mut c.chirp_period_s, 1e-6, 0.1, " µs");
            scaled_row(ui, "ADC rate", &mut c.sample_rate_hz, 1e6, 0.1, " MS/s");
            count_row(ui, "FFT size", &mut c.fft_size, 1 << 16);
            count_row(ui, "Chirps / frame", &mut c.num_chirps, 4096);
            ui.checkbox(&mut self.use_if_limit, "IF filter edge");
            ui.add_enabled(
                self.use_if_limit,
                egui::DragValue::new(&mut self.if_limit_hz)
                    .speed(1e4)
                    .custom_formatter(|v, _| format!("{:.2} MHz", v / 1e6)),
            );
            ui.end_row();
        });
        self.chirp.if_max_hz = self.use_if_limit.then_some(self.if_limit_hz);

        match self.chirp.summarize() {
            Ok(s) => {
                egui::Grid::new("chirp_out").num_columns(2).show(ui, |ui| {
                    value_row(ui, "Slope", format!("{:.3} MHz/µs", s.slope_hz_per_s / 1e12));
                    value_row(ui, "Wavelength", format_engineering(s.wavelength_m, "m"));
                    value_row(ui, "Range resolution", format_engineering(s.range_resolution_m, "m"));
                    value_row(ui, "Range per bin", format_engineering(s.range_per_bin_m, "m"));
                    value_row(ui, "ADC limit", format!("{:.2} m", s.max_range.adc_limit_m));
                    if let Some(r) = s.max_range.if_limit_m {
                        value_row(ui, "IF limit", format!("{r:.2} m"));
                    }
                    value_row(ui, "Timing limit", format!("{:.1} m", s.max_range.timing_limit_m));
                    value_row(
                        ui,
                        "Max range",
                        format!("{:.2} m ({})", s.max_range.unambiguous_m, s.max_range.limiting),
                    );
                    value_row(ui, "Max velocity", format!("±{:.2} m/s", s.max_velocity_mps));
                    value_row(ui, "Velocity resolution", format!("{:.3} m/s", s.velocity_resolution_mps));
                });
            }
            Err(err) => widgets::error_label(ui, err),
        }

        ui.add_space(8.0);
        ui.strong("Near field");
        egui::Grid::new("near_field").num_columns(2).show(ui, |ui| {
            scaled_row(ui, "Aperture", &mut self.aperture_m, 1e-2, 0.1, " cm");
            match near_field(self.chirp.carrier_hz, self.aperture_m) {
                Ok(nf) => value_row(ui, "Far field from", format!("{:.3} m (2D²/λ)", nf.far_field_m)),
                Err(err) => value_row(ui, "Far field from", err.to_string()),
            }
        });
    }

    fn radar_ui(&mut self, ui: &mut egui::Ui) {
        ui.strong("Radar equation");
        egui::Grid::new("radar_in").num_columns(2).show(ui, |ui| {
            let r = &mut self.radar;
            number_row(ui, "Tx power", &mut r.tx_power_dbm, 0.1, " dBm");
            number_row(ui, "Tx gain", &mut r.tx_gain_dbi, 0.1, " dBi");
            number_row(ui, "Rx gain", &mut r.rx_gain_dbi, 0.1, " dBi");
            scaled_row(ui, "Carrier", &mut r.carrier_hz, 1e9, 0.1, " GHz");
            number_row(ui, "RCS", &mut r.rcs_m2, 0.01, " m²");
            number_row(ui, "System loss", &mut r.system_loss_db, 0.1, " dB");
            number_row(ui, "Noise figure", &mut r.noise_figure_db, 0.1, " dB");
            number_row(ui, "Noise temperature", &mut r.noise_temp_k, 1.0, " K");
            scaled_row(ui, "IF bandwidth", &mut r.if_bandwidth_hz, 1e6, 0.1, " MHz");
            number_row(ui, "Min SNR", &mut r.snr_min_db, 0.1, " dB");
            count_row(ui, "Range bins", &mut r.range_bins, 1 << 16);
            count_row(ui, "Doppler bins", &mut r.doppler_bins, 4096);
        });
        match max_range_fmcw(&self.radar) {
            Ok(out) => {
                egui::Grid::new("radar_out").num_columns(2).show(ui, |ui| {
                    let noise = watts_to_dbm(out.noise_power_w)
                        .map(|d| format!("{d:.2} dBm"))
                        .unwrap_or_else(|e| e.to_string());
                    value_row(ui, "Noise power", noise);
                    value_row(ui, "Processing gain", format!("{:.2} dB", out.processing_gain_db));
                    value_row(ui, "CW max range", format!("{:.2} m", out.cw_range_m));
                    value_row(ui, "FMCW max range", format!("{:.2} m", out.max_range_m));
                });
            }
            Err(err) => widgets::error_label(ui, err),
        }
    }

    fn simulator_ui(&mut self, ui: &mut egui::Ui, log: &mut EventLog) {
        ui.strong("Range FFT simulator");
        ui.horizontal(|ui| {
            ui.label("Target range");
            ui.add(egui::DragValue::new(&mut self.target_range_m).speed(0.05).suffix(" m"));
            egui::ComboBox::from_id_source("fft_taper")
                .selected_text(self.taper.label())
                .show_ui(ui, |ui| {
                    for t in Taper::ALL {
                        ui.selectable_value(&mut self.taper, t, t.label());
                    }
                });
            if ui.button("Simulate").clicked() {
                let sim = crate::calc::fmcw::slope(self.chirp.bandwidth_hz, self.chirp.chirp_time_s).and_then(|s| {
                    BeatSimulation {
                        slope_hz_per_s: s,
                        sample_rate_hz: self.chirp.sample_rate_hz,
                        fft_size: self.chirp.fft_size,
                        target_range_m: self.target_range_m,
                        taper: self.taper,
                    }
                    .run()
                });
                match &sim {
                    Ok(p) => log.push(format!(
                        "FFT peak at bin {} ({:.3} m, beat {})",
                        p.peak_bin,
                        p.peak_range_m,
                        format_engineering(p.beat_hz, "Hz")
                    )),
                    Err(err) => log.push(format!("FFT simulation: {err}")),
                }
                self.profile = Some(sim);
            }
            if let Some(Ok(profile)) = &self.profile {
                if ui.button("Save PNG").clicked() {
                    report_export(log, "range profile PNG", || {
                        let png = render_range_profile_png(profile, &self.style)?;
                        self.writer.write_png("range_profile", &format!("{:.0}m", profile.peak_range_m), &png)
                    });
                }
            }
        });
        match &self.profile {
            Some(Ok(profile)) => {
                let points: Vec<[f64; 2]> = profile
                    .ranges_m
                    .iter()
                    .zip(&profile.magnitudes_db)
                    .map(|(&r, &m)| [r, m])
                    .collect();
                Plot::new("range_fft")
                    .height(260.0)
                    .include_y(-120.0)
                    .include_y(5.0)
                    .show(ui, |plot_ui| {
                        plot_ui.line(Line::new(PlotPoints::new(points)).name("|FFT| (dB)"));
                        plot_ui.vline(VLine::new(self.target_range_m).name("target"));
                    });
                ui.label(format!(
                    "Peak bin {} at {:.3} m, bin width {:.4} m",
                    profile.peak_bin, profile.peak_range_m, profile.range_per_bin_m
                ));
            }
            Some(Err(err)) => widgets::error_label(ui, err),
            None => {}
        }
    }
}
