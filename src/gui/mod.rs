// src/gui/mod.rs
use std::path::PathBuf;
use eframe::egui;
use egui::{Color32, RichText};
use log::warn;
use crate::config::{self, AppConfig};
use crate::gate::AccessGate;
use crate::types::Tab;

mod array;
mod budget;
mod converter;
mod divider;
mod feedback;
mod fmcw;
mod widgets;

const LOG_CAPACITY: usize = 8;

/// In-window log of the most recent events.
pub struct EventLog {
    lines: Vec<String>,
}
impl EventLog {
    pub fn new(first: &str) -> Self {
        let mut log = Self { lines: Vec::new() };
        log.push(first);
        log
    }
    pub fn push(&mut self, msg: impl AsRef<str>) {
        self.lines.push(format!("> {}", msg.as_ref()));
        if self.lines.len() > LOG_CAPACITY {
            self.lines.remove(0);
        }
    }
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Runs an export and reports the outcome in the event log.
pub(crate) fn report_export(log: &mut EventLog, what: &str, export: impl FnOnce() -> anyhow::Result<PathBuf>) {
    match export() {
        Ok(path) => log.push(format!("Saved {what}: {}", path.display())),
        Err(err) => {
            warn!("{what} export failed: {err:#}");
            log.push(format!("{what} export failed: {err}"));
        }
    }
}

pub struct EngCalcApp {
    title: String,
    selected_tab: Tab,
    gate: AccessGate,
    password_input: String,
    log: EventLog,
    divider: divider::DividerTab,
    feedback: feedback::FeedbackTab,
    converter: converter::ConverterTab,
    fmcw: fmcw::FmcwTab,
    budget: budget::BudgetTab,
    array: array::ArrayTab,
}

impl EngCalcApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_config(config::get())
    }

    pub fn with_config(cfg: &AppConfig) -> Self {
        Self {
            title: cfg.window_title.clone(),
            selected_tab: Tab::default(),
            gate: AccessGate::new(&cfg.locked_tab_password),
            password_input: String::new(),
            log: EventLog::new(&format!("{} ready.", cfg.window_title)),
            divider: divider::DividerTab::new(cfg),
            feedback: feedback::FeedbackTab::new(cfg),
            converter: converter::ConverterTab::default(),
            fmcw: fmcw::FmcwTab::new(cfg),
            budget: budget::BudgetTab::new(cfg),
            array: array::ArrayTab::new(cfg),
        }
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        ui.add_space(10.0);
        ui.heading(self.title.as_str());
        ui.label(format!("v{}", env!("CARGO_PKG_VERSION")));
        ui.separator();
        for tab in Tab::ALL {
            let mut text = RichText::new(tab.title());
            if tab == Tab::Array && !self.gate.is_unlocked() {
                text = RichText::new(format!("🔒 {}", tab.title()));
            }
            ui.selectable_value(&mut self.selected_tab, tab, text);
        }
        ui.separator();
        ui.label(RichText::new(self.selected_tab.help()).small());
        ui.add_space(20.0);
        ui.separator();
        ui.label("EVENT LOG");
        egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
            for m in self.log.lines() {
                ui.monospace(m);
            }
        });
    }

    fn locked_tab(&mut self, ui: &mut egui::Ui) {
        ui.heading(Tab::Array.title());
        ui.label("This tool is password protected.");
        let mut submit = false;
        ui.horizontal(|ui| {
            let field = ui.add(egui::TextEdit::singleline(&mut self.password_input).password(true));
            submit |= field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            submit |= ui.button("Unlock").clicked();
        });
        if submit {
            let attempt = std::mem::take(&mut self.password_input);
            if self.gate.try_unlock(&attempt) {
                self.log.push("Array visualizer unlocked");
            } else {
                self.log.push(format!("Wrong password ({} failed)", self.gate.failed_attempts()));
            }
        }
        if self.gate.failed_attempts() > 0 {
            ui.label(RichText::new("Incorrect password.").color(Color32::from_rgb(255, 90, 90)));
        }
    }
}

impl eframe::App for EngCalcApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut visuals = egui::Visuals::dark();
        visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(10, 10, 15);
        ctx.set_visuals(visuals);

        egui::SidePanel::left("tools").min_width(260.0).show(ctx, |ui| {
            self.side_panel(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| match self.selected_tab {
                Tab::Divider => self.divider.ui(ui, &mut self.log),
                Tab::Feedback => self.feedback.ui(ui, &mut self.log),
                Tab::Converter => self.converter.ui(ui),
                Tab::Fmcw => self.fmcw.ui(ui, &mut self.log),
                Tab::Budget => self.budget.ui(ui, &mut self.log),
                Tab::Array => {
                    if self.gate.is_unlocked() {
                        if self.gate.is_protected() && ui.small_button("🔒 Lock").clicked() {
                            self.gate.lock();
                            self.log.push("Array visualizer locked");
                        }
                        self.array.ui(ui, &mut self.log);
                    } else {
                        self.locked_tab(ui);
                    }
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn event_log_keeps_last_eight() {
        let mut log = EventLog::new("start");
        for i in 0..10 {
            log.push(format!("event {i}"));
        }
        assert_eq!(log.lines().len(), LOG_CAPACITY);
        assert_eq!(log.lines()[0], "> event 2");
        assert_eq!(log.lines()[7], "> event 9");
    }
    #[test]
    fn export_failures_are_logged() {
        let mut log = EventLog::new("start");
        report_export(&mut log, "test", || Err(anyhow::anyhow!("disk full")));
        assert_eq!(log.lines()[1], "> test export failed: disk full");
    }
}
