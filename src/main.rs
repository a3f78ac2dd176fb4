// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod calc;
mod config;
mod gate;
mod gui;
mod report;
mod schematic;
mod types;
use eframe::egui;
use log::info;
// Entry point
fn main() -> eframe::Result<()> {
    env_logger::init();
    let cfg = config::get();
    info!("starting {} (exports to {})", cfg.window_title, cfg.export_dir.display());
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1400.0, 900.0])
        .with_min_inner_size([1000.0, 680.0])
        .with_title(cfg.window_title.as_str());
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "engcalc",
        options,
        Box::new(|cc| Box::new(gui::EngCalcApp::new(cc))),
    )
}
