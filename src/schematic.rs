// src/schematic.rs
use eframe::egui;
use egui::{Color32, Pos2, Rounding, Stroke, Vec2};
use crate::calc::units::format_engineering;

const WIRE: Color32 = Color32::from_rgb(170, 170, 175);
const BODY: Color32 = Color32::from_rgb(50, 50, 55);
const TEXT: Color32 = Color32::from_rgb(200, 200, 200);
const NODE: Color32 = Color32::from_rgb(0, 200, 200);

/// Labels shown next to each part of a two-resistor ladder.
pub struct LadderLabels<'a> {
    pub top_net: &'a str,
    pub top_value: Option<f64>,
    pub tap_net: &'a str,
    pub tap_value: Option<f64>,
    pub r1: Option<f64>,
    pub r2: Option<f64>,
    /// Draw a regulator block feeding the top net.
    pub regulator: bool,
}

/// Vin → R1 → Vout → R2 → GND.
pub fn draw_divider(ui: &mut egui::Ui, r1: Option<f64>, r2: Option<f64>, vin: Option<f64>, vout: Option<f64>) {
    draw_ladder(
        ui,
        &LadderLabels {
            top_net: "Vin",
            top_value: vin,
            tap_net: "Vout",
            tap_value: vout,
            r1,
            r2,
            regulator: false,
        },
    );
}

/// Regulator output → R1 → FB → R2 → GND.
pub fn draw_feedback(ui: &mut egui::Ui, r1: Option<f64>, r2: Option<f64>, vout: Option<f64>, vfb: Option<f64>) {
    draw_ladder(
        ui,
        &LadderLabels {
            top_net: "Vout",
            top_value: vout,
            tap_net: "FB",
            tap_value: vfb,
            r1,
            r2,
            regulator: true,
        },
    );
}

fn draw_ladder(ui: &mut egui::Ui, labels: &LadderLabels<'_>) {
    let width = 260.0;
    let height = 300.0;
    let (response, painter) = ui.allocate_painter(Vec2::new(width, height), egui::Sense::hover());
    let rect = response.rect;
    let x = rect.min.x + 110.0;
    let top = Pos2::new(x, rect.min.y + 30.0);
    let tap = Pos2::new(x, rect.min.y + 150.0);
    let gnd = Pos2::new(x, rect.min.y + 265.0);
    let wire = Stroke::new(2.0, WIRE);
    let volts = |v: Option<f64>| v.map(|v| format_engineering(v, "V")).unwrap_or_else(|| "?".to_owned());
    let ohms = |r: Option<f64>| r.map(|r| format_engineering(r, "Ω")).unwrap_or_else(|| "?".to_owned());

    // 1. Top net
    if labels.regulator {
        let block = egui::Rect::from_center_size(top - Vec2::new(70.0, 0.0), Vec2::new(60.0, 36.0));
        painter.rect_filled(block, Rounding::same(4.0), BODY);
        painter.rect_stroke(block, Rounding::same(4.0), Stroke::new(1.5, WIRE));
        painter.text(
            block.center(),
            egui::Align2::CENTER_CENTER,
            "REG",
            egui::FontId::proportional(12.0),
            TEXT,
        );
        painter.line_segment([block.right_center(), top], wire);
    }
    painter.circle_filled(top, 4.0, NODE);
    painter.text(
        top + Vec2::new(10.0, -4.0),
        egui::Align2::LEFT_BOTTOM,
        format!("{} = {}", labels.top_net, volts(labels.top_value)),
        egui::FontId::proportional(13.0),
        TEXT,
    );

    // 2. R1 and R2 with the tap between them
    draw_resistor(&painter, top, tap, "R1", &ohms(labels.r1));
    draw_resistor(&painter, tap, gnd, "R2", &ohms(labels.r2));
    painter.circle_filled(tap, 4.0, NODE);
    let tap_end = tap + Vec2::new(80.0, 0.0);
    painter.line_segment([tap, tap_end], wire);
    painter.text(
        tap_end + Vec2::new(4.0, 0.0),
        egui::Align2::LEFT_CENTER,
        format!("{} = {}", labels.tap_net, volts(labels.tap_value)),
        egui::FontId::proportional(13.0),
        TEXT,
    );

    // 3. Ground symbol
    for (i, half) in [14.0, 9.0, 4.0].iter().enumerate() {
        let y = gnd.y + i as f32 * 5.0;
        painter.line_segment([Pos2::new(x - half, y), Pos2::new(x + half, y)], wire);
    }
}

fn draw_resistor(painter: &egui::Painter, from: Pos2, to: Pos2, name: &str, value: &str) {
    let wire = Stroke::new(2.0, WIRE);
    let len = to.y - from.y;
    let body_top = from.y + len * 0.25;
    let body_bottom = from.y + len * 0.75;
    painter.line_segment([from, Pos2::new(from.x, body_top)], wire);
    painter.line_segment([Pos2::new(from.x, body_bottom), to], wire);
    // Zigzag body
    let teeth = 6;
    let step = (body_bottom - body_top) / teeth as f32;
    let mut points = vec![Pos2::new(from.x, body_top)];
    for k in 0..teeth {
        let dx = if k % 2 == 0 { 10.0 } else { -10.0 };
        points.push(Pos2::new(from.x + dx, body_top + step * (k as f32 + 0.5)));
    }
    points.push(Pos2::new(from.x, body_bottom));
    painter.add(egui::Shape::line(points, wire));
    let mid = Pos2::new(from.x - 18.0, (body_top + body_bottom) / 2.0);
    painter.text(
        mid - Vec2::new(0.0, 8.0),
        egui::Align2::RIGHT_CENTER,
        name,
        egui::FontId::proportional(13.0),
        TEXT,
    );
    painter.text(
        mid + Vec2::new(0.0, 8.0),
        egui::Align2::RIGHT_CENTER,
        value,
        egui::FontId::proportional(12.0),
        NODE,
    );
}
