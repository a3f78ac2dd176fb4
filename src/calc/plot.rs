// src/calc/plot.rs
use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::calc::array::{BeamPattern, Element, ElementRole};
use crate::calc::error::CalcError;
use crate::calc::range_fft::RangeProfile;

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub palette: Vec<RGBColor>,
    /// Captions, tick labels and legends. Off renders geometry only.
    pub annotate: bool,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 10),
            palette: vec![BLUE, RED, GREEN, CYAN, MAGENTA, YELLOW, WHITE],
            annotate: true,
        }
    }
}
impl PlotStyle {
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
    fn color(&self, idx: usize) -> RGBColor {
        if self.palette.is_empty() {
            WHITE
        } else {
            self.palette[idx % self.palette.len()]
        }
    }
    fn check(&self) -> Result<(), CalcError> {
        if self.width < 64 || self.height < 64 {
            return Err(CalcError::Plot(format!(
                "plot size {}x{} is too small",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Shared frame: background, caption and mesh for a cartesian f64 chart.
macro_rules! chart_on {
    ($root:expr, $style:expr, $title:expr, $x:expr, $y:expr, $xdesc:expr, $ydesc:expr) => {{
        let mut builder = ChartBuilder::on($root);
        builder.margin(10);
        if $style.annotate {
            builder
                .caption($title, ("sans-serif", 20).into_font().color(&WHITE))
                .set_label_area_size(LabelAreaPosition::Left, 55)
                .set_label_area_size(LabelAreaPosition::Bottom, 40);
        }
        let mut chart = builder.build_cartesian_2d($x, $y)?;
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(&WHITE.mix(0.1))
            .axis_style(&WHITE.mix(0.6));
        if $style.annotate {
            mesh.x_desc($xdesc)
                .y_desc($ydesc)
                .label_style(("sans-serif", 12).into_font().color(&WHITE));
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;
        chart
    }};
}

fn draw_legend<'a, DB: DrawingBackend + 'a, CT: CoordTranslate>(
    chart: &mut ChartContext<'a, DB, CT>,
    style: &PlotStyle,
) -> Result<(), CalcError>
where
    DB::ErrorType: 'static,
{
    if style.annotate {
        chart
            .configure_series_labels()
            .border_style(&WHITE.mix(0.2))
            .background_style(&style.background)
            .label_font(("sans-serif", 12).into_font().color(&WHITE))
            .draw()?;
    }
    Ok(())
}

/// Array factor in dB against angle, one trace per pattern.
pub fn render_beam_pattern_png(
    patterns: &[(&str, &BeamPattern)],
    steer_deg: f64,
    floor_db: f64,
    style: &PlotStyle,
) -> Result<Vec<u8>, CalcError> {
    style.check()?;
    if patterns.is_empty() || patterns.iter().any(|(_, p)| p.angles_deg.is_empty()) {
        return Err(CalcError::Plot("beam pattern has no samples".into()));
    }
    let x_min = patterns
        .iter()
        .filter_map(|(_, p)| p.angles_deg.first().copied())
        .fold(f64::INFINITY, f64::min);
    let x_max = patterns
        .iter()
        .filter_map(|(_, p)| p.angles_deg.last().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    let y_min = floor_db.min(-3.5);
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = chart_on!(
            &root,
            style,
            "Array factor",
            x_min..x_max,
            y_min..3.0,
            "angle (deg)",
            "AF (dB)"
        );
        for (idx, (label, pattern)) in patterns.iter().enumerate() {
            let color = style.color(idx);
            let series = pattern
                .angles_deg
                .iter()
                .zip(&pattern.db)
                .map(|(&a, &d)| (a, d.max(y_min)));
            let drawn = chart.draw_series(LineSeries::new(series, &color))?;
            if style.annotate {
                drawn
                    .label(label.to_string())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            }
        }
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x_min, -3.0), (x_max, -3.0)],
            YELLOW.mix(0.6),
        )))?;
        if (x_min..=x_max).contains(&steer_deg) {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(steer_deg, y_min), (steer_deg, 3.0)],
                WHITE.mix(0.4),
            )))?;
        }
        draw_legend(&mut chart, style)?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

/// Element positions in wavelengths, Tx, Rx and virtual in separate colours.
pub fn render_array_layout_png(elements: &[Element], style: &PlotStyle) -> Result<Vec<u8>, CalcError> {
    style.check()?;
    if elements.is_empty() {
        return Err(CalcError::Plot("array has no elements".into()));
    }
    let (mut x0, mut x1, mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for e in elements {
        x0 = x0.min(e.x_wl);
        x1 = x1.max(e.x_wl);
        y0 = y0.min(e.y_wl);
        y1 = y1.max(e.y_wl);
    }
    let pad = 0.5;
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = chart_on!(
            &root,
            style,
            "Element layout",
            (x0 - pad)..(x1 + pad),
            (y0 - pad)..(y1 + pad),
            "x (λ)",
            "y (λ)"
        );
        let roles = [
            (ElementRole::Virtual, "Virtual", 3, style.color(2)),
            (ElementRole::Tx, "Tx", 5, style.color(0)),
            (ElementRole::Rx, "Rx", 5, style.color(1)),
        ];
        for (role, label, radius, color) in roles {
            let points: Vec<(f64, f64)> = elements
                .iter()
                .filter(|e| e.role == role)
                .map(|e| (e.x_wl, e.y_wl))
                .collect();
            if points.is_empty() {
                continue;
            }
            let drawn = chart.draw_series(
                points
                    .into_iter()
                    .map(|p| Circle::new(p, radius, color.filled())),
            )?;
            if style.annotate {
                drawn
                    .label(label)
                    .legend(move |(x, y)| Circle::new((x + 10, y), radius, color.filled()));
            }
        }
        draw_legend(&mut chart, style)?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

/// SNR against range on a log range axis, with the required-SNR line.
pub fn render_snr_curve_png(
    points: &[(f64, f64)],
    required_snr_db: f64,
    style: &PlotStyle,
) -> Result<Vec<u8>, CalcError> {
    style.check()?;
    let points: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(r, s)| *r > 0.0 && r.is_finite() && s.is_finite())
        .collect();
    if points.len() < 2 {
        return Err(CalcError::Plot("SNR sweep needs at least two points".into()));
    }
    let r_min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let r_max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if r_max <= r_min {
        return Err(CalcError::Plot("SNR sweep spans a single range".into()));
    }
    let s_min = points.iter().map(|p| p.1).fold(required_snr_db, f64::min) - 5.0;
    let s_max = points.iter().map(|p| p.1).fold(required_snr_db, f64::max) + 5.0;
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = chart_on!(
            &root,
            style,
            "SNR vs range",
            (r_min..r_max).log_scale(),
            s_min..s_max,
            "range (m)",
            "SNR (dB)"
        );
        let curve = style.color(0);
        let drawn = chart.draw_series(LineSeries::new(points.iter().copied(), &curve))?;
        if style.annotate {
            drawn
                .label("SNR")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &curve));
        }
        let req = style.color(1);
        let drawn = chart.draw_series(std::iter::once(PathElement::new(
            vec![(r_min, required_snr_db), (r_max, required_snr_db)],
            &req,
        )))?;
        if style.annotate {
            drawn
                .label("required")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &req));
        }
        draw_legend(&mut chart, style)?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

pub fn render_range_profile_png(profile: &RangeProfile, style: &PlotStyle) -> Result<Vec<u8>, CalcError> {
    style.check()?;
    let x_max = match profile.ranges_m.last() {
        Some(&r) if r > 0.0 => r,
        _ => return Err(CalcError::Plot("range profile has no bins".into())),
    };
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = chart_on!(
            &root,
            style,
            "Range FFT",
            0f64..x_max,
            -120f64..5.0,
            "range (m)",
            "magnitude (dB)"
        );
        let color = style.color(0);
        chart.draw_series(LineSeries::new(
            profile
                .ranges_m
                .iter()
                .copied()
                .zip(profile.magnitudes_db.iter().copied()),
            &color,
        ))?;
        chart.draw_series(std::iter::once(Circle::new(
            (profile.peak_range_m, 0.0),
            4,
            style.color(1).filled(),
        )))?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CalcError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| CalcError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::array::{AngleSampling, Cut, TShapeLayout};
    use crate::calc::range_fft::BeatSimulation;
    use crate::calc::window::Taper;
    // Tick labels need a system font; geometry-only keeps tests headless.
    fn bare() -> PlotStyle {
        PlotStyle {
            annotate: false,
            ..PlotStyle::sized(320, 200)
        }
    }
    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    #[test]
    fn beam_pattern_png() {
        let layout = TShapeLayout::default();
        let sampling = AngleSampling {
            samples: 181,
            ..AngleSampling::default()
        };
        let p = layout.pattern(Cut::Azimuth, 10.0, Taper::Uniform, &sampling).unwrap();
        let png = render_beam_pattern_png(&[("az", &p)], 10.0, -60.0, &bare()).unwrap();
        assert!(!png.is_empty());
        assert_eq!(png[..8], PNG_MAGIC);
        assert!(render_beam_pattern_png(&[], 0.0, -60.0, &bare()).is_err());
    }
    #[test]
    fn layout_png() {
        let layout = TShapeLayout::default();
        let mut elements = layout.tx_elements();
        elements.extend(layout.rx_elements());
        elements.extend(layout.virtual_elements());
        assert!(!render_array_layout_png(&elements, &bare()).unwrap().is_empty());
        assert!(matches!(render_array_layout_png(&[], &bare()), Err(CalcError::Plot(_))));
    }
    #[test]
    fn snr_curve_png() {
        let pts: Vec<(f64, f64)> = (1..=20).map(|i| (i as f64 * 10.0, 60.0 - i as f64)).collect();
        assert!(!render_snr_curve_png(&pts, 15.0, &bare()).unwrap().is_empty());
        assert!(render_snr_curve_png(&pts[..1], 15.0, &bare()).is_err());
    }
    #[test]
    fn range_profile_png() {
        let profile = BeatSimulation {
            slope_hz_per_s: 30e12,
            sample_rate_hz: 10e6,
            fft_size: 256,
            target_range_m: 5.0,
            taper: Taper::Hann,
        }
        .run()
        .unwrap();
        assert!(!render_range_profile_png(&profile, &bare()).unwrap().is_empty());
    }
    #[test]
    fn tiny_canvas_is_rejected() {
        let style = PlotStyle {
            annotate: false,
            ..PlotStyle::sized(10, 10)
        };
        assert!(render_snr_curve_png(&[(1.0, 1.0), (2.0, 0.0)], 0.0, &style).is_err());
    }
}
