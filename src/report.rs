// src/report.rs
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use anyhow::{bail, Context, Result};
use log::info;
use crate::calc::{BeamPattern, BudgetReport};

const MAX_SAME_SECOND: usize = 1000;

/// Writes CSV and PNG exports into one directory.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    // <kind>_<label>_<unix secs>[_<n>].<ext>; never replaces an existing file.
    fn create(&self, kind: &str, label: &str, ext: &str) -> Result<(PathBuf, File)> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating export dir {}", self.dir.display()))?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let stem = format!("{}_{}_{}", kind, sanitize(label), timestamp);
        for n in 0..MAX_SAME_SECOND {
            let name = if n == 0 {
                format!("{stem}.{ext}")
            } else {
                format!("{stem}_{n}.{ext}")
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err).with_context(|| format!("creating {}", path.display())),
            }
        }
        bail!("too many {stem}.{ext} exports in one second")
    }

    fn write_csv(
        &self,
        kind: &str,
        label: &str,
        body: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
    ) -> Result<PathBuf> {
        let (path, file) = self.create(kind, label, "csv")?;
        let mut w = BufWriter::new(file);
        body(&mut w).and_then(|_| w.flush())
            .with_context(|| format!("writing {}", path.display()))?;
        info!("exported {}", path.display());
        Ok(path)
    }

    pub fn export_beam_pattern(&self, label: &str, pattern: &BeamPattern) -> Result<PathBuf> {
        self.write_csv("beam_pattern", label, |w| {
            writeln!(w, "angle_deg,af_linear,af_db")?;
            for ((a, l), d) in pattern.angles_deg.iter().zip(&pattern.linear).zip(&pattern.db) {
                writeln!(w, "{:.3},{:.6e},{:.3}", a, l, d)?;
            }
            Ok(())
        })
    }

    pub fn export_budget(&self, label: &str, report: &BudgetReport) -> Result<PathBuf> {
        self.write_csv("budget", label, |w| {
            writeln!(w, "item,value_db,running_dbm")?;
            for line in &report.lines {
                writeln!(w, "\"{}\",{:.3},{:.3}", line.label, line.value_db, line.running_dbm)?;
            }
            writeln!(w, "\"Received power\",,{:.3}", report.received_power_dbm)?;
            writeln!(w, "\"Noise floor\",,{:.3}", report.noise_floor_dbm)?;
            writeln!(w, "\"Processing gain\",{:.3},", report.processing_gain_db)?;
            writeln!(w, "\"SNR\",{:.3},", report.snr_db)?;
            writeln!(w, "\"Margin\",{:.3},", report.margin_db)?;
            match report.max_range_m {
                Some(r) => writeln!(w, "\"Max range (m)\",{:.3},", r),
                None => writeln!(w, "\"Max range (m)\",,"),
            }
        })
    }

    pub fn export_snr_sweep(&self, label: &str, points: &[(f64, f64)], required_snr_db: f64) -> Result<PathBuf> {
        self.write_csv("snr_sweep", label, |w| {
            writeln!(w, "range_m,snr_db,margin_db")?;
            for (r, s) in points {
                writeln!(w, "{:.6},{:.3},{:.3}", r, s, s - required_snr_db)?;
            }
            Ok(())
        })
    }

    pub fn write_png(&self, kind: &str, label: &str, png: &[u8]) -> Result<PathBuf> {
        let (path, mut file) = self.create(kind, label, "png")?;
        file.write_all(png).with_context(|| format!("writing {}", path.display()))?;
        info!("exported {}", path.display());
        Ok(path)
    }
}

fn sanitize(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "untitled".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::{AngleSampling, Cut, MonostaticBudget, TShapeLayout, Taper};
    #[test]
    fn beam_pattern_csv() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("nested"));
        let sampling = AngleSampling {
            samples: 5,
            ..AngleSampling::default()
        };
        let pattern = TShapeLayout::default()
            .pattern(Cut::Azimuth, 0.0, Taper::Uniform, &sampling)
            .unwrap();
        let path = writer.export_beam_pattern("az 8x4", &pattern).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("beam_pattern_az_8x4_") && name.ends_with(".csv"), "{name}");
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "angle_deg,af_linear,af_db");
        assert_eq!(lines.len(), 6);
        assert!(lines[3].starts_with("0.000,"));
    }
    #[test]
    fn budget_and_sweep_csv() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let budget = MonostaticBudget::default();
        let report = budget.evaluate().unwrap();
        let text = fs::read_to_string(writer.export_budget("", &report).unwrap()).unwrap();
        assert!(text.starts_with("item,value_db,running_dbm\n\"Tx power\",12.000,12.000"));
        assert!(text.contains("\"Margin\""));
        let pts = budget.snr_vs_range(&[10.0, 20.0, 40.0]).unwrap();
        let sweep = writer.export_snr_sweep("default", &pts, 15.0).unwrap();
        assert_eq!(fs::read_to_string(sweep).unwrap().lines().count(), 4);
    }
    #[test]
    fn png_bytes_are_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let path = writer.write_png("layout", "t", &[1, 2, 3]).unwrap();
        assert_eq!(fs::read(path).unwrap(), vec![1, 2, 3]);
        assert_eq!(sanitize(" a/b "), "a_b");
    }
    #[test]
    fn same_second_exports_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let first = writer.write_png("range_profile", "10m", &[1]).unwrap();
        let second = writer.write_png("range_profile", "10m", &[2]).unwrap();
        let third = writer.write_png("range_profile", "10m", &[3]).unwrap();
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(fs::read(&first).unwrap(), vec![1]);
        assert_eq!(fs::read(&second).unwrap(), vec![2]);
        assert_eq!(fs::read(&third).unwrap(), vec![3]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }
}
