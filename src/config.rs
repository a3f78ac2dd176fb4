// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use crate::calc::{AngleSampling, ESeries, TShapeLayout};

pub const CONFIG_ENV: &str = "ENGCALC_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "engcalc.json";

/// Starting values for the array visualizer form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayDefaults {
    pub layout: TShapeLayout,
    pub sampling: AngleSampling,
    /// Lobes within this many dB of the main peak count as grating lobes.
    pub grating_threshold_db: f64,
}
impl Default for ArrayDefaults {
    fn default() -> Self {
        Self {
            layout: TShapeLayout::default(),
            sampling: AngleSampling::default(),
            grating_threshold_db: 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window_title: String,
    pub default_series: ESeries,
    pub default_resistor_list: String,
    /// Empty leaves the array tab unlocked.
    pub locked_tab_password: String,
    pub export_dir: PathBuf,
    pub array: ArrayDefaults,
    pub plot_width: u32,
    pub plot_height: u32,
}
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: format!("Engineering Calculators v{}", env!("CARGO_PKG_VERSION")),
            default_series: ESeries::E24,
            default_resistor_list: "100, 220, 330, 470, 1000, 2200, 4700, 10000".to_owned(),
            locked_tab_password: "array".to_owned(),
            export_dir: PathBuf::from("exports"),
            array: ArrayDefaults::default(),
            plot_width: 900,
            plot_height: 400,
        }
    }
}
impl AppConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serializing config")?;
        fs::write(path, text).with_context(|| format!("writing config {}", path.display()))
    }
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Reads the config file, falling back to defaults when it is missing or broken.
pub fn resolve(path: &Path) -> AppConfig {
    if !path.exists() {
        info!("no config at {}, using defaults", path.display());
        let cfg = AppConfig::default();
        // Leave an editable template behind.
        if let Err(err) = cfg.save_to(path) {
            warn!("{err:#}");
        }
        return cfg;
    }
    match AppConfig::load_from(path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(err) => {
            warn!("{err:#}; using defaults");
            AppConfig::default()
        }
    }
}

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Process-wide config, loaded on first use.
pub fn get() -> &'static AppConfig {
    CONFIG.get_or_init(|| resolve(&config_path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engcalc.json");
        fs::write(&path, r#"{ "default_series": "E96", "array": { "grating_threshold_db": 6.0 } }"#).unwrap();
        let cfg = resolve(&path);
        assert_eq!(cfg.default_series, ESeries::E96);
        assert_eq!(cfg.array.grating_threshold_db, 6.0);
        assert_eq!(cfg.array.layout, TShapeLayout::default());
        assert_eq!(cfg.plot_width, 900);
    }
    #[test]
    fn broken_or_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
        assert_eq!(resolve(&path), AppConfig::default());
        let absent = dir.path().join("absent.json");
        assert_eq!(resolve(&absent), AppConfig::default());
        assert_eq!(AppConfig::load_from(&absent).unwrap(), AppConfig::default());
    }
    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let cfg = AppConfig {
            locked_tab_password: String::new(),
            ..AppConfig::default()
        };
        cfg.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), cfg);
    }
}
