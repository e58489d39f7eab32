use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Env var naming a dataset file to load instead of the bundled table.
pub const DATA_ENV: &str = "PENGUIN_DASH_DATA";
/// Env var naming a JSON config file.
pub const CONFIG_ENV: &str = "PENGUIN_DASH_CONFIG";

// ---------------------------------------------------------------------------
// Dataset source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DatasetSource {
    /// The CSV compiled into the binary.
    #[default]
    Bundled,
    File(PathBuf),
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Bundled => write!(f, "bundled penguins.csv"),
            DatasetSource::File(p) => write!(f, "{}", p.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Startup configuration.  Every field has a default, so a config file only
/// needs the keys it changes:
///
/// ```json
/// { "dataset": "data/penguins.parquet", "mass_min": 2500 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// Dataset file; `None` loads the bundled table.
    pub dataset: Option<PathBuf>,
    /// Slider domain for the body-mass ceiling (grams).
    pub mass_min: f64,
    pub mass_max: f64,
    /// Initial ceiling, clamped into the slider domain.
    pub default_mass_ceiling: f64,
    pub window_size: [f32; 2],
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            mass_min: 2000.0,
            mass_max: 6000.0,
            default_mass_ceiling: 6000.0,
            window_size: [1200.0, 800.0],
        }
    }
}

impl DashConfig {
    /// Resolve from the process environment: CLI argument, then
    /// `PENGUIN_DASH_DATA`, then the config file named by `PENGUIN_DASH_CONFIG`.
    pub fn from_env() -> Result<Self> {
        Self::resolve(
            std::env::args().nth(1),
            std::env::var(DATA_ENV).ok(),
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        )
    }

    /// Dataset precedence: `cli_data`, `env_data`, config file, bundled.
    pub fn resolve(
        cli_data: Option<String>,
        env_data: Option<String>,
        config_file: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        if let Some(path) = cli_data.or(env_data).filter(|p| !p.trim().is_empty()) {
            config.dataset = Some(PathBuf::from(path));
        }
        config.normalize();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Swap an inverted slider domain and clamp the default into it.
    fn normalize(&mut self) {
        if self.mass_min > self.mass_max {
            std::mem::swap(&mut self.mass_min, &mut self.mass_max);
        }
        self.default_mass_ceiling = self.default_mass_ceiling.clamp(self.mass_min, self.mass_max);
    }

    pub fn source(&self) -> DatasetSource {
        match &self.dataset {
            Some(p) => DatasetSource::File(p.clone()),
            None => DatasetSource::Bundled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_slider() {
        let c = DashConfig::resolve(None, None, None).unwrap();
        assert_eq!(c.mass_min, 2000.0);
        assert_eq!(c.mass_max, 6000.0);
        assert_eq!(c.default_mass_ceiling, 6000.0);
        assert_eq!(c.source(), DatasetSource::Bundled);
    }

    #[test]
    fn cli_beats_env() {
        let c = DashConfig::resolve(Some("a.csv".into()), Some("b.csv".into()), None).unwrap();
        assert_eq!(c.source(), DatasetSource::File(PathBuf::from("a.csv")));
        let c = DashConfig::resolve(None, Some("b.csv".into()), None).unwrap();
        assert_eq!(c.source(), DatasetSource::File(PathBuf::from("b.csv")));
        let c = DashConfig::resolve(None, Some("  ".into()), None).unwrap();
        assert_eq!(c.source(), DatasetSource::Bundled);
    }

    #[test]
    fn config_file_partial_keys() {
        let path = std::env::temp_dir().join(format!("penguin-dash-{}-cfg.json", std::process::id()));
        std::fs::write(&path, r#"{ "dataset": "x.parquet", "mass_min": 2500, "default_mass_ceiling": 9000 }"#)
            .unwrap();
        let c = DashConfig::resolve(None, None, Some(path.clone())).unwrap();
        let env = DashConfig::resolve(None, Some("y.csv".into()), Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(c.source(), DatasetSource::File(PathBuf::from("x.parquet")));
        assert_eq!(c.mass_min, 2500.0);
        assert_eq!(c.mass_max, 6000.0);
        assert_eq!(c.default_mass_ceiling, 6000.0);
        assert_eq!(env.source(), DatasetSource::File(PathBuf::from("y.csv")));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = DashConfig::resolve(None, None, Some(PathBuf::from("/nonexistent/penguin.json")))
            .unwrap_err();
        assert!(format!("{err:#}").contains("reading config"));
    }

    #[test]
    fn inverted_domain_is_swapped() {
        let mut c = DashConfig {
            mass_min: 6000.0,
            mass_max: 2000.0,
            default_mass_ceiling: 1000.0,
            ..DashConfig::default()
        };
        c.normalize();
        assert_eq!((c.mass_min, c.mass_max), (2000.0, 6000.0));
        assert_eq!(c.default_mass_ceiling, 2000.0);
    }
}
