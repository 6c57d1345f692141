//! Serializable forecast configuration.
//!
//! Every value that used to be a module-level constant lives here with a
//! documented default. The defaults reproduce the classic Gold vs Bitcoin
//! chart: daily data from 2016-01-01 up to the run date, a degree-2 trend, and a
//! five-year (1825-day) horizon.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use trendcast_core::forecast::DEFAULT_DEGREE;

/// Five years of calendar days.
pub const DEFAULT_HORIZON_DAYS: u32 = 1825;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("start date {start} must be before end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("polynomial degree must be at least 1")]
    InvalidDegree,

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("both assets use symbol '{0}'")]
    DuplicateSymbol(String),
}

/// One instrument to fetch and forecast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetConfig {
    /// Display name used in the legend ("Gold").
    pub label: String,
    /// Provider symbol ("GC=F").
    pub symbol: String,
}

impl AssetConfig {
    pub fn new(label: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            symbol: symbol.into(),
        }
    }
}

/// Where and how the chart is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the chart is written to.
    pub dir: PathBuf,
    /// File name stem; the final name is `<stem>_<YYYY-MM-DD>.png` or `<stem>.png`.
    pub stem: String,
    /// Stamp the file name with the run date and remove older stamped files.
    pub date_stamped: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            stem: "btc_gold_forecast".into(),
            date_stamped: true,
        }
    }
}

/// Complete configuration for one forecast run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastConfig {
    /// First day of history (inclusive).
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Last day of history (inclusive). `None` means the day before the run
    /// date, so an unfinished trading day is never plotted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Number of calendar days to extrapolate.
    #[serde(default = "default_horizon")]
    pub horizon_days: u32,

    /// Polynomial degree of the trend.
    #[serde(default = "default_degree")]
    pub degree: usize,

    #[serde(default = "default_first")]
    pub first: AssetConfig,

    #[serde(default = "default_second")]
    pub second: AssetConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or_default()
}

fn default_horizon() -> u32 {
    DEFAULT_HORIZON_DAYS
}

fn default_degree() -> usize {
    DEFAULT_DEGREE
}

fn default_first() -> AssetConfig {
    AssetConfig::new("Gold", "GC=F")
}

fn default_second() -> AssetConfig {
    AssetConfig::new("Bitcoin", "BTC-USD")
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: None,
            horizon_days: default_horizon(),
            degree: default_degree(),
            first: default_first(),
            second: default_second(),
            output: OutputConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// End of the history window. Open-ended configs stop the day before `today`.
    pub fn resolved_end(&self, today: NaiveDate) -> NaiveDate {
        self.end_date
            .unwrap_or_else(|| today.pred_opt().unwrap_or(today))
    }

    /// Check internal consistency for a run on `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ConfigError> {
        let end = self.resolved_end(today);
        if self.start_date >= end {
            return Err(ConfigError::InvalidRange {
                start: self.start_date,
                end,
            });
        }
        if self.degree == 0 {
            return Err(ConfigError::InvalidDegree);
        }
        for (field, value) in [
            ("first.label", &self.first.label),
            ("first.symbol", &self.first.symbol),
            ("second.label", &self.second.label),
            ("second.symbol", &self.second.symbol),
            ("output.stem", &self.output.stem),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty { field });
            }
        }
        if self.first.symbol == self.second.symbol {
            return Err(ConfigError::DuplicateSymbol(self.first.symbol.clone()));
        }
        Ok(())
    }
}
