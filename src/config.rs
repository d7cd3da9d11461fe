use crate::error::{BenchError, Result};
use crate::metrics::MonitorConfig;
use crate::workload::SimulationParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Sampling settings as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub period_ms: u64,
    pub settle_ms: u64,
    pub warmup: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        let defaults = MonitorConfig::default();
        Self {
            period_ms: defaults.sampling_period.as_millis() as u64,
            settle_ms: defaults.settle_delay.as_millis() as u64,
            warmup: defaults.warmup,
        }
    }
}

impl From<MonitorSettings> for MonitorConfig {
    fn from(settings: MonitorSettings) -> Self {
        MonitorConfig {
            sampling_period: Duration::from_millis(settings.period_ms),
            settle_delay: Duration::from_millis(settings.settle_ms),
            warmup: settings.warmup,
        }
    }
}

/// Everything a benchmark run needs. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub processes: usize,
    pub plot: bool,
    pub monitor: MonitorSettings,
    pub simulation: SimulationParams,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            processes: 1,
            plot: false,
            monitor: MonitorSettings::default(),
            simulation: SimulationParams::default(),
        }
    }
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| BenchError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        self.monitor.into()
    }
}
