//! Configuration file support for Siqi.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/siqi/config.toml`. Every
//! numeric knob the engine uses lives here rather than in hidden constants,
//! so the cut points and curves are independently testable and tunable.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub energetics: EnergeticsConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub kinetics: KineticsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Per-herb contribution parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnergeticsConfig {
    /// Reference dosage in grams for herbs without a catalog default.
    #[serde(default = "default_fallback_reference_dosage")]
    pub fallback_reference_dosage: f64,

    /// Exponent of the dosage-ratio damping curve. 0.5 (square root) means
    /// a 4x dose roughly doubles influence instead of quadrupling it.
    #[serde(default = "default_damping_exponent")]
    pub damping_exponent: f64,

    /// How many herbs to surface as top contributors.
    #[serde(default = "default_top_contributors")]
    pub top_contributors: usize,
}

impl Default for EnergeticsConfig {
    fn default() -> Self {
        Self {
            fallback_reference_dosage: default_fallback_reference_dosage(),
            damping_exponent: default_damping_exponent(),
            top_contributors: default_top_contributors(),
        }
    }
}

/// Classifier cut points.
///
/// A total index `i` labels as: strongly warming when `i >= strong`,
/// mildly warming when `mild <= i < strong`, balanced when
/// `-mild < i < mild`, and symmetrically on the cooling side. Boundary
/// values always belong to the band farther from zero.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_mild_threshold")]
    pub mild_threshold: f64,

    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mild_threshold: default_mild_threshold(),
            strong_threshold: default_strong_threshold(),
        }
    }
}

/// Three-pool kinetics parameters.
///
/// Rates are per minute; the fixed-step update multiplies them by
/// `step_minutes`. Calibrated so upper and lower rise then fall within the
/// 0..=120 minute window while middle decays monotonically.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KineticsConfig {
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,

    #[serde(default = "default_samples")]
    pub samples: usize,

    /// Visualization ceiling for the initial middle pool.
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Grams of total reference dosage at which the seed reaches half scale.
    #[serde(default = "default_dosage_saturation")]
    pub dosage_saturation: f64,

    /// Gain on the ascending (positive y) transfer, per minute.
    #[serde(default = "default_ascent_gain")]
    pub ascent_gain: f64,

    /// Gain on the descending (negative y) transfer, per minute.
    #[serde(default = "default_descent_gain")]
    pub descent_gain: f64,

    /// How strongly the total index accelerates the transfers.
    #[serde(default = "default_index_gain")]
    pub index_gain: f64,

    /// Index magnitude treated as "full strength" for normalization.
    #[serde(default = "default_index_norm")]
    pub index_norm: f64,

    #[serde(default = "default_upper_decay")]
    pub upper_decay: f64,

    #[serde(default = "default_lower_decay")]
    pub lower_decay: f64,

    #[serde(default = "default_middle_decay")]
    pub middle_decay: f64,
}

impl Default for KineticsConfig {
    fn default() -> Self {
        Self {
            step_minutes: default_step_minutes(),
            samples: default_samples(),
            scale: default_scale(),
            dosage_saturation: default_dosage_saturation(),
            ascent_gain: default_ascent_gain(),
            descent_gain: default_descent_gain(),
            index_gain: default_index_gain(),
            index_norm: default_index_norm(),
            upper_decay: default_upper_decay(),
            lower_decay: default_lower_decay(),
            middle_decay: default_middle_decay(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("siqi")
}

fn default_fallback_reference_dosage() -> f64 {
    9.0
}

fn default_damping_exponent() -> f64 {
    0.5
}

fn default_top_contributors() -> usize {
    5
}

fn default_mild_threshold() -> f64 {
    2.0
}

fn default_strong_threshold() -> f64 {
    8.0
}

fn default_step_minutes() -> u32 {
    5
}

fn default_samples() -> usize {
    25
}

fn default_scale() -> f64 {
    100.0
}

fn default_dosage_saturation() -> f64 {
    60.0
}

fn default_ascent_gain() -> f64 {
    0.035
}

fn default_descent_gain() -> f64 {
    0.035
}

fn default_index_gain() -> f64 {
    0.25
}

fn default_index_norm() -> f64 {
    10.0
}

fn default_upper_decay() -> f64 {
    0.03
}

fn default_lower_decay() -> f64 {
    0.03
}

fn default_middle_decay() -> f64 {
    0.01
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("siqi").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.energetics.fallback_reference_dosage <= 0.0 {
            return Err(Error::Config(
                "energetics.fallback_reference_dosage must be positive".into(),
            ));
        }
        if self.energetics.damping_exponent <= 0.0 || self.energetics.damping_exponent > 1.0 {
            return Err(Error::Config(
                "energetics.damping_exponent must be in (0, 1]".into(),
            ));
        }
        if self.classifier.mild_threshold <= 0.0
            || self.classifier.strong_threshold <= self.classifier.mild_threshold
        {
            return Err(Error::Config(
                "classifier thresholds must satisfy 0 < mild < strong".into(),
            ));
        }
        if self.kinetics.step_minutes == 0 || self.kinetics.samples < 2 {
            return Err(Error::Config(
                "kinetics needs a positive step and at least 2 samples".into(),
            ));
        }
        Ok(())
    }
}
