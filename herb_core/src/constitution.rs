//! Optional constitution-based adjustment.
//!
//! The engine's main path is herbs-only. A user constitution profile,
//! supplied as an external JSON file by whatever system tracks the user,
//! can be applied afterwards as a clearly separated post-processing step:
//! it biases the perceived total index and re-runs the classifier, leaving
//! the base analysis untouched.

use crate::classifier;
use crate::config::ClassifierConfig;
use crate::types::{PrescriptionAnalysis, ThermalLabel};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Constitution types recognized by the adjustment table.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Constitution {
    Balanced,
    YangDeficient,
    YinDeficient,
    QiDeficient,
    PhlegmDamp,
    DampHeat,
    BloodStasis,
}

impl Constitution {
    /// Signed index bias: how much warmer (+) or cooler (-) a prescription
    /// reads for this constitution. A yang-deficient (cold-running) user
    /// perceives the same formula as milder, so the bias is negative.
    fn index_bias(self) -> f64 {
        match self {
            Constitution::Balanced => 0.0,
            Constitution::YangDeficient => -2.0,
            Constitution::YinDeficient => 2.0,
            Constitution::QiDeficient => -1.0,
            Constitution::PhlegmDamp => -0.5,
            Constitution::DampHeat => 1.5,
            Constitution::BloodStasis => 0.0,
        }
    }
}

/// External constitution profile file format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConstitutionProfile {
    pub constitution: Constitution,
    /// Scales the bias; 1.0 is a typical presentation.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
}

fn default_sensitivity() -> f64 {
    1.0
}

/// Result of applying a profile to a finished analysis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdjustedReading {
    pub constitution: Constitution,
    pub adjusted_index: f64,
    pub adjusted_label: ThermalLabel,
}

/// Apply a constitution profile to a finished analysis.
///
/// Post-processing only: the analysis itself is not modified.
pub fn apply(
    analysis: &PrescriptionAnalysis,
    profile: &ConstitutionProfile,
    classifier_cfg: &ClassifierConfig,
) -> AdjustedReading {
    let adjusted_index =
        analysis.total_index + profile.sensitivity * profile.constitution.index_bias();

    AdjustedReading {
        constitution: profile.constitution,
        adjusted_index,
        adjusted_label: classifier::classify(adjusted_index, classifier_cfg),
    }
}

/// Load a constitution profile from a JSON file
///
/// Returns None if the file doesn't exist (no profile configured).
/// A malformed file logs a warning and is ignored rather than failing
/// the analysis.
pub fn load_profile(path: &Path) -> Result<Option<ConstitutionProfile>> {
    if !path.exists() {
        tracing::debug!("No constitution profile found at {:?}", path);
        return Ok(None);
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(
                "Failed to read constitution profile at {:?}: {}. Ignoring profile.",
                path,
                e
            );
            return Ok(None);
        }
    };

    match serde_json::from_str::<ConstitutionProfile>(&contents) {
        Ok(profile) => {
            tracing::info!("Loaded constitution profile: {:?}", profile.constitution);
            Ok(Some(profile))
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse constitution profile at {:?}: {}. Ignoring profile.",
                path,
                e
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::config::Config;
    use crate::engine;
    use crate::types::RawHerbInput;

    fn analysis_for(name: &str, dosage: f64) -> PrescriptionAnalysis {
        let catalog = build_default_catalog();
        let config = Config::default();
        engine::analyze(
            &catalog,
            &[RawHerbInput {
                name: name.into(),
                dosage_grams: dosage,
                processing: None,
            }],
            &config,
        )
    }

    #[test]
    fn test_yin_deficient_reads_warmer() {
        let analysis = analysis_for("gui zhi", 9.0); // mildly warming on its own
        let profile = ConstitutionProfile {
            constitution: Constitution::YinDeficient,
            sensitivity: 1.0,
        };
        let adjusted = apply(&analysis, &profile, &ClassifierConfig::default());

        assert!(adjusted.adjusted_index > analysis.total_index);
        assert_eq!(analysis.label, ThermalLabel::MildlyWarming);
    }

    #[test]
    fn test_balanced_constitution_changes_nothing() {
        let analysis = analysis_for("fu ling", 12.0);
        let profile = ConstitutionProfile {
            constitution: Constitution::Balanced,
            sensitivity: 1.0,
        };
        let adjusted = apply(&analysis, &profile, &ClassifierConfig::default());

        assert_eq!(adjusted.adjusted_index, analysis.total_index);
        assert_eq!(adjusted.adjusted_label, analysis.label);
    }

    #[test]
    fn test_sensitivity_scales_bias() {
        let analysis = analysis_for("fu ling", 12.0);
        let profile = ConstitutionProfile {
            constitution: Constitution::YangDeficient,
            sensitivity: 2.0,
        };
        let adjusted = apply(&analysis, &profile, &ClassifierConfig::default());
        assert_eq!(adjusted.adjusted_index, -4.0);
        assert_eq!(adjusted.adjusted_label, ThermalLabel::MildlyCooling);
    }

    #[test]
    fn test_load_profile() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");
        std::fs::write(
            &path,
            r#"{ "constitution": "yang_deficient", "sensitivity": 1.5 }"#,
        )
        .unwrap();

        let profile = load_profile(&path).unwrap().unwrap();
        assert_eq!(profile.constitution, Constitution::YangDeficient);
        assert_eq!(profile.sensitivity, 1.5);
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile = load_profile(&temp_dir.path().join("none.json")).unwrap();
        assert!(profile.is_none());
    }

    #[test]
    fn test_malformed_profile_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let profile = load_profile(&path).unwrap();
        assert!(profile.is_none());
    }

    #[test]
    fn test_default_sensitivity_applied() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profile.json");
        std::fs::write(&path, r#"{ "constitution": "damp_heat" }"#).unwrap();

        let profile = load_profile(&path).unwrap().unwrap();
        assert_eq!(profile.sensitivity, 1.0);
    }
}
