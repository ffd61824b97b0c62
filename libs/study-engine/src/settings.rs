//! Engine settings.

use crate::algorithm::sm2::{Sm2, MINIMUM_EASE};
use crate::algorithm::SpacedRepetitionScheduler;
use crate::classifier::ClassifierThresholds;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Tunable policy for the engine. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub algorithm: String,
    pub sm2: Sm2,
    pub classifier: ClassifierThresholds,
    pub daily_reset_hour: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            algorithm: "sm2".to_string(),
            sm2: Sm2::default(),
            classifier: ClassifierThresholds::default(),
            daily_reset_hour: 0,
        }
    }
}

impl EngineSettings {
    /// Parse and validate settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| EngineError::config(format!("invalid settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.daily_reset_hour > 23 {
            return Err(EngineError::config(format!(
                "daily_reset_hour must be 0-23, got {}",
                self.daily_reset_hour
            )));
        }
        let t = &self.classifier;
        if t.perfect_recall_ms >= t.good_recall_ms {
            return Err(EngineError::config(
                "perfect_recall_ms must be below good_recall_ms",
            ));
        }
        if self.sm2.minimum_ease < MINIMUM_EASE || self.sm2.initial_ease < self.sm2.minimum_ease {
            return Err(EngineError::config(format!(
                "ease factors must be at least {MINIMUM_EASE}"
            )));
        }
        self.scheduler().map(|_| ())
    }

    /// Scheduler selected by `algorithm`, built from these parameters.
    pub fn scheduler(&self) -> Result<Box<dyn SpacedRepetitionScheduler>> {
        match self.algorithm.as_str() {
            "sm2" => Ok(Box::new(self.sm2.clone())),
            other => Err(EngineError::config(format!("unknown algorithm: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let settings = EngineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.classifier.perfect_recall_ms, 2000);
        assert_eq!(settings.classifier.good_recall_ms, 4000);
        assert_eq!(settings.classifier.quick_give_up_ms, 3000);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let json = r#"{"daily_reset_hour":4,"classifier":{"perfect_recall_ms":1500}}"#;
        let settings = EngineSettings::from_json(json).unwrap();
        assert_eq!(settings.daily_reset_hour, 4);
        assert_eq!(settings.classifier.perfect_recall_ms, 1500);
        assert_eq!(settings.classifier.good_recall_ms, 4000);
        assert_eq!(settings.sm2, Sm2::default());
    }

    #[test]
    fn rejects_bad_reset_hour() {
        let err = EngineSettings::from_json(r#"{"daily_reset_hour":24}"#).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err = EngineSettings::from_json(
            r#"{"classifier":{"perfect_recall_ms":5000,"good_recall_ms":4000}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn rejects_low_ease() {
        let err = EngineSettings::from_json(r#"{"sm2":{"minimum_ease":1.1}}"#).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn rejects_unknown_algorithm() {
        let err = EngineSettings::from_json(r#"{"algorithm":"fsrs"}"#).unwrap_err();
        assert_eq!(err, EngineError::Configuration("unknown algorithm: fsrs".to_string()));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(EngineSettings::from_json("{not json").is_err());
    }
}
