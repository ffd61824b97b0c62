//! Response classification: binary gesture plus latency to an SM-2 quality.

use crate::types::ResponseDirection;
use serde::{Deserialize, Serialize};

/// Recalled faster than this is a perfect recall (quality 5).
pub const PERFECT_RECALL_MS: u64 = 2000;
/// Recalled faster than this (and not perfect) is a good recall (quality 4).
pub const GOOD_RECALL_MS: u64 = 4000;
/// Giving up faster than this is a near miss (quality 1) rather than a blackout (0).
pub const QUICK_GIVE_UP_MS: u64 = 3000;

/// Latency boundaries, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub perfect_recall_ms: u64,
    pub good_recall_ms: u64,
    pub quick_give_up_ms: u64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            perfect_recall_ms: PERFECT_RECALL_MS,
            good_recall_ms: GOOD_RECALL_MS,
            quick_give_up_ms: QUICK_GIVE_UP_MS,
        }
    }
}

/// Maps a swipe and its latency to a 0-5 quality rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseClassifier {
    thresholds: ClassifierThresholds,
}

impl ResponseClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    pub fn classify(&self, direction: ResponseDirection, response_time_ms: u64) -> u8 {
        let t = &self.thresholds;
        match direction {
            ResponseDirection::NotRecalled if response_time_ms < t.quick_give_up_ms => 1,
            ResponseDirection::NotRecalled => 0,
            ResponseDirection::Recalled if response_time_ms < t.perfect_recall_ms => 5,
            ResponseDirection::Recalled if response_time_ms < t.good_recall_ms => 4,
            ResponseDirection::Recalled => 3,
        }
    }
}
