//! SM-2 spaced repetition algorithm.
//!
//! Classic SuperMemo 2: quality 0-5, ease factor floor of 1.3, first two
//! successful intervals fixed at 1 and 6 days.

use super::{SpacedRepetitionScheduler, MAX_QUALITY};
use crate::types::SpacedRepetitionRecord;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lowest ease factor SM-2 allows.
pub const MINIMUM_EASE: f64 = 1.3;

/// Qualities below this reset the repetition streak.
pub const PASSING_QUALITY: u8 = 3;

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: MINIMUM_EASE,
        }
    }
}

impl SpacedRepetitionScheduler for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_record(&self, item_id: &str, today: NaiveDate) -> SpacedRepetitionRecord {
        SpacedRepetitionRecord {
            item_id: item_id.to_string(),
            ease_factor: self.initial_ease,
            interval: 1,
            repetitions: 0,
            next_review_date: today,
            last_review_date: None,
        }
    }

    fn update(
        &self,
        record: &SpacedRepetitionRecord,
        quality: u8,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> SpacedRepetitionRecord {
        let quality = quality.min(MAX_QUALITY);

        // Branch on the incoming repetitions/interval/ease, not the updated ones.
        let (interval, repetitions) = if quality < PASSING_QUALITY {
            (1, 0)
        } else {
            let interval = match record.repetitions {
                0 => 1,
                1 => 6,
                _ => ((record.interval as f64) * record.ease_factor).round().max(1.0) as u32,
            };
            (interval, record.repetitions + 1)
        };

        let ease_factor = self.next_ease(record.ease_factor, quality);

        SpacedRepetitionRecord {
            item_id: record.item_id.clone(),
            ease_factor,
            interval,
            repetitions,
            next_review_date: today
                .checked_add_days(Days::new(u64::from(interval)))
                .unwrap_or(NaiveDate::MAX),
            last_review_date: Some(now),
        }
    }
}

impl Sm2 {
    /// Ease adjustment, applied on both the success and failure paths.
    pub fn next_ease(&self, ease_factor: f64, quality: u8) -> f64 {
        let miss = f64::from(MAX_QUALITY - quality.min(MAX_QUALITY));
        let adjusted = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
        adjusted.max(self.minimum_ease.max(MINIMUM_EASE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn fresh() -> SpacedRepetitionRecord {
        Sm2::default().initial_record("kelly", today())
    }

    fn run(sm2: &Sm2, qualities: &[u8]) -> Vec<SpacedRepetitionRecord> {
        let mut record = fresh();
        let mut out = Vec::new();
        for &q in qualities {
            record = sm2.update(&record, q, now(), today());
            out.push(record.clone());
        }
        out
    }

    #[test]
    fn initial_record_defaults() {
        let record = fresh();
        assert_eq!(record.ease_factor, 2.5);
        assert_eq!(record.interval, 1);
        assert_eq!(record.repetitions, 0);
        assert_eq!(record.next_review_date, today());
        assert!(record.last_review_date.is_none());
    }

    #[test]
    fn good_recall_keeps_ease_and_grows_one_six_fifteen() {
        // Quality 4 leaves the ease factor at 2.5, so the third interval is round(6 * 2.5).
        let intervals: Vec<u32> = run(&Sm2::default(), &[4, 4, 4])
            .iter()
            .map(|r| r.interval)
            .collect();
        assert_eq!(intervals, vec![1, 6, 15]);
    }

    #[test]
    fn perfect_recall_uses_growing_ease() {
        let records = run(&Sm2::default(), &[5, 5, 5]);
        let intervals: Vec<u32> = records.iter().map(|r| r.interval).collect();
        // Ease is 2.7 after two perfect reviews: round(6 * 2.7) = 16.
        assert_eq!(intervals, vec![1, 6, 16]);
        assert!((records[2].ease_factor - 2.8).abs() < 1e-9);
        assert_eq!(records[2].repetitions, 3);
    }

    #[test]
    fn ease_adjustment_per_quality() {
        let sm2 = Sm2::default();
        let expected = [
            (5, 2.6),
            (4, 2.5),
            (3, 2.36),
            (2, 2.18),
            (1, 1.96),
            (0, 1.7),
        ];
        for (q, ease) in expected {
            assert!(
                (sm2.next_ease(2.5, q) - ease).abs() < 1e-9,
                "quality {q} should give {ease}"
            );
        }
    }

    #[test]
    fn failure_resets_repetitions_and_interval() {
        let sm2 = Sm2::default();
        let record = SpacedRepetitionRecord {
            item_id: "mayo".to_string(),
            ease_factor: 2.2,
            interval: 40,
            repetitions: 7,
            next_review_date: today(),
            last_review_date: None,
        };
        for q in 0..PASSING_QUALITY {
            let next = sm2.update(&record, q, now(), today());
            assert_eq!(next.repetitions, 0);
            assert_eq!(next.interval, 1);
            assert_eq!(next.next_review_date, today().succ_opt().unwrap());
        }
    }

    #[test]
    fn ease_factor_never_below_minimum() {
        let sm2 = Sm2::default();
        let mut record = fresh();
        for q in [0, 0, 1, 0, 2, 0, 0, 1] {
            record = sm2.update(&record, q, now(), today());
            assert!(record.ease_factor >= MINIMUM_EASE);
        }
        assert_eq!(record.ease_factor, MINIMUM_EASE);
    }

    #[test]
    fn ease_floor_holds_for_all_inputs() {
        let sm2 = Sm2::default();
        for ease in [1.3, 1.4, 1.9, 2.5, 3.1] {
            for reps in [0, 1, 2, 9] {
                for q in 0..=7 {
                    let record = SpacedRepetitionRecord {
                        ease_factor: ease,
                        repetitions: reps,
                        interval: 3,
                        ..fresh()
                    };
                    let next = sm2.update(&record, q, now(), today());
                    assert!(next.ease_factor >= MINIMUM_EASE);
                    assert!(next.interval >= 1);
                }
            }
        }
    }

    #[test]
    fn quality_above_five_is_clamped() {
        let sm2 = Sm2::default();
        let a = sm2.update(&fresh(), 5, now(), today());
        let b = sm2.update(&fresh(), 9, now(), today());
        assert_eq!(a.ease_factor, b.ease_factor);
        assert_eq!(a.interval, b.interval);
    }

    #[test]
    fn next_review_date_is_today_plus_interval() {
        let sm2 = Sm2::default();
        let record = SpacedRepetitionRecord {
            repetitions: 1,
            ..fresh()
        };
        let reviewed_at = now();
        let next = sm2.update(&record, 4, reviewed_at, today());
        assert_eq!(next.interval, 6);
        assert_eq!(
            next.next_review_date,
            NaiveDate::from_ymd_opt(2024, 5, 7).unwrap()
        );
        assert_eq!(next.last_review_date, Some(reviewed_at));
    }

    #[test]
    fn configured_minimum_cannot_go_below_floor() {
        let sm2 = Sm2 {
            minimum_ease: 1.0,
            ..Sm2::default()
        };
        assert_eq!(sm2.next_ease(1.3, 0), MINIMUM_EASE);
    }
}
