//! Spaced repetition scheduling.

pub mod sm2;

use crate::types::SpacedRepetitionRecord;
use chrono::{DateTime, NaiveDate, Utc};

/// Highest quality rating accepted by schedulers. Larger inputs are clamped.
pub const MAX_QUALITY: u8 = 5;

/// Trait for spaced repetition schedulers.
///
/// Implementations are pure: they read the record passed in and return a new one.
pub trait SpacedRepetitionScheduler: Send + Sync {
    /// Scheduler identifier.
    fn name(&self) -> &'static str;

    /// Schedule for an item that has never been reviewed.
    fn initial_record(&self, item_id: &str, today: NaiveDate) -> SpacedRepetitionRecord;

    /// Compute the next schedule after a review graded `quality` (0-5).
    fn update(
        &self,
        record: &SpacedRepetitionRecord,
        quality: u8,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> SpacedRepetitionRecord;
}

/// Get scheduler by name with default parameters.
pub fn get_scheduler(name: &str) -> Option<Box<dyn SpacedRepetitionScheduler>> {
    match name {
        "sm2" => Some(Box::new(sm2::Sm2::default())),
        _ => None,
    }
}
