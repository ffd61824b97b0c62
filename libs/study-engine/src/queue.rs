//! Review queue construction: filter, order, sample.

use crate::error::{EngineError, Result};
use crate::types::{SessionConfig, SourceMode, StudyItem};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

/// Whether `item` belongs to the pool for `mode`.
pub fn matches_source(mode: SourceMode, item: &StudyItem, today: NaiveDate) -> bool {
    match mode {
        SourceMode::All | SourceMode::Custom => true,
        // Never-reviewed items have no due date and are not due.
        SourceMode::DueReview => item.schedule.as_ref().is_some_and(|s| s.is_due(today)),
        SourceMode::Bookmarked => item.bookmarked,
    }
}

/// Build the ordered review queue for `config` from `pool`.
///
/// Fails with a configuration error when the pool is empty, when `custom`
/// has no filter, or when nothing survives filtering.
pub fn build_queue<R: Rng + ?Sized>(
    config: &SessionConfig,
    pool: Vec<StudyItem>,
    today: NaiveDate,
    rng: &mut R,
) -> Result<Vec<StudyItem>> {
    if pool.is_empty() {
        return Err(EngineError::config("item pool is empty"));
    }
    if config.item_count == 0 {
        return Err(EngineError::config("item count must be at least 1"));
    }
    if config.source_mode == SourceMode::Custom && config.item_filter.is_none() {
        return Err(EngineError::config("custom source mode requires an item filter"));
    }

    let mut items: Vec<StudyItem> = pool
        .into_iter()
        .filter(|item| matches_source(config.source_mode, item, today))
        .filter(|item| config.item_filter.as_ref().map_or(true, |f| f.matches(item)))
        .collect();

    if items.is_empty() {
        return Err(EngineError::config(format!(
            "no items match source mode {:?}",
            config.source_mode
        )));
    }

    if config.shuffled {
        items.shuffle(rng);
    } else if config.source_mode == SourceMode::DueReview {
        // Most overdue first.
        items.sort_by_key(|item| item.schedule.as_ref().map(|s| s.next_review_date));
    }

    items.truncate(config.item_count);
    Ok(items)
}
