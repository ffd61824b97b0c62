//! In-memory progress book: per-item schedules, bookmarks and study totals.
//!
//! Stands in for the schedule store the engine emits updates to. It is
//! thread-safe so it can be shared between the session host and a recorder.

use crate::error::RecorderError;
use crate::recorder::SessionRecorder;
use crate::types::{ScheduleUpdate, SessionResults, SpacedRepetitionRecord, StudyItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Study history for one item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemProgress {
    pub item_id: String,
    pub times_studied: u32,
    pub times_correct: u32,
    pub bookmarked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<SpacedRepetitionRecord>,
}

impl ItemProgress {
    fn new(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            ..Default::default()
        }
    }

    /// Percentage of reviews answered correctly, rounded to one decimal.
    pub fn accuracy(&self) -> f64 {
        if self.times_studied == 0 {
            return 0.0;
        }
        let pct = f64::from(self.times_correct) / f64::from(self.times_studied) * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

/// Totals across all items and recorded sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyStats {
    pub total_items_studied: usize,
    pub total_sessions_completed: u32,
    pub average_score: f64,
    pub due_for_review: usize,
}

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<String, ItemProgress>,
    sessions_completed: u32,
    scored_sessions: u32,
    score_sum: f64,
}

#[derive(Debug, Default)]
pub struct ProgressStore {
    inner: Mutex<Inner>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a new schedule and count the review.
    pub fn apply(&self, update: &ScheduleUpdate) {
        let mut inner = self.lock();
        let entry = inner
            .items
            .entry(update.item_id.clone())
            .or_insert_with(|| ItemProgress::new(&update.item_id));
        entry.times_studied += 1;
        if update.recalled {
            entry.times_correct += 1;
        }
        entry.schedule = Some(update.record.clone());
    }

    pub fn set_bookmark(&self, item_id: &str, bookmarked: bool) {
        let mut inner = self.lock();
        inner
            .items
            .entry(item_id.to_string())
            .or_insert_with(|| ItemProgress::new(item_id))
            .bookmarked = bookmarked;
    }

    pub fn get(&self, item_id: &str) -> Option<ItemProgress> {
        self.lock().items.get(item_id).cloned()
    }

    /// Attach stored schedules and bookmark flags to catalog items.
    pub fn hydrate(&self, items: Vec<StudyItem>) -> Vec<StudyItem> {
        let inner = self.lock();
        items
            .into_iter()
            .map(|mut item| {
                if let Some(progress) = inner.items.get(&item.id) {
                    item.bookmarked = progress.bookmarked;
                    if progress.schedule.is_some() {
                        item.schedule = progress.schedule.clone();
                    }
                }
                item
            })
            .collect()
    }

    /// Items due on `today`, most overdue first.
    pub fn due_items(&self, today: NaiveDate, limit: usize) -> Vec<ItemProgress> {
        let inner = self.lock();
        let mut due: Vec<ItemProgress> = inner
            .items
            .values()
            .filter(|p| p.schedule.as_ref().is_some_and(|s| s.is_due(today)))
            .cloned()
            .collect();
        due.sort_by(|a, b| {
            let key = |p: &ItemProgress| p.schedule.as_ref().map(|s| s.next_review_date);
            key(a).cmp(&key(b)).then_with(|| a.item_id.cmp(&b.item_id))
        });
        due.truncate(limit);
        due
    }

    pub fn stats(&self, today: NaiveDate) -> StudyStats {
        let inner = self.lock();
        let average_score = if inner.scored_sessions == 0 {
            0.0
        } else {
            ((inner.score_sum / f64::from(inner.scored_sessions)) * 10.0).round() / 10.0
        };
        StudyStats {
            total_items_studied: inner.items.values().filter(|p| p.times_studied > 0).count(),
            total_sessions_completed: inner.sessions_completed,
            average_score,
            due_for_review: inner
                .items
                .values()
                .filter(|p| p.schedule.as_ref().is_some_and(|s| s.is_due(today)))
                .count(),
        }
    }
}

impl SessionRecorder for ProgressStore {
    fn record(&self, results: &SessionResults) -> Result<(), RecorderError> {
        let mut inner = self.lock();
        inner.sessions_completed += 1;
        if results.total_items > 0 {
            inner.scored_sessions += 1;
            inner.score_sum += results.accuracy;
        }
        Ok(())
    }
}
