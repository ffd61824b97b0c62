//! Core types for the study-session engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a study session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Loading,
    Active,
    Paused,
    Completed,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the session draws its items from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    All,
    DueReview,
    Bookmarked,
    Custom,
}

impl Default for SourceMode {
    fn default() -> Self {
        Self::All
    }
}

/// The binary swipe gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseDirection {
    Recalled,
    NotRecalled,
}

impl ResponseDirection {
    pub fn is_recalled(self) -> bool {
        matches!(self, Self::Recalled)
    }
}

/// Per-item SM-2 schedule.
///
/// `ease_factor` never drops below 1.3 and `interval` is always at least one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacedRepetitionRecord {
    pub item_id: String,
    pub ease_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
    pub next_review_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<DateTime<Utc>>,
}

impl SpacedRepetitionRecord {
    /// Whether the item should be presented on `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review_date <= today
    }
}

/// A reviewable piece of content. Only its schedule changes during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub bookmarked: bool,
    /// Display content handed back to the UI untouched.
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<SpacedRepetitionRecord>,
}

impl StudyItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            bookmarked: false,
            payload: serde_json::Value::Null,
            schedule: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_bookmark(mut self, bookmarked: bool) -> Self {
        self.bookmarked = bookmarked;
        self
    }

    pub fn with_schedule(mut self, schedule: SpacedRepetitionRecord) -> Self {
        self.schedule = Some(schedule);
        self
    }
}

/// Narrows the pool beyond the source mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl ItemFilter {
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            item_ids: Some(ids.into_iter().map(Into::into).collect()),
            categories: None,
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            item_ids: None,
            categories: Some(vec![category.into()]),
        }
    }

    pub fn matches(&self, item: &StudyItem) -> bool {
        let id_ok = self
            .item_ids
            .as_ref()
            .map_or(true, |ids| ids.iter().any(|id| *id == item.id));
        let category_ok = self.categories.as_ref().map_or(true, |cats| {
            item.category
                .as_ref()
                .is_some_and(|c| cats.iter().any(|want| want.eq_ignore_ascii_case(c)))
        });
        id_ok && category_ok
    }
}

/// Session configuration. Immutable once a session is initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub source_mode: SourceMode,
    pub item_count: usize,
    #[serde(default)]
    pub shuffled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_filter: Option<ItemFilter>,
}

impl SessionConfig {
    pub fn new(source_mode: SourceMode, item_count: usize) -> Self {
        Self {
            source_mode,
            item_count,
            shuffled: false,
            item_filter: None,
        }
    }

    pub fn shuffled(mut self, shuffled: bool) -> Self {
        self.shuffled = shuffled;
        self
    }

    pub fn with_filter(mut self, filter: ItemFilter) -> Self {
        self.item_filter = Some(filter);
        self
    }
}

/// Outcome of one response. Append-only, one per item per pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardResult {
    pub item_id: String,
    pub recalled: bool,
    pub response_time_ms: u64,
    pub quality_rating: u8,
    pub timestamp: DateTime<Utc>,
}

/// New schedule for an item, emitted for external storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub item_id: String,
    pub recalled: bool,
    pub quality_rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<SpacedRepetitionRecord>,
    pub record: SpacedRepetitionRecord,
}

/// Aggregate snapshot computed once at completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    pub session_id: String,
    pub total_items: usize,
    /// Items answered as recalled.
    pub got_it_count: usize,
    /// Items answered as not recalled.
    pub study_more_count: usize,
    /// Queue items left unanswered when the session was ended early.
    pub skipped_count: usize,
    pub accuracy: f64,
    pub average_response_time_ms: f64,
    pub fastest_response_ms: u64,
    pub slowest_response_ms: u64,
    pub card_results: Vec<CardResult>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: u64,
}
