//! Reduces per-card results into session statistics.

use crate::types::{CardResult, SessionResults};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Time window a session covered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionWindow {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Active (unpaused) time measured on the monotonic clock.
    pub active: Duration,
}

/// Compute the summary for a finished session.
///
/// `queue_len` is the number of items the session was built with; anything
/// beyond the recorded results is reported as skipped.
pub fn aggregate(
    session_id: &str,
    card_results: &[CardResult],
    queue_len: usize,
    window: SessionWindow,
) -> SessionResults {
    let total = card_results.len();
    let got_it = card_results.iter().filter(|r| r.recalled).count();
    let times = card_results.iter().map(|r| r.response_time_ms);

    let accuracy = if total == 0 {
        0.0
    } else {
        got_it as f64 / total as f64 * 100.0
    };
    let average = if total == 0 {
        0.0
    } else {
        times.clone().map(u128::from).sum::<u128>() as f64 / total as f64
    };

    SessionResults {
        session_id: session_id.to_string(),
        total_items: total,
        got_it_count: got_it,
        study_more_count: total - got_it,
        skipped_count: queue_len.saturating_sub(total),
        accuracy,
        average_response_time_ms: average,
        fastest_response_ms: times.clone().min().unwrap_or(0),
        slowest_response_ms: times.max().unwrap_or(0),
        card_results: card_results.to_vec(),
        started_at: window.started_at,
        completed_at: window.completed_at,
        duration_seconds: window.active.as_secs(),
    }
}
