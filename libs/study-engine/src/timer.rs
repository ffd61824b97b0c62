//! Clocks and the pause-aware session stopwatch.
//!
//! Elapsed time is measured on a monotonic `Instant` so wall-clock
//! adjustments cannot skew it. Wall-clock timestamps are only used for
//! reporting (`started_at`, `completed_at`, card timestamps).

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of both monotonic instants and wall-clock timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn instant(&self) -> Instant;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced clock for tests and replays. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base_instant: Instant,
    base_wall: DateTime<Utc>,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            base_instant: Instant::now(),
            base_wall: start,
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    fn offset(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let offset = chrono::Duration::from_std(self.offset()).unwrap_or(chrono::Duration::zero());
        self.base_wall + offset
    }

    fn instant(&self) -> Instant {
        self.base_instant + self.offset()
    }
}

/// Restartable stopwatch that stops accruing while paused.
pub struct SessionTimer {
    clock: Arc<dyn Clock>,
    accumulated: Duration,
    anchor: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
    displayed: Duration,
}

impl SessionTimer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            accumulated: Duration::ZERO,
            anchor: None,
            paused_at: None,
            paused_total: Duration::ZERO,
            displayed: Duration::ZERO,
        }
    }

    /// Reset and begin accruing from now.
    pub fn start(&mut self) {
        self.reset();
        self.anchor = Some(self.clock.instant());
    }

    /// Freeze elapsed time. Returns false if the timer was not running.
    pub fn pause(&mut self) -> bool {
        let Some(anchor) = self.anchor.take() else {
            return false;
        };
        let now = self.clock.instant();
        self.accumulated += now.saturating_duration_since(anchor);
        self.paused_at = Some(now);
        self.displayed = self.accumulated;
        true
    }

    /// Re-anchor so elapsed time continues without a jump. Returns false if not paused.
    pub fn resume(&mut self) -> bool {
        let Some(paused_at) = self.paused_at.take() else {
            return false;
        };
        let now = self.clock.instant();
        self.paused_total += now.saturating_duration_since(paused_at);
        self.anchor = Some(now);
        true
    }

    /// Stop accruing for good, folding any open pause into the paused total.
    pub fn stop(&mut self) {
        self.pause();
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += self.clock.instant().saturating_duration_since(paused_at);
        }
        self.displayed = self.accumulated;
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.anchor = None;
        self.paused_at = None;
        self.paused_total = Duration::ZERO;
        self.displayed = Duration::ZERO;
    }

    /// Periodic refresh, driven by the host (e.g. once per second).
    pub fn tick(&mut self) -> Duration {
        self.displayed = self.elapsed();
        self.displayed
    }

    /// Value as of the last `tick`, `pause` or `stop`.
    pub fn displayed(&self) -> Duration {
        self.displayed
    }

    /// Live active time.
    pub fn elapsed(&self) -> Duration {
        let running = self
            .anchor
            .map(|a| self.clock.instant().saturating_duration_since(a))
            .unwrap_or_default();
        self.accumulated + running
    }

    /// Time spent paused, including a pause still in progress.
    pub fn paused_total(&self) -> Duration {
        let open = self
            .paused_at
            .map(|p| self.clock.instant().saturating_duration_since(p))
            .unwrap_or_default();
        self.paused_total + open
    }

    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }
}

impl std::fmt::Debug for SessionTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTimer")
            .field("accumulated", &self.accumulated)
            .field("running", &self.is_running())
            .field("paused", &self.is_paused())
            .field("paused_total", &self.paused_total)
            .finish()
    }
}
