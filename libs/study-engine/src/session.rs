//! Study session state machine.
//!
//! `idle -> loading -> idle (ready) -> active <-> paused -> completed`, with
//! `reset` returning to `idle` from anywhere. All operations run to completion
//! before returning. A host that shares a manager across threads must
//! serialize calls itself (e.g. `Arc<Mutex<SessionManager>>`).

use crate::aggregator::{aggregate, SessionWindow};
use crate::algorithm::SpacedRepetitionScheduler;
use crate::classifier::ResponseClassifier;
use crate::date_utils::adjusted_day;
use crate::error::{EngineError, Result};
use crate::events::{Observers, SessionEvent, SubscriptionId};
use crate::queue::build_queue;
use crate::recorder::SessionRecorder;
use crate::settings::EngineSettings;
use crate::timer::{Clock, SessionTimer, SystemClock};
use crate::types::{
    CardResult, ItemFilter, ResponseDirection, ScheduleUpdate, SessionConfig, SessionResults,
    SessionStatus, SourceMode, StudyItem,
};
use chrono::{DateTime, Local, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// The single live session owned by a `SessionManager`.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: String,
    pub config: SessionConfig,
    pub queue: Vec<StudyItem>,
    pub cursor: usize,
    pub results: Vec<CardResult>,
    pub started_at: Option<DateTime<Utc>>,
    pub paused_accumulated_ms: u64,
    pub completed_at: Option<DateTime<Utc>>,
    /// The current item has been flipped.
    pub revealed: bool,
    summary: Option<SessionResults>,
}

impl SessionState {
    fn new(config: SessionConfig, queue: Vec<StudyItem>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            queue,
            cursor: 0,
            results: Vec::new(),
            started_at: None,
            paused_accumulated_ms: 0,
            completed_at: None,
            revealed: false,
            summary: None,
        }
    }

    pub fn current_item(&self) -> Option<&StudyItem> {
        self.queue.get(self.cursor)
    }

    /// Cached aggregate, present once the session completed.
    pub fn summary(&self) -> Option<&SessionResults> {
        self.summary.as_ref()
    }
}

/// Position in the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub cursor: usize,
    pub total: usize,
}

/// Counts so far in the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningStats {
    pub got_it_count: usize,
    pub study_more_count: usize,
}

/// Everything produced by one `record_response` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseOutcome {
    pub card_result: CardResult,
    /// New schedule for the answered item, for the caller to persist.
    pub schedule_update: ScheduleUpdate,
    /// Set when this response exhausted the queue.
    pub completed: Option<SessionResults>,
}

/// Drives one study session at a time.
pub struct SessionManager {
    settings: EngineSettings,
    classifier: ResponseClassifier,
    scheduler: Box<dyn SpacedRepetitionScheduler>,
    clock: Arc<dyn Clock>,
    timer: SessionTimer,
    rng: StdRng,
    recorder: Option<Arc<dyn SessionRecorder>>,
    observers: Observers,
    status: SessionStatus,
    state: Option<SessionState>,
}

impl SessionManager {
    /// Create a manager after validating `settings`.
    pub fn new(settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        let scheduler = settings.scheduler()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(Self {
            classifier: ResponseClassifier::new(settings.classifier),
            scheduler,
            timer: SessionTimer::new(clock.clone()),
            clock,
            rng: StdRng::from_entropy(),
            recorder: None,
            observers: Observers::default(),
            status: SessionStatus::Idle,
            state: None,
            settings,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.timer = SessionTimer::new(clock.clone());
        self.clock = clock;
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn SessionRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Deterministic shuffling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Build the review queue. On error nothing changes.
    pub fn initialize(&mut self, config: SessionConfig, pool: Vec<StudyItem>) -> Result<Progress> {
        if matches!(
            self.status,
            SessionStatus::Loading | SessionStatus::Active | SessionStatus::Paused
        ) {
            return Err(self.reject("initialize"));
        }

        let today = self.today();
        let queue = build_queue(&config, pool, today, &mut self.rng)?;

        self.timer.reset();
        self.state = None;
        self.set_status(SessionStatus::Loading);

        let state = SessionState::new(config, queue);
        let progress = Progress {
            cursor: 0,
            total: state.queue.len(),
        };
        tracing::debug!(
            session_id = %state.id,
            items = progress.total,
            "study session initialized"
        );
        self.state = Some(state);
        self.set_status(SessionStatus::Idle);
        Ok(progress)
    }

    pub fn start(&mut self) -> Result<()> {
        let ready = self.status == SessionStatus::Idle
            && self.state.as_ref().is_some_and(|s| s.started_at.is_none());
        if !ready {
            return Err(self.reject("start"));
        }

        let now = self.clock.now();
        if let Some(state) = self.state.as_mut() {
            state.started_at = Some(now);
            tracing::info!(
                session_id = %state.id,
                items = state.queue.len(),
                "study session started"
            );
        }
        self.timer.start();
        self.set_status(SessionStatus::Active);
        Ok(())
    }

    /// Note that the current item was revealed. Stale ids are ignored.
    pub fn flip(&mut self, item_id: &str) {
        let live = matches!(self.status, SessionStatus::Active | SessionStatus::Paused);
        let current = self
            .state
            .as_mut()
            .filter(|_| live)
            .filter(|s| s.current_item().is_some_and(|item| item.id == item_id));

        match current {
            Some(state) => {
                state.revealed = true;
                let event = SessionEvent::ItemRevealed {
                    item_id: item_id.to_string(),
                };
                self.observers.emit(&event);
            }
            None => {
                tracing::debug!(item_id, status = %self.status, "ignoring stale flip");
            }
        }
    }

    /// Grade the current item, reschedule it and advance.
    pub fn record_response(
        &mut self,
        direction: ResponseDirection,
        response_time_ms: u64,
    ) -> Result<ResponseOutcome> {
        if self.status != SessionStatus::Active {
            return Err(self.reject("record a response"));
        }

        let now = self.clock.now();
        let today = self.today();
        let quality = self.classifier.classify(direction, response_time_ms);

        let (card_result, schedule_update, progress) = {
            let Some(state) = self.state.as_mut() else {
                return Err(EngineError::invalid_state("record a response", self.status));
            };
            let Some(item) = state.queue.get_mut(state.cursor) else {
                return Err(EngineError::invalid_state("record a response", self.status));
            };

            let previous = item.schedule.clone();
            let base = previous
                .clone()
                .unwrap_or_else(|| self.scheduler.initial_record(&item.id, today));
            let record = self.scheduler.update(&base, quality, now, today);
            item.schedule = Some(record.clone());

            let card_result = CardResult {
                item_id: item.id.clone(),
                recalled: direction.is_recalled(),
                response_time_ms,
                quality_rating: quality,
                timestamp: now,
            };
            let update = ScheduleUpdate {
                item_id: item.id.clone(),
                recalled: direction.is_recalled(),
                quality_rating: quality,
                previous,
                record,
            };

            state.results.push(card_result.clone());
            state.cursor += 1;
            state.revealed = false;
            let progress = Progress {
                cursor: state.cursor,
                total: state.queue.len(),
            };
            (card_result, update, progress)
        };

        self.observers
            .emit(&SessionEvent::ScheduleUpdated(schedule_update.clone()));
        self.observers.emit(&SessionEvent::ItemAdvanced {
            cursor: progress.cursor,
            total: progress.total,
        });

        let completed = if progress.cursor >= progress.total {
            Some(self.finish(true)?)
        } else {
            None
        };

        Ok(ResponseOutcome {
            card_result,
            schedule_update,
            completed,
        })
    }

    pub fn pause(&mut self) -> Result<()> {
        match self.status {
            SessionStatus::Paused => Ok(()),
            SessionStatus::Active => {
                self.timer.pause();
                self.sync_paused_ms();
                self.set_status(SessionStatus::Paused);
                Ok(())
            }
            _ => Err(self.reject("pause")),
        }
    }

    pub fn resume(&mut self) -> Result<()> {
        match self.status {
            SessionStatus::Active => Ok(()),
            SessionStatus::Paused => {
                self.timer.resume();
                self.sync_paused_ms();
                self.set_status(SessionStatus::Active);
                Ok(())
            }
            _ => Err(self.reject("resume")),
        }
    }

    /// End the session. Repeated calls return the cached results.
    pub fn complete(&mut self) -> Result<SessionResults> {
        match self.status {
            SessionStatus::Completed => self
                .state
                .as_ref()
                .and_then(|s| s.summary.clone())
                .ok_or_else(|| self.reject("complete")),
            SessionStatus::Active | SessionStatus::Paused => self.finish(false),
            _ => Err(self.reject("complete")),
        }
    }

    /// Discard the current session. Always succeeds.
    pub fn reset(&mut self) {
        if let Some(state) = self.state.take() {
            tracing::debug!(session_id = %state.id, status = %self.status, "study session reset");
        }
        self.timer.reset();
        self.set_status(SessionStatus::Idle);
    }

    /// Replace the completed session with one over the items last answered as not recalled.
    pub fn review_mistakes(&mut self) -> Result<Progress> {
        if self.status != SessionStatus::Completed {
            return Err(self.reject("review mistakes"));
        }
        let Some(state) = self.state.as_ref() else {
            return Err(self.reject("review mistakes"));
        };

        let mut last_outcome: HashMap<&str, bool> = HashMap::new();
        for result in &state.results {
            last_outcome.insert(result.item_id.as_str(), result.recalled);
        }
        let missed: Vec<StudyItem> = state
            .queue
            .iter()
            .filter(|item| last_outcome.get(item.id.as_str()) == Some(&false))
            .cloned()
            .collect();

        if missed.is_empty() {
            return Err(EngineError::config("no missed items to review"));
        }

        let config = SessionConfig {
            source_mode: SourceMode::Custom,
            item_count: missed.len(),
            shuffled: state.config.shuffled,
            item_filter: Some(ItemFilter::ids(missed.iter().map(|i| i.id.clone()))),
        };
        self.initialize(config, missed)
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn current_item(&self) -> Option<&StudyItem> {
        self.state.as_ref().and_then(SessionState::current_item)
    }

    pub fn is_revealed(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.revealed)
    }

    pub fn progress(&self) -> Progress {
        self.state
            .as_ref()
            .map(|s| Progress {
                cursor: s.cursor,
                total: s.queue.len(),
            })
            .unwrap_or_default()
    }

    pub fn running_stats(&self) -> RunningStats {
        let results = self.state.as_ref().map(|s| s.results.as_slice()).unwrap_or(&[]);
        let got_it_count = results.iter().filter(|r| r.recalled).count();
        RunningStats {
            got_it_count,
            study_more_count: results.len() - got_it_count,
        }
    }

    pub fn results(&self) -> Option<&SessionResults> {
        self.state.as_ref().and_then(SessionState::summary)
    }

    /// Live active time of the current session.
    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    /// Periodic refresh from the host's ticker. Frozen unless active.
    pub fn tick(&mut self) -> Duration {
        match self.status {
            SessionStatus::Active => self.timer.tick(),
            SessionStatus::Paused => {
                self.sync_paused_ms();
                self.timer.displayed()
            }
            _ => self.timer.displayed(),
        }
    }

    /// Time spent paused so far, including a pause still in progress.
    pub fn paused_time(&self) -> Duration {
        self.timer.paused_total()
    }

    /// Study day used for due dates, honoring the daily reset hour.
    pub fn today(&self) -> NaiveDate {
        adjusted_day(
            &self.clock.now().with_timezone(&Local),
            self.settings.daily_reset_hour,
        )
    }

    fn finish(&mut self, automatic: bool) -> Result<SessionResults> {
        self.timer.stop();
        let completed_at = self.clock.now();
        let active = self.timer.elapsed();
        let paused_ms = self.timer.paused_total().as_millis() as u64;

        let results = {
            let Some(state) = self.state.as_mut() else {
                return Err(EngineError::invalid_state("complete", self.status));
            };
            let window = SessionWindow {
                started_at: state.started_at.unwrap_or(completed_at),
                completed_at,
                active,
            };
            let results = aggregate(&state.id, &state.results, state.queue.len(), window);
            state.paused_accumulated_ms = paused_ms;
            state.completed_at = Some(completed_at);
            state.summary = Some(results.clone());
            results
        };

        tracing::info!(
            session_id = %results.session_id,
            automatic,
            total = results.total_items,
            accuracy = results.accuracy,
            "study session completed"
        );

        self.set_status(SessionStatus::Completed);
        self.observers.emit(&SessionEvent::SessionCompleted {
            results: results.clone(),
            automatic,
        });

        if let Some(recorder) = &self.recorder {
            if let Err(e) = recorder.record(&results) {
                tracing::warn!(
                    session_id = %results.session_id,
                    error = %e,
                    "failed to record session"
                );
            }
        }

        Ok(results)
    }

    fn sync_paused_ms(&mut self) {
        let paused_ms = self.timer.paused_total().as_millis() as u64;
        if let Some(state) = self.state.as_mut() {
            state.paused_accumulated_ms = paused_ms;
        }
    }

    fn set_status(&mut self, to: SessionStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        self.observers.emit(&SessionEvent::StatusChanged { from, to });
    }

    fn reject(&self, operation: &'static str) -> EngineError {
        tracing::debug!(operation, status = %self.status, "rejected session operation");
        EngineError::invalid_state(operation, self.status)
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        let settings = EngineSettings::default();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            classifier: ResponseClassifier::new(settings.classifier),
            scheduler: Box::new(settings.sm2.clone()),
            timer: SessionTimer::new(clock.clone()),
            clock,
            rng: StdRng::from_entropy(),
            recorder: None,
            observers: Observers::default(),
            status: SessionStatus::Idle,
            state: None,
            settings,
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("scheduler", &self.scheduler.name())
            .field("status", &self.status)
            .field("progress", &self.progress())
            .field("timer", &self.timer)
            .field("observers", &self.observers)
            .finish()
    }
}
