//! Shared helpers for session integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use chrono::{TimeZone, Utc};
use study_engine::{ManualClock, SessionEvent, SessionManager, StudyItem};

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per binary. Honors RUST_LOG.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Instrument catalog entries with ids `a`, `b`, ...
pub fn instruments(ids: &[&str]) -> Vec<StudyItem> {
    ids.iter()
        .map(|id| StudyItem::new(*id, format!("Instrument {}", id.to_uppercase())))
        .collect()
}

/// A manager on a hand-driven clock fixed at midday UTC, with a fixed shuffle seed.
pub fn manager() -> (ManualClock, SessionManager) {
    init_tracing();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 7, 10, 12, 0, 0).unwrap());
    let manager = SessionManager::default()
        .with_clock(Arc::new(clock.clone()))
        .with_seed(1234);
    (clock, manager)
}

/// Collect every event the manager emits.
pub fn capture_events(manager: &mut SessionManager) -> Arc<Mutex<Vec<SessionEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    manager.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}
