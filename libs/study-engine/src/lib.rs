//! Adaptive study-session engine.
//!
//! Provides:
//! - Session state machine driving a review queue (`SessionManager`)
//! - SM-2 spaced repetition scheduling
//! - Response classification from a swipe plus latency
//! - Pause-aware session timing and result aggregation
//! - Recorder hand-off and an in-memory progress store

pub mod aggregator;
pub mod algorithm;
pub mod classifier;
pub mod date_utils;
pub mod error;
pub mod events;
pub mod progress;
pub mod queue;
pub mod recorder;
pub mod session;
pub mod settings;
pub mod timer;
pub mod types;

pub use algorithm::{get_scheduler, sm2::Sm2, SpacedRepetitionScheduler};
pub use classifier::{ClassifierThresholds, ResponseClassifier};
pub use error::{EngineError, RecorderError, Result};
pub use events::{SessionEvent, SubscriptionId};
pub use progress::{ItemProgress, ProgressStore, StudyStats};
pub use recorder::{ChannelRecorder, SessionRecorder, TracingRecorder};
pub use session::{Progress, ResponseOutcome, RunningStats, SessionManager, SessionState};
pub use settings::EngineSettings;
pub use timer::{Clock, ManualClock, SessionTimer, SystemClock};
pub use types::{
    CardResult, ItemFilter, ResponseDirection, ScheduleUpdate, SessionConfig, SessionResults,
    SessionStatus, SourceMode, SpacedRepetitionRecord, StudyItem,
};
