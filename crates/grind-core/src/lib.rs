//! # Grind Core Library
//!
//! Core business logic for Grind, a personal mission/time tracker:
//! missions accumulate tracked seconds through either a fixed-interval
//! pomodoro timer or an open-ended flow stopwatch.
//!
//! ## Architecture
//!
//! - **Tick source**: a background thread delivering ~10ms heartbeat
//!   ticks over a channel
//! - **Timer engine**: the mode/phase state machine consuming ticks
//! - **Tracker**: the single writer applying ticks and user actions,
//!   batching sub-second accumulation onto the selected mission
//! - **Recovery**: startup reconciliation of the persisted session
//!   snapshot against wall-clock elapsed time (up to 24h offline)
//! - **Storage**: SQLite snapshot store and TOML configuration
//! - **Store**: the external mission document store collaborator
//!
//! ## Key components
//!
//! - [`TimerEngine`]: timer state machine
//! - [`Tracker`]: session orchestrator
//! - [`Ticker`]: tick source
//! - [`TaskStore`]: external store contract
//! - [`Config`]: application configuration

pub mod error;
pub mod notify;
pub mod storage;
pub mod store;
pub mod task;
pub mod timer;
pub mod tracker;

pub use error::{ConfigError, CoreError, StorageError, StoreError, TaskError, TimerError};
pub use notify::{Notifier, NullNotifier};
pub use storage::{Config, Database, TimerConfig};
pub use store::{HttpTaskStore, MemoryTaskStore, NewTask, SqliteTaskStore, TaskPatch, TaskStore};
pub use task::{sort_urgent_first, DeadlineStatus, Task};
pub use timer::{
    recover, Accumulator, MainOutcome, Phase, PhaseSignal, Recovered, SessionSnapshot, Tick,
    Ticker, TimerEngine, TimerMode, MAX_OFFLINE_MS, SNAPSHOT_KEY, TICK_MS,
};
pub use tracker::Tracker;
