//! Persisted session snapshot.
//!
//! The full timer session state plus a write timestamp, stored as a JSON
//! blob in the local kv store. Written on every accumulation flush, about
//! once per second while running, on stop, and on every explicit
//! state-changing action; read once at startup by the recovery engine.

use serde::{Deserialize, Serialize};

use super::engine::{Phase, TimerEngine, TimerMode};
use crate::storage::TimerConfig;

/// kv key the snapshot blob lives under.
pub const SNAPSHOT_KEY: &str = "session_snapshot";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub remaining_ms: i64,
    pub is_running: bool,
    pub mode: TimerMode,
    pub phase: Phase,
    pub selected_task_id: Option<String>,
    pub is_overtime: bool,
    pub session_count: u32,
    pub config: TimerConfig,
    /// Epoch milliseconds of the write.
    pub timestamp: i64,
}

impl SessionSnapshot {
    /// Capture the engine state at `timestamp`.
    pub fn capture(engine: &TimerEngine, timestamp: i64) -> Self {
        Self {
            remaining_ms: engine.remaining_ms(),
            is_running: engine.is_running(),
            mode: engine.mode(),
            phase: engine.phase(),
            selected_task_id: engine.selected_task_id().map(str::to_owned),
            is_overtime: engine.is_overtime(),
            session_count: engine.session_count(),
            config: engine.config().clone(),
            timestamp,
        }
    }

    /// Restore an engine verbatim from this snapshot.
    pub fn into_engine(self) -> TimerEngine {
        TimerEngine::restore(
            self.mode,
            self.phase,
            self.remaining_ms,
            self.is_overtime,
            self.is_running,
            self.session_count,
            self.selected_task_id,
            self.config,
        )
    }
}
