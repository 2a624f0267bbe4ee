//! Session recovery.
//!
//! Runs once at startup, before the tick source can be started:
//! reconciles the persisted snapshot against wall-clock elapsed time and
//! reconstructs what the engine state and mission accumulation should be,
//! as if ticking had never stopped.
//!
//! A running pomodoro that crossed zero while the app was closed comes
//! back as a single overtime state -- intervening break/work alternations
//! and session-count increments are deliberately not replayed.

use super::engine::{Phase, TimerEngine, TimerMode};
use super::snapshot::SessionSnapshot;

/// Snapshots older than this are treated as stale and resumed in place
/// (elapsed time discarded).
pub const MAX_OFFLINE_MS: i64 = 24 * 60 * 60 * 1000;

/// Outcome of recovery.
#[derive(Debug)]
pub struct Recovered {
    pub engine: TimerEngine,
    /// Whole seconds of offline accumulation to credit to the selected
    /// mission (and push to the external store). Zero unless the snapshot
    /// was running an accumulating phase with a mission selected.
    pub catch_up_secs: u64,
}

/// Reconcile a snapshot against the current wall clock.
pub fn recover(snapshot: SessionSnapshot, now_ms: i64) -> Recovered {
    let mut elapsed = now_ms - snapshot.timestamp;
    if !(0..=MAX_OFFLINE_MS).contains(&elapsed) {
        // Clock skew or a stale snapshot: resume in place.
        elapsed = 0;
    }

    if !snapshot.is_running {
        return Recovered {
            engine: snapshot.into_engine(),
            catch_up_secs: 0,
        };
    }

    let (remaining_ms, is_overtime) = match (snapshot.mode, snapshot.is_overtime) {
        (TimerMode::Flow, _) => (snapshot.remaining_ms + elapsed, false),
        (TimerMode::Pomodoro, true) => (snapshot.remaining_ms + elapsed, true),
        (TimerMode::Pomodoro, false) => {
            let next = snapshot.remaining_ms - elapsed;
            if next <= 0 {
                // Crossed into overtime while closed.
                (-next, true)
            } else {
                (next, false)
            }
        }
    };

    // Same predicate as live accumulation: flow always counts as work.
    let accumulating = snapshot.selected_task_id.is_some()
        && (snapshot.mode == TimerMode::Flow || snapshot.phase == Phase::Work);
    let catch_up_secs = if accumulating {
        (elapsed / 1000) as u64
    } else {
        0
    };

    let engine = TimerEngine::restore(
        snapshot.mode,
        snapshot.phase,
        remaining_ms,
        is_overtime,
        true,
        snapshot.session_count,
        snapshot.selected_task_id,
        snapshot.config,
    );

    Recovered {
        engine,
        catch_up_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TimerConfig;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            remaining_ms: 1_500_000,
            is_running: false,
            mode: TimerMode::Pomodoro,
            phase: Phase::Work,
            selected_task_id: Some("m1".into()),
            is_overtime: false,
            session_count: 2,
            config: TimerConfig::default(),
            timestamp: 1_000_000,
        }
    }

    #[test]
    fn stopped_snapshot_restores_verbatim_regardless_of_elapsed() {
        for elapsed in [0, 5_000, 3_600_000, 100_000_000] {
            let snap = snapshot();
            let rec = recover(snap.clone(), snap.timestamp + elapsed);
            assert_eq!(rec.engine.remaining_ms(), snap.remaining_ms);
            assert!(!rec.engine.is_running());
            assert!(!rec.engine.is_overtime());
            assert_eq!(rec.engine.session_count(), 2);
            assert_eq!(rec.catch_up_secs, 0);
        }
    }

    #[test]
    fn running_work_crossing_zero_becomes_overtime_with_catch_up() {
        let mut snap = snapshot();
        snap.is_running = true;
        snap.remaining_ms = 5_000;
        let rec = recover(snap.clone(), snap.timestamp + 12_000);
        assert!(rec.engine.is_running());
        assert!(rec.engine.is_overtime());
        assert_eq!(rec.engine.remaining_ms(), 7_000);
        assert_eq!(rec.catch_up_secs, 12);
        // Missed completions collapse: phase and session count untouched.
        assert_eq!(rec.engine.phase(), Phase::Work);
        assert_eq!(rec.engine.session_count(), 2);
    }

    #[test]
    fn running_work_still_counting_down() {
        let mut snap = snapshot();
        snap.is_running = true;
        snap.remaining_ms = 60_000;
        let rec = recover(snap.clone(), snap.timestamp + 12_345);
        assert_eq!(rec.engine.remaining_ms(), 60_000 - 12_345);
        assert!(!rec.engine.is_overtime());
        assert_eq!(rec.catch_up_secs, 12);
    }

    #[test]
    fn running_overtime_keeps_counting_up() {
        let mut snap = snapshot();
        snap.is_running = true;
        snap.is_overtime = true;
        snap.remaining_ms = 3_000;
        let rec = recover(snap.clone(), snap.timestamp + 10_000);
        assert!(rec.engine.is_overtime());
        assert_eq!(rec.engine.remaining_ms(), 13_000);
        assert_eq!(rec.catch_up_secs, 10);
    }

    #[test]
    fn running_flow_adds_elapsed() {
        let mut snap = snapshot();
        snap.is_running = true;
        snap.mode = TimerMode::Flow;
        snap.remaining_ms = 30_000;
        let rec = recover(snap.clone(), snap.timestamp + 9_500);
        assert_eq!(rec.engine.remaining_ms(), 39_500);
        assert!(!rec.engine.is_overtime());
        assert_eq!(rec.catch_up_secs, 9);
    }

    #[test]
    fn break_phase_earns_no_catch_up() {
        let mut snap = snapshot();
        snap.is_running = true;
        snap.phase = Phase::ShortBreak;
        snap.remaining_ms = 300_000;
        let rec = recover(snap.clone(), snap.timestamp + 12_000);
        assert_eq!(rec.catch_up_secs, 0);
        assert_eq!(rec.engine.remaining_ms(), 288_000);
    }

    #[test]
    fn no_selection_earns_no_catch_up() {
        let mut snap = snapshot();
        snap.is_running = true;
        snap.selected_task_id = None;
        let rec = recover(snap.clone(), snap.timestamp + 12_000);
        assert_eq!(rec.catch_up_secs, 0);
    }

    #[test]
    fn stale_snapshot_discards_elapsed() {
        let mut snap = snapshot();
        snap.is_running = true;
        snap.remaining_ms = 5_000;
        let rec = recover(snap.clone(), snap.timestamp + 90_000_000);
        assert_eq!(rec.engine.remaining_ms(), 5_000);
        assert!(!rec.engine.is_overtime());
        assert!(rec.engine.is_running());
        assert_eq!(rec.catch_up_secs, 0);
    }

    #[test]
    fn future_timestamp_clamps_elapsed_to_zero() {
        let mut snap = snapshot();
        snap.is_running = true;
        snap.remaining_ms = 5_000;
        let rec = recover(snap.clone(), snap.timestamp - 60_000);
        assert_eq!(rec.engine.remaining_ms(), 5_000);
        assert_eq!(rec.catch_up_secs, 0);
    }

    #[test]
    fn recovery_is_idempotent_for_stopped_snapshots() {
        let snap = snapshot();
        let a = recover(snap.clone(), snap.timestamp + 1_000);
        let b = recover(snap.clone(), snap.timestamp + 20_000_000);
        assert_eq!(a.engine.remaining_ms(), b.engine.remaining_ms());
        assert_eq!(a.engine.is_running(), b.engine.is_running());
        assert_eq!(a.engine.phase(), b.engine.phase());
    }
}
