//! Timer state machine.
//!
//! One owned instance per process. The engine consumes ticks from the
//! tick source and produces state transitions; it never spawns threads or
//! touches storage itself.
//!
//! ## Modes
//!
//! - **Pomodoro**: counts down through work / short-break / long-break
//!   phases. Reaching zero flips into overtime (counting up) and emits a
//!   phase-completion signal; the phase never auto-advances.
//! - **Flow**: open-ended stopwatch, counts up from the selected
//!   mission's daily total. No phases, no overtime.

use serde::{Deserialize, Serialize};

use super::ticker::TICK_MS;
use crate::error::TimerError;
use crate::storage::TimerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Open-ended stopwatch.
    Flow,
    /// Fixed-duration work/break cycle.
    Pomodoro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

/// Fired on the exact tick a pomodoro countdown crosses zero.
/// Downstream maps these to sounds/alerts; the engine does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseSignal {
    WorkComplete,
    BreakComplete,
}

/// What the main (play/pause) action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainOutcome {
    Started,
    Stopped,
    /// Overtime was resolved: phase advanced, new phase auto-started.
    AdvancedAndStarted(Phase),
}

/// Core timer state machine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    mode: TimerMode,
    phase: Phase,
    /// Countdown remainder in pomodoro mode, elapsed time in flow mode
    /// and in overtime. Clamped at 0 on the overtime crossing.
    remaining_ms: i64,
    is_overtime: bool,
    is_running: bool,
    /// 1-based count of work phases since the last long break.
    session_count: u32,
    selected_task_id: Option<String>,
    config: TimerConfig,
}

impl TimerEngine {
    /// Fresh-install state: pomodoro, work phase, full work duration.
    pub fn new(config: TimerConfig) -> Self {
        Self {
            mode: TimerMode::Pomodoro,
            phase: Phase::Work,
            remaining_ms: config.work_ms(),
            is_overtime: false,
            is_running: false,
            session_count: 1,
            selected_task_id: None,
            config,
        }
    }

    /// Rebuild an engine from recovered snapshot fields.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        mode: TimerMode,
        phase: Phase,
        remaining_ms: i64,
        is_overtime: bool,
        is_running: bool,
        session_count: u32,
        selected_task_id: Option<String>,
        config: TimerConfig,
    ) -> Self {
        Self {
            mode,
            phase,
            remaining_ms,
            is_overtime,
            is_running,
            session_count: session_count.max(1),
            selected_task_id,
            config,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_ms(&self) -> i64 {
        self.remaining_ms
    }

    pub fn is_overtime(&self) -> bool {
        self.is_overtime
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn selected_task_id(&self) -> Option<&str> {
        self.selected_task_id.as_deref()
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Whether ticks currently accumulate onto the selected mission.
    ///
    /// Flow mode always behaves as work; in pomodoro mode only the work
    /// phase accumulates. Overtime on a work phase keeps accumulating.
    pub fn accumulates(&self) -> bool {
        self.is_running
            && self.selected_task_id.is_some()
            && (self.mode == TimerMode::Flow || self.phase == Phase::Work)
    }

    // ── Tick transition ──────────────────────────────────────────────

    /// Consume one tick (~10ms). Only mutates while running.
    ///
    /// Returns a [`PhaseSignal`] on the exact tick a pomodoro countdown
    /// crosses zero.
    pub fn tick(&mut self) -> Option<PhaseSignal> {
        if !self.is_running {
            return None;
        }
        match self.mode {
            TimerMode::Flow => {
                self.remaining_ms += TICK_MS as i64;
                None
            }
            TimerMode::Pomodoro => {
                if self.is_overtime {
                    self.remaining_ms += TICK_MS as i64;
                    return None;
                }
                let next = self.remaining_ms - TICK_MS as i64;
                if next <= 0 {
                    self.remaining_ms = 0;
                    self.is_overtime = true;
                    Some(match self.phase {
                        Phase::Work => PhaseSignal::WorkComplete,
                        Phase::ShortBreak | Phase::LongBreak => PhaseSignal::BreakComplete,
                    })
                } else {
                    self.remaining_ms = next;
                    None
                }
            }
        }
    }

    // ── Explicit transitions ─────────────────────────────────────────

    /// Switch flow <-> pomodoro. Halts the timer.
    ///
    /// Entering pomodoro resets to a full work phase; entering flow snaps
    /// the display to the selected mission's daily total (0 if none).
    pub fn toggle_mode(&mut self, selected_today_secs: Option<u64>) {
        self.halt();
        self.mode = match self.mode {
            TimerMode::Flow => TimerMode::Pomodoro,
            TimerMode::Pomodoro => TimerMode::Flow,
        };
        match self.mode {
            TimerMode::Pomodoro => {
                self.phase = Phase::Work;
                self.remaining_ms = self.config.work_ms();
            }
            TimerMode::Flow => {
                self.remaining_ms = selected_today_secs.map_or(0, |s| s as i64 * 1000);
            }
        }
    }

    /// Move to the next pomodoro phase. Halts the timer.
    ///
    /// Work advances to a long break every `interval`-th session, else a
    /// short break. A break advances back to work; the session counter
    /// resets to 1 when leaving a long break and increments otherwise.
    pub fn advance_phase(&mut self) {
        self.halt();
        let interval = self.config.interval.max(1);
        match self.phase {
            Phase::Work => {
                if self.session_count % interval == 0 {
                    self.phase = Phase::LongBreak;
                    self.remaining_ms = self.config.long_ms();
                } else {
                    self.phase = Phase::ShortBreak;
                    self.remaining_ms = self.config.short_ms();
                }
            }
            Phase::ShortBreak => {
                self.session_count += 1;
                self.phase = Phase::Work;
                self.remaining_ms = self.config.work_ms();
            }
            Phase::LongBreak => {
                self.session_count = 1;
                self.phase = Phase::Work;
                self.remaining_ms = self.config.work_ms();
            }
        }
    }

    /// The play/pause button.
    ///
    /// In pomodoro overtime this resolves the overtime: advance the phase
    /// and auto-start it. Otherwise it toggles running. Starting requires
    /// a selected mission.
    ///
    /// # Errors
    /// [`TimerError::NoTaskSelected`] when no mission is selected;
    /// nothing is mutated in that case.
    pub fn main_action(&mut self) -> Result<MainOutcome, TimerError> {
        if self.selected_task_id.is_none() {
            return Err(TimerError::NoTaskSelected);
        }
        if self.mode == TimerMode::Pomodoro && self.is_overtime {
            self.advance_phase();
            self.is_running = true;
            Ok(MainOutcome::AdvancedAndStarted(self.phase))
        } else if self.is_running {
            self.stop();
            Ok(MainOutcome::Stopped)
        } else {
            self.is_running = true;
            Ok(MainOutcome::Started)
        }
    }

    /// Stop without touching the rest of the state. The overtime flag
    /// survives so the next main action still resolves it.
    pub fn stop(&mut self) {
        self.is_running = false;
    }

    /// Change (or clear) the selected mission.
    ///
    /// While stopped in flow mode the display snaps to the new mission's
    /// daily total; a paused pomodoro countdown is left untouched.
    pub fn select_task(&mut self, id: Option<String>, today_secs: Option<u64>) {
        self.selected_task_id = id;
        if !self.is_running && self.mode == TimerMode::Flow {
            if let Some(secs) = today_secs {
                self.remaining_ms = secs as i64 * 1000;
            }
        }
    }

    /// Apply a saved configuration.
    ///
    /// A stopped work-phase pomodoro picks up the new work duration
    /// immediately; a running timer keeps its current countdown.
    pub fn apply_config(&mut self, config: TimerConfig) {
        self.config = config;
        if !self.is_running && self.mode == TimerMode::Pomodoro && self.phase == Phase::Work {
            self.remaining_ms = self.config.work_ms();
        }
    }

    fn halt(&mut self) {
        self.is_running = false;
        self.is_overtime = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> TimerEngine {
        let mut e = TimerEngine::new(TimerConfig::default());
        e.select_task(Some("m1".into()), Some(0));
        e
    }

    fn running_engine() -> TimerEngine {
        let mut e = engine();
        e.main_action().unwrap();
        e
    }

    #[test]
    fn fresh_state() {
        let e = TimerEngine::new(TimerConfig::default());
        assert_eq!(e.mode(), TimerMode::Pomodoro);
        assert_eq!(e.phase(), Phase::Work);
        assert_eq!(e.remaining_ms(), 1_500_000);
        assert!(!e.is_overtime());
        assert!(!e.is_running());
        assert_eq!(e.session_count(), 1);
    }

    #[test]
    fn start_without_selection_is_rejected() {
        let mut e = TimerEngine::new(TimerConfig::default());
        assert_eq!(e.main_action(), Err(TimerError::NoTaskSelected));
        assert!(!e.is_running());
        assert_eq!(e.remaining_ms(), 1_500_000);
    }

    #[test]
    fn tick_ignored_while_stopped() {
        let mut e = engine();
        assert!(e.tick().is_none());
        assert_eq!(e.remaining_ms(), 1_500_000);
    }

    #[test]
    fn pomodoro_counts_down_by_tick() {
        let mut e = running_engine();
        for _ in 0..5 {
            assert!(e.tick().is_none());
        }
        assert_eq!(e.remaining_ms(), 1_500_000 - 50);
    }

    #[test]
    fn flow_counts_up_by_tick() {
        let mut e = engine();
        e.toggle_mode(Some(7));
        assert_eq!(e.mode(), TimerMode::Flow);
        assert_eq!(e.remaining_ms(), 7000);
        e.main_action().unwrap();
        let mut prev = e.remaining_ms();
        for _ in 0..10 {
            assert!(e.tick().is_none());
            assert_eq!(e.remaining_ms(), prev + 10);
            prev = e.remaining_ms();
        }
        assert!(!e.is_overtime());
    }

    #[test]
    fn overtime_flips_on_exact_zero_crossing_tick() {
        let mut e = TimerEngine::new(TimerConfig {
            work: 1,
            ..TimerConfig::default()
        });
        e.select_task(Some("m1".into()), None);
        e.main_action().unwrap();
        // 1s of work = 100 ticks; the 100th tick crosses zero.
        for i in 1..100 {
            assert!(e.tick().is_none(), "tick {i} fired early");
            assert!(!e.is_overtime());
        }
        assert_eq!(e.remaining_ms(), 10);
        assert_eq!(e.tick(), Some(PhaseSignal::WorkComplete));
        assert!(e.is_overtime());
        assert_eq!(e.remaining_ms(), 0);
        // Overtime now counts up, no further signals.
        assert!(e.tick().is_none());
        assert_eq!(e.remaining_ms(), 10);
    }

    #[test]
    fn break_completion_signals_break() {
        let mut e = TimerEngine::new(TimerConfig {
            work: 1,
            short: 1,
            ..TimerConfig::default()
        });
        e.select_task(Some("m1".into()), None);
        e.advance_phase();
        assert_eq!(e.phase(), Phase::ShortBreak);
        e.main_action().unwrap();
        for _ in 1..100 {
            assert!(e.tick().is_none());
        }
        assert_eq!(e.tick(), Some(PhaseSignal::BreakComplete));
    }

    #[test]
    fn phase_cycle_with_interval_four() {
        let mut e = engine();
        // Sessions 1..3 earn a short break.
        for expected_session in 1..=3u32 {
            assert_eq!(e.session_count(), expected_session);
            assert_eq!(e.phase(), Phase::Work);
            e.advance_phase();
            assert_eq!(e.phase(), Phase::ShortBreak);
            e.advance_phase();
        }
        // Session 4 earns the long break.
        assert_eq!(e.session_count(), 4);
        e.advance_phase();
        assert_eq!(e.phase(), Phase::LongBreak);
        assert_eq!(e.remaining_ms(), 900_000);
        // Leaving the long break resets the counter.
        e.advance_phase();
        assert_eq!(e.phase(), Phase::Work);
        assert_eq!(e.session_count(), 1);
    }

    #[test]
    fn advance_halts_and_clears_overtime() {
        let mut e = TimerEngine::new(TimerConfig {
            work: 1,
            ..TimerConfig::default()
        });
        e.select_task(Some("m1".into()), None);
        e.main_action().unwrap();
        for _ in 0..100 {
            e.tick();
        }
        assert!(e.is_overtime());
        e.advance_phase();
        assert!(!e.is_overtime());
        assert!(!e.is_running());
        assert_eq!(e.phase(), Phase::ShortBreak);
        assert_eq!(e.remaining_ms(), 300_000);
    }

    #[test]
    fn main_action_in_overtime_advances_and_starts() {
        let mut e = TimerEngine::new(TimerConfig {
            work: 1,
            ..TimerConfig::default()
        });
        e.select_task(Some("m1".into()), None);
        e.main_action().unwrap();
        for _ in 0..150 {
            e.tick();
        }
        assert!(e.is_overtime());
        let outcome = e.main_action().unwrap();
        assert_eq!(outcome, MainOutcome::AdvancedAndStarted(Phase::ShortBreak));
        assert!(e.is_running());
        assert!(!e.is_overtime());
    }

    #[test]
    fn toggle_to_flow_snaps_to_today_duration() {
        let mut e = engine();
        e.toggle_mode(Some(42));
        assert_eq!(e.mode(), TimerMode::Flow);
        assert_eq!(e.remaining_ms(), 42_000);
        assert!(!e.is_running());
        // Back to pomodoro resets the work phase.
        e.toggle_mode(Some(42));
        assert_eq!(e.mode(), TimerMode::Pomodoro);
        assert_eq!(e.phase(), Phase::Work);
        assert_eq!(e.remaining_ms(), 1_500_000);
    }

    #[test]
    fn toggle_to_flow_without_selection_is_zero() {
        let mut e = TimerEngine::new(TimerConfig::default());
        e.toggle_mode(None);
        assert_eq!(e.remaining_ms(), 0);
    }

    #[test]
    fn select_snaps_flow_display_but_not_paused_pomodoro() {
        let mut e = engine();
        // Paused mid-countdown in pomodoro: selection must not clobber it.
        e.main_action().unwrap();
        for _ in 0..100 {
            e.tick();
        }
        e.main_action().unwrap(); // pause
        let paused_at = e.remaining_ms();
        e.select_task(Some("m2".into()), Some(42));
        assert_eq!(e.remaining_ms(), paused_at);
        // Flow mode snaps.
        e.toggle_mode(Some(10));
        e.select_task(Some("m3".into()), Some(42));
        assert_eq!(e.remaining_ms(), 42_000);
    }

    #[test]
    fn config_save_applies_to_stopped_work_phase() {
        let mut e = engine();
        let cfg = TimerConfig {
            work: 600,
            ..TimerConfig::default()
        };
        e.apply_config(cfg.clone());
        assert_eq!(e.remaining_ms(), 600_000);
        // While running, the countdown is untouched.
        e.main_action().unwrap();
        e.tick();
        let mid = e.remaining_ms();
        e.apply_config(TimerConfig::default());
        assert_eq!(e.remaining_ms(), mid);
    }

    #[test]
    fn accumulates_predicate() {
        let mut e = engine();
        assert!(!e.accumulates()); // stopped
        e.main_action().unwrap();
        assert!(e.accumulates()); // running work phase
        e.advance_phase();
        e.select_task(Some("m1".into()), None);
        e.main_action().unwrap();
        assert_eq!(e.phase(), Phase::ShortBreak);
        assert!(!e.accumulates()); // break phase
        e.toggle_mode(Some(0));
        e.main_action().unwrap();
        assert!(e.accumulates()); // flow always accumulates
    }

    #[test]
    fn stop_preserves_overtime() {
        let mut e = TimerEngine::new(TimerConfig {
            work: 1,
            ..TimerConfig::default()
        });
        e.select_task(Some("m1".into()), None);
        e.main_action().unwrap();
        for _ in 0..120 {
            e.tick();
        }
        assert!(e.is_overtime());
        e.stop();
        assert!(e.is_overtime());
        // The next main action still resolves the overtime.
        let outcome = e.main_action().unwrap();
        assert!(matches!(outcome, MainOutcome::AdvancedAndStarted(_)));
    }
}
