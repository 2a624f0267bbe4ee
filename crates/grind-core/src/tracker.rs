//! Session tracker: the single writer over timer state.
//!
//! Owns the one engine instance, the accumulation buffer, the in-memory
//! mission list, the local snapshot store, and the external store handle.
//! Every tick and every user action funnels through here, so no two
//! mutations ever race. Store pushes are fire-and-forget; their failure
//! is logged and the local state stays authoritative.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::warn;

use crate::error::{CoreError, TaskError};
use crate::notify::Notifier;
use crate::storage::{Config, Database, TimerConfig};
use crate::store::{NewTask, TaskPatch, TaskStore};
use crate::task::{sort_urgent_first, Task};
use crate::timer::{
    recover, Accumulator, MainOutcome, PhaseSignal, SessionSnapshot, TimerEngine, SNAPSHOT_KEY,
    TICK_MS,
};

/// While running but not accumulating (break phases), persist the
/// snapshot every this many ticks (~1s) to bound loss to one second.
const IDLE_PERSIST_TICKS: u32 = 100;

pub struct Tracker {
    engine: TimerEngine,
    accumulator: Accumulator,
    tasks: Vec<Task>,
    db: Database,
    store: Arc<dyn TaskStore>,
    notifier: Arc<dyn Notifier>,
    ticks_since_persist: u32,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl Tracker {
    /// Startup sequence: fetch missions, roll over stale daily counters,
    /// recover the timer session from the local snapshot, apply offline
    /// catch-up accumulation, and persist the reconciled state.
    ///
    /// Runs before the tick source can be started. A missing or corrupt
    /// snapshot means a cold start with configuration defaults.
    pub fn load(
        db: Database,
        store: Arc<dyn TaskStore>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
    ) -> Result<Self, CoreError> {
        Self::load_at(db, store, notifier, config, now_ms(), today())
    }

    fn load_at(
        db: Database,
        store: Arc<dyn TaskStore>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
        now_ms: i64,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        let mut tasks = match store.list_all() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "failed to list missions from store, starting empty");
                Vec::new()
            }
        };

        // Day rollover happens before anything is displayed or resumed.
        for task in &mut tasks {
            if task.roll_over(today) {
                if let Err(e) = store.update(&task.id, &TaskPatch::rollover(today)) {
                    warn!(error = %e, task = %task.id, "day rollover push failed");
                }
            }
        }
        sort_urgent_first(&mut tasks);

        let snapshot = match db.kv_get(SNAPSHOT_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<SessionSnapshot>(&json) {
                Ok(snap) => Some(snap),
                Err(e) => {
                    warn!(error = %e, "corrupt session snapshot, cold start");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read session snapshot, cold start");
                None
            }
        };

        let engine = match snapshot {
            Some(snap) => {
                let recovered = recover(snap, now_ms);
                let mut engine = recovered.engine;
                if recovered.catch_up_secs > 0 {
                    if let Some(id) = engine.selected_task_id().map(str::to_owned) {
                        if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                            task.accumulate(recovered.catch_up_secs);
                            task.last_updated = today;
                            if let Err(e) = store.update(&id, &TaskPatch::counters(task)) {
                                warn!(error = %e, task = %id, "offline catch-up push failed");
                            }
                        }
                    }
                }
                // The selection must point at a live mission.
                if let Some(id) = engine.selected_task_id().map(str::to_owned) {
                    if !tasks.iter().any(|t| t.id == id) {
                        engine.stop();
                        engine.select_task(None, None);
                    }
                }
                engine
            }
            None => TimerEngine::new(config.timer.clone()),
        };

        let tracker = Self {
            engine,
            accumulator: Accumulator::new(),
            tasks,
            db,
            store,
            notifier,
            ticks_since_persist: 0,
        };
        tracker.persist();
        Ok(tracker)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.engine.selected_task_id().and_then(|id| self.task(id))
    }

    /// Seconds tracked across all missions today.
    pub fn total_today_secs(&self) -> u64 {
        self.tasks.iter().map(|t| t.today_duration).sum()
    }

    // ── Tick handling ────────────────────────────────────────────────

    /// Process one tick from the tick source.
    ///
    /// Serialized by ownership: the caller drains the tick channel from a
    /// single place, so no two ticks are ever in flight at once.
    pub fn handle_tick(&mut self) {
        if !self.engine.is_running() {
            return;
        }

        match self.engine.tick() {
            Some(PhaseSignal::WorkComplete) => self.notifier.work_complete(),
            Some(PhaseSignal::BreakComplete) => self.notifier.break_complete(),
            None => {}
        }

        if self.engine.accumulates() {
            let secs = self.accumulator.push(TICK_MS);
            if secs > 0 {
                let selected = self.engine.selected_task_id().map(str::to_owned);
                if let Some(id) = selected {
                    if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                        task.accumulate(secs);
                        task.last_updated = today();
                    }
                }
                self.persist();
                self.ticks_since_persist = 0;
            }
        } else {
            self.ticks_since_persist += 1;
            if self.ticks_since_persist >= IDLE_PERSIST_TICKS {
                self.persist();
                self.ticks_since_persist = 0;
            }
        }
    }

    // ── Mission actions ──────────────────────────────────────────────

    /// Create a mission in the store and the local list.
    /// Returns the store-assigned id.
    ///
    /// # Errors
    /// Rejects empty titles; propagates store failures (creation is the
    /// one store call that must succeed to mean anything).
    pub fn add_task(
        &mut self,
        title: &str,
        is_urgent: bool,
        deadline: Option<NaiveDate>,
    ) -> Result<String, CoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle.into());
        }
        let fields = NewTask::new(title.to_string(), is_urgent, deadline, today());
        let id = self.store.create(&fields)?;
        self.tasks.push(fields.into_task(id.clone()));
        sort_urgent_first(&mut self.tasks);
        Ok(id)
    }

    /// Delete a mission. If it is the selected one, selection is cleared
    /// and the timer stopped in the same operation -- no later tick can
    /// accumulate onto it.
    pub fn delete_task(&mut self, id: &str) -> Result<(), CoreError> {
        if self.task(id).is_none() {
            return Err(TaskError::UnknownTask(id.to_string()).into());
        }
        self.store.delete(id)?;
        self.tasks.retain(|t| t.id != id);
        if self.engine.selected_task_id() == Some(id) {
            self.engine.stop();
            self.engine.select_task(None, None);
            self.accumulator.reset();
        }
        self.persist();
        Ok(())
    }

    /// Mark a mission complete: delete it and fire the completion signal.
    pub fn complete_task(&mut self, id: &str) -> Result<(), CoreError> {
        self.delete_task(id)?;
        self.notifier.task_complete();
        Ok(())
    }

    /// Select the mission that receives accumulated time.
    pub fn select_task(&mut self, id: &str) -> Result<(), CoreError> {
        let today_secs = self
            .task(id)
            .map(|t| t.today_duration)
            .ok_or_else(|| TaskError::UnknownTask(id.to_string()))?;
        self.accumulator.reset();
        self.engine.select_task(Some(id.to_string()), Some(today_secs));
        self.persist();
        Ok(())
    }

    // ── Timer actions ────────────────────────────────────────────────

    /// Switch flow <-> pomodoro.
    pub fn toggle_mode(&mut self) {
        let was_running = self.engine.is_running();
        let today_secs = self.selected_task().map(|t| t.today_duration);
        self.engine.toggle_mode(today_secs);
        self.accumulator.reset();
        if was_running {
            self.push_selected_counters();
        }
        self.persist();
    }

    /// Skip to the next pomodoro phase.
    pub fn advance_phase(&mut self) {
        let was_running = self.engine.is_running();
        self.engine.advance_phase();
        self.accumulator.reset();
        if was_running {
            self.push_selected_counters();
        }
        self.persist();
    }

    /// The main play/pause action.
    ///
    /// # Errors
    /// Rejected with [`crate::error::TimerError::NoTaskSelected`] when no
    /// mission is selected; nothing is mutated.
    pub fn main_action(&mut self) -> Result<MainOutcome, CoreError> {
        let outcome = self.engine.main_action()?;
        self.accumulator.reset();
        if outcome == MainOutcome::Stopped {
            self.push_selected_counters();
        }
        self.persist();
        Ok(outcome)
    }

    /// Stop the timer if running, pushing counters to the store.
    pub fn stop(&mut self) {
        if !self.engine.is_running() {
            return;
        }
        self.engine.stop();
        self.accumulator.reset();
        self.push_selected_counters();
        self.persist();
    }

    /// Apply a saved timer configuration to the live session.
    pub fn save_config(&mut self, config: TimerConfig) -> Result<(), CoreError> {
        config.validate().map_err(CoreError::Config)?;
        self.engine.apply_config(config);
        self.persist();
        Ok(())
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Write the session snapshot to local durable storage.
    ///
    /// Failures are logged, never propagated: the in-memory state stays
    /// the source of truth and the next flush point retries naturally.
    pub fn persist(&self) {
        let snap = SessionSnapshot::capture(&self.engine, now_ms());
        match serde_json::to_string(&snap) {
            Ok(json) => {
                if let Err(e) = self.db.kv_set(SNAPSHOT_KEY, &json) {
                    warn!(error = %e, "session snapshot write failed");
                }
            }
            Err(e) => warn!(error = %e, "session snapshot serialize failed"),
        }
    }

    /// Push the selected mission's counters to the external store on a
    /// detached thread. Fire-and-forget: errors are logged and dropped.
    fn push_selected_counters(&self) {
        let Some(task) = self.selected_task().cloned() else {
            return;
        };
        let store = Arc::clone(&self.store);
        std::thread::spawn(move || {
            if let Err(e) = store.update(&task.id, &TaskPatch::counters(&task)) {
                warn!(error = %e, task = %task.id, "mission counter push failed");
            }
        });
    }
}
