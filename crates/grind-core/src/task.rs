//! Mission (task) model.
//!
//! A mission accumulates tracked seconds on two counters: an all-time
//! total and a per-calendar-day total that resets on the first load of a
//! new day. Field names serialize camelCase to match the store documents.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A user-defined unit of work to track time against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque id assigned by the external store.
    pub id: String,
    pub title: String,
    pub is_urgent: bool,
    /// Calendar deadline, only meaningful for urgent missions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    /// Cumulative seconds ever accumulated.
    pub total_duration: u64,
    /// Seconds accumulated on the current calendar day.
    pub today_duration: u64,
    /// Date of the last accumulation or day rollover.
    pub last_updated: NaiveDate,
}

/// How an urgent mission stands relative to its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    Overdue,
    DueToday,
    DaysLeft(u32),
}

impl Task {
    /// Add whole seconds to both counters.
    ///
    /// `today_duration <= total_duration` holds because both grow by the
    /// same amount and only `today_duration` ever resets.
    pub fn accumulate(&mut self, secs: u64) {
        self.total_duration += secs;
        self.today_duration += secs;
    }

    /// Reset the daily counter if the last update was on another day.
    /// Returns true when a reset happened (caller syncs the store).
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_updated == today {
            return false;
        }
        self.today_duration = 0;
        self.last_updated = today;
        true
    }

    pub fn deadline_status(&self, today: NaiveDate) -> Option<DeadlineStatus> {
        let deadline = self.deadline?;
        let days = (deadline - today).num_days();
        Some(if days < 0 {
            DeadlineStatus::Overdue
        } else if days == 0 {
            DeadlineStatus::DueToday
        } else {
            DeadlineStatus::DaysLeft(days as u32)
        })
    }
}

/// Sort urgent missions ahead of regular ones, keeping relative order
/// within each group.
pub fn sort_urgent_first(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| !t.is_urgent);
}
