//! Notification collaborator.
//!
//! Three fire-and-forget signals consumed by an external audio/alert
//! mechanism. The core only invokes them at the right transition points;
//! completions missed while the app was closed are never replayed.

/// Downstream sink for completion signals.
pub trait Notifier: Send + Sync {
    /// A pomodoro work phase hit zero.
    fn work_complete(&self);
    /// A pomodoro break phase hit zero.
    fn break_complete(&self);
    /// A mission was marked complete.
    fn task_complete(&self);
}

/// Notifier that drops every signal.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn work_complete(&self) {}
    fn break_complete(&self) {}
    fn task_complete(&self) {}
}
