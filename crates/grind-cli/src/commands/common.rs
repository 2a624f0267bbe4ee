//! Shared helpers for CLI commands.

use std::sync::Arc;

use grind_core::{
    Config, Database, HttpTaskStore, Notifier, SqliteTaskStore, TaskStore, Tracker,
};

pub type CliError = Box<dyn std::error::Error>;

/// Load config, open local storage, pick the store backend, and run the
/// startup/recovery sequence.
pub fn open_tracker() -> Result<Tracker, CliError> {
    let config = Config::load()?;
    let db = Database::open()?;
    let store: Arc<dyn TaskStore> = match &config.store.base_url {
        Some(url) => Arc::new(HttpTaskStore::new(url.clone())?),
        None => Arc::new(SqliteTaskStore::open()?),
    };
    let notifier = Arc::new(BellNotifier {
        enabled: config.notifications.enabled,
    });
    let tracker = Tracker::load(db, store, notifier, &config)?;
    Ok(tracker)
}

/// Rings the terminal bell on completion signals. An external hook can
/// watch stderr to play real sounds.
pub struct BellNotifier {
    pub enabled: bool,
}

impl Notifier for BellNotifier {
    fn work_complete(&self) {
        if self.enabled {
            eprintln!("\x07work phase complete -- overtime running");
        }
    }

    fn break_complete(&self) {
        if self.enabled {
            eprintln!("\x07break complete -- overtime running");
        }
    }

    fn task_complete(&self) {
        if self.enabled {
            eprintln!("\x07mission complete");
        }
    }
}

/// `h:mm:ss` above an hour, `mm:ss:cc` (centiseconds) below it.
pub fn format_clock_ms(ms: i64) -> String {
    let abs = ms.unsigned_abs();
    let h = abs / 3_600_000;
    let m = (abs % 3_600_000) / 60_000;
    let s = (abs % 60_000) / 1_000;
    let cs = (abs % 1_000) / 10;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}:{cs:02}")
    }
}

/// `hh:mm:ss` for whole-second durations.
pub fn format_duration_secs(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_below_an_hour_shows_centiseconds() {
        assert_eq!(format_clock_ms(0), "00:00:00");
        assert_eq!(format_clock_ms(1_500_000), "25:00:00");
        assert_eq!(format_clock_ms(61_230), "01:01:23");
    }

    #[test]
    fn clock_above_an_hour_drops_centiseconds() {
        assert_eq!(format_clock_ms(3_600_000), "1:00:00");
        assert_eq!(format_clock_ms(3_661_000), "1:01:01");
    }

    #[test]
    fn negative_values_format_as_magnitude() {
        assert_eq!(format_clock_ms(-1_000), "00:01:00");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration_secs(0), "00:00:00");
        assert_eq!(format_duration_secs(3_725), "01:02:05");
    }
}
