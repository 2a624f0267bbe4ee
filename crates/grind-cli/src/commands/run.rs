//! Foreground tracking loop.
//!
//! Loads the tracker (running snapshot recovery), starts the tick source,
//! and drains the tick channel until interrupted or the `--seconds` budget
//! runs out. The final snapshot is written without stopping the timer, so
//! a later `run` resumes through recovery as if the process never exited.

use grind_core::{Ticker, TICK_MS};
use tracing::info;

use super::common::{format_clock_ms, open_tracker, CliError};

pub fn run(seconds: Option<u64>) -> Result<(), CliError> {
    let mut tracker = open_tracker()?;

    let engine = tracker.engine();
    info!(
        mode = ?engine.mode(),
        phase = ?engine.phase(),
        running = engine.is_running(),
        "session loaded"
    );
    println!(
        "tracking ({}), ctrl-c to detach",
        format_clock_ms(engine.remaining_ms())
    );

    let (mut ticker, rx) = Ticker::new();
    ticker.start();

    let tick_budget = seconds.map(|s| s * (1000 / TICK_MS));
    let mut ticks: u64 = 0;

    for _ in rx.iter() {
        tracker.handle_tick();
        ticks += 1;
        if let Some(budget) = tick_budget {
            if ticks >= budget {
                break;
            }
        }
    }

    ticker.stop();
    // Leave is_running untouched: recovery credits the gap on next start.
    tracker.persist();
    println!("detached at {}", format_clock_ms(tracker.engine().remaining_ms()));
    Ok(())
}
