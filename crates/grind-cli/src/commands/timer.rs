//! Timer control commands.

use clap::Subcommand;
use grind_core::{MainOutcome, Phase, SessionSnapshot, TimerMode};

use super::common::{format_clock_ms, open_tracker, CliError};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print the current timer state
    Status {
        /// Emit the session snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start, pause, or advance out of overtime (the main button)
    Toggle,
    /// Switch between pomodoro and flow mode
    Mode,
    /// Skip to the next pomodoro phase
    Skip,
    /// Stop the timer
    Stop,
}

fn phase_label(mode: TimerMode, phase: Phase) -> &'static str {
    match (mode, phase) {
        (TimerMode::Flow, _) => "flow",
        (_, Phase::Work) => "work",
        (_, Phase::ShortBreak) => "short break",
        (_, Phase::LongBreak) => "long break",
    }
}

pub fn run(action: TimerAction) -> Result<(), CliError> {
    let mut tracker = open_tracker()?;

    match action {
        TimerAction::Status { json } => {
            let engine = tracker.engine();
            if json {
                let snap =
                    SessionSnapshot::capture(engine, chrono::Utc::now().timestamp_millis());
                println!("{}", serde_json::to_string_pretty(&snap)?);
                return Ok(());
            }
            let state = if !engine.is_running() {
                "stopped"
            } else if engine.is_overtime() {
                "overtime"
            } else {
                "running"
            };
            println!(
                "{} [{}] {} (session {}/{})",
                format_clock_ms(engine.remaining_ms()),
                phase_label(engine.mode(), engine.phase()),
                state,
                engine.session_count(),
                engine.config().interval,
            );
            match tracker.selected_task() {
                Some(task) => println!("mission: {}", task.title),
                None => println!("mission: none selected"),
            }
        }
        TimerAction::Toggle => {
            let outcome = tracker.main_action()?;
            match outcome {
                MainOutcome::Started => println!("timer started"),
                MainOutcome::Stopped => println!("timer stopped"),
                MainOutcome::AdvancedAndStarted(phase) => {
                    println!(
                        "advanced to {}, timer started",
                        phase_label(TimerMode::Pomodoro, phase)
                    );
                }
            }
        }
        TimerAction::Mode => {
            tracker.toggle_mode();
            match tracker.engine().mode() {
                TimerMode::Flow => println!("mode: flow"),
                TimerMode::Pomodoro => println!("mode: pomodoro"),
            }
        }
        TimerAction::Skip => {
            tracker.advance_phase();
            let engine = tracker.engine();
            println!(
                "phase: {} ({})",
                phase_label(engine.mode(), engine.phase()),
                format_clock_ms(engine.remaining_ms())
            );
        }
        TimerAction::Stop => {
            tracker.stop();
            println!("timer stopped");
        }
    }

    Ok(())
}
