//! Mission management commands.

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use grind_core::DeadlineStatus;

use super::common::{format_duration_secs, open_tracker, CliError};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new mission
    Add {
        /// Mission title
        title: String,
        /// Mark as urgent (sorts to the top)
        #[arg(long)]
        urgent: bool,
        /// Deadline date, YYYY-MM-DD
        #[arg(long)]
        deadline: Option<NaiveDate>,
    },
    /// List missions, urgent first
    List {
        /// Emit the mission list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Select the mission that receives tracked time
    Select {
        /// Mission ID
        id: String,
    },
    /// Delete a mission
    Delete {
        /// Mission ID
        id: String,
    },
    /// Mark a mission complete and remove it
    Complete {
        /// Mission ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), CliError> {
    let mut tracker = open_tracker()?;

    match action {
        TaskAction::Add {
            title,
            urgent,
            deadline,
        } => {
            let id = tracker.add_task(&title, urgent, deadline)?;
            println!("mission created: {id}");
        }
        TaskAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(tracker.tasks())?);
                return Ok(());
            }
            if tracker.tasks().is_empty() {
                println!("no missions");
                return Ok(());
            }
            let today = Utc::now().date_naive();
            let selected = tracker.engine().selected_task_id().map(str::to_owned);
            for task in tracker.tasks() {
                let marker = if selected.as_deref() == Some(task.id.as_str()) {
                    '>'
                } else {
                    ' '
                };
                let urgent = if task.is_urgent { " [urgent]" } else { "" };
                let deadline = match task.deadline_status(today) {
                    Some(DeadlineStatus::Overdue) => " (overdue)".to_string(),
                    Some(DeadlineStatus::DueToday) => " (due today)".to_string(),
                    Some(DeadlineStatus::DaysLeft(d)) => format!(" ({d}d left)"),
                    None => String::new(),
                };
                println!(
                    "{marker} {}  {}{urgent}{deadline}  today {} / total {}",
                    task.id,
                    task.title,
                    format_duration_secs(task.today_duration),
                    format_duration_secs(task.total_duration),
                );
            }
            println!(
                "today across all missions: {}",
                format_duration_secs(tracker.total_today_secs())
            );
        }
        TaskAction::Select { id } => {
            tracker.select_task(&id)?;
            println!("mission selected: {id}");
        }
        TaskAction::Delete { id } => {
            tracker.delete_task(&id)?;
            println!("mission deleted: {id}");
        }
        TaskAction::Complete { id } => {
            tracker.complete_task(&id)?;
            println!("mission complete: {id}");
        }
    }

    Ok(())
}
