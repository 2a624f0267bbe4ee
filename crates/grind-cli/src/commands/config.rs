//! Configuration commands.

use clap::Subcommand;
use grind_core::Config;

use super::common::{open_tracker, CliError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration as TOML
    Show,
    /// Get a value by dot-separated key (e.g. timer.work)
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a value by dot-separated key and persist
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {value}");
            // Timer duration changes take effect in the saved session too,
            // so the next recovery resumes with the new durations.
            if key.starts_with("timer.") {
                let mut tracker = open_tracker()?;
                tracker.save_config(config.timer.clone())?;
            }
        }
    }

    Ok(())
}
