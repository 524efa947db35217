//! Configuration commands for CLI.

use clap::Subcommand;
use habitual_core::{Config, ConfigError};

use super::print_json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value
    Get {
        /// Dotted key, e.g. "clock.utc_offset_minutes" or "owner.default_owner"
        key: String,
    },
    /// Change one value (validated before it is written)
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Print the whole configuration as JSON
    List,
    /// Overwrite the file with defaults
    Reset,
    /// Print the location of the config file
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            let previous = config.get(&key).ok_or_else(|| ConfigError::UnknownKey(key.clone()))?;
            config.set(&key, &value)?;
            let current = config.get(&key).unwrap_or(value);
            tracing::info!(%key, %previous, %current, "config updated");
            if key == "clock.utc_offset_minutes" {
                eprintln!("Dates are now evaluated at UTC offset {}", config.utc_offset());
            }
            eprintln!("{key}: {previous} -> {current}");
        }
        ConfigAction::List => print_json(&Config::load()?)?,
        ConfigAction::Reset => {
            Config::default().save()?;
            eprintln!("Config reset to defaults at {}", Config::path()?.display());
        }
        ConfigAction::Path => println!("{}", Config::path()?.display()),
    }
    Ok(())
}
