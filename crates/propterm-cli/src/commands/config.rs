use clap::Subcommand;
use propterm_core::TimingConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a timing value
    Get {
        /// Config key (e.g. "completion_delay_ms", "countdown_initial_seconds")
        key: String,
    },
    /// Set a timing value and persist it
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all timing values
    List,
    /// Reset the timing configuration to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = TimingConfig::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = TimingConfig::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = TimingConfig::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            TimingConfig::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
