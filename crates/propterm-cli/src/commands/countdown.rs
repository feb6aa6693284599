use clap::Subcommand;
use propterm_core::{CountdownSession, Event, Scheduler, TimingConfig};

use super::common;

#[derive(Subcommand)]
pub enum CountdownAction {
    /// Run the edit-session countdown to expiry
    Run {
        /// Session length in seconds (defaults to the configured value)
        #[arg(long)]
        seconds: Option<u32>,
    },
    /// Print the countdown configuration as JSON
    Status,
}

pub fn run(action: CountdownAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = TimingConfig::load()?;
    match action {
        CountdownAction::Run { seconds } => {
            let initial = seconds.unwrap_or(config.countdown_initial_seconds);
            let scheduler = Scheduler::new();
            let session = CountdownSession::with_grace(scheduler.clone(), config.grace_ms());

            session.start_observed(
                initial,
                |event| match event {
                    Event::CountdownTick {
                        remaining_seconds, ..
                    } => {
                        common::redraw_line(&format!(
                            "EDIT SESSION  {:02}:{:02}",
                            remaining_seconds / 60,
                            remaining_seconds % 60
                        ));
                        if *remaining_seconds == 0 {
                            println!();
                            println!("!!! SESSION EXPIRED");
                        }
                    }
                    Event::CountdownExpired { .. } => println!("SESSION CLOSED"),
                    _ => {}
                },
                || println!("AUTO-LOGOUT: RETURNING TO SPLASH"),
            );
            common::drive(&scheduler)?;
        }
        CountdownAction::Status => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
    }
    Ok(())
}
