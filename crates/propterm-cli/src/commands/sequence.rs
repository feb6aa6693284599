use clap::Subcommand;
use propterm_core::{catalog, Event, Scheduler, StageSequencer, TimingConfig};

use super::common;

#[derive(Subcommand)]
pub enum SequenceAction {
    /// Play the scripted hacking cutscene in real time
    Play {
        /// Virtual-time speed multiplier (2.0 = twice as fast)
        #[arg(long, default_value = "1.0")]
        speed: f64,
        /// Render in danger mode (security-spike styling)
        #[arg(long)]
        danger: bool,
    },
    /// Print the stage script as JSON
    Script,
}

pub fn run(action: SequenceAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SequenceAction::Play { speed, danger } => {
            let config = TimingConfig::load()?;
            let scheduler = Scheduler::new();
            let sequencer = StageSequencer::with_completion_delay(
                scheduler.clone(),
                config.completion_delay_ms,
            );

            if danger {
                for line in catalog::DANGER_ALERT_LINES {
                    println!("{line}");
                }
            }
            let _control = sequencer.start_observed(
                catalog::hacking_stages(),
                move |event| render_event(event, danger),
                || println!("\nACCESS CHANNEL OPEN"),
            );
            common::drive_scaled(&scheduler, speed)?;
        }
        SequenceAction::Script => {
            let json = serde_json::to_string_pretty(&catalog::hacking_stages())?;
            println!("{json}");
        }
    }
    Ok(())
}

fn render_event(event: &Event, danger: bool) {
    match event {
        Event::StageEntered { title, effects, .. } => {
            if danger {
                println!("\n!! {title} !!");
            } else {
                println!("\n== {title} ==");
            }
            if effects.iter().any(|e| e == "firewall") {
                println!("{}", catalog::FIREWALL_ASCII);
            }
            if effects.iter().any(|e| e == "map") {
                println!("{}", catalog::KENYA_MAP_ASCII);
            }
        }
        Event::LogRevealed { line, .. } => println!("{line}"),
        _ => {}
    }
}
