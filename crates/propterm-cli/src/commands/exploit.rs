use clap::Subcommand;
use propterm_core::{catalog, Event, Scheduler, StageSequencer};

use super::common;

#[derive(Subcommand)]
pub enum ExploitAction {
    /// Run the sandboxed exploit feed
    Run,
    /// List the exploit feed script
    Script,
}

pub fn run(action: ExploitAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ExploitAction::Run => {
            let stage = catalog::exploit_run_stage();
            let total = stage.log_lines.len() as f64;

            let scheduler = Scheduler::new();
            let sequencer = StageSequencer::new(scheduler.clone());

            let mut delivered = 0.0;
            sequencer.start_observed(
                vec![stage],
                move |event| match event {
                    Event::StageEntered { title, .. } => println!("== {title} =="),
                    Event::LogRevealed { line, .. } => {
                        delivered += 1.0;
                        println!("{line}  ({:.0}%)", delivered / total * 100.0);
                    }
                    _ => {}
                },
                || println!("SANDBOX RUN COMPLETE"),
            );
            common::drive(&scheduler)?;
        }
        ExploitAction::Script => {
            for line in catalog::exploit_run_lines() {
                println!("{line}");
            }
        }
    }
    Ok(())
}
