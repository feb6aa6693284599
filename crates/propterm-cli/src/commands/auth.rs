use clap::Subcommand;
use propterm_core::{catalog, ProgressSimulator, Scheduler, TimingConfig};

use super::common;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Run an authentication attempt against the access terminal
    Attempt {
        /// Override code to try
        code: String,
        /// Attempt number, for the escalating denial messages
        #[arg(long, default_value = "1")]
        attempt: u32,
    },
    /// List the advertised override codes
    Codes,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Attempt { code, attempt } => attempt_access(&code, attempt),
        AuthAction::Codes => {
            for code in catalog::FAKE_CODES {
                println!("{code}");
            }
            Ok(())
        }
    }
}

fn attempt_access(code: &str, attempt: u32) -> Result<(), Box<dyn std::error::Error>> {
    let config = TimingConfig::load()?;
    let scheduler = Scheduler::new();
    let simulator = ProgressSimulator::new(scheduler.clone());

    println!("> INITIALIZING PANDA TECH AUTH ENGINE…");
    println!("> Running AUTH_SEQ_{:02}…", attempt.min(99));
    scheduler.arm_once(500, || {});
    common::drive(&scheduler)?;

    // Each phase settles at its target before the next begins; the shown
    // value only ever moves forward across phases.
    let mut shown: f64 = 0.0;
    for phase in catalog::auth_phases() {
        let floor = shown;
        let control = simulator.run_to_with_steps(
            phase.target_pct,
            phase.duration_ms,
            move |value| common::redraw_line(&common::progress_bar(value.max(floor))),
            config.progress_step_count,
        );
        common::drive(&scheduler)?;
        shown = shown.max(control.value());
        println!();
        println!("{}", phase.log);
    }

    scheduler.arm_once(300, || {});
    common::drive(&scheduler)?;

    if code.trim().eq_ignore_ascii_case(catalog::CORRECT_CODE) {
        common::redraw_line(&common::progress_bar(100.0));
        println!();
        println!("> OVERRIDE KEY ACCEPTED");
        println!("> AUTHENTICATION SUCCESSFUL");
        println!("ACCESS GRANTED");
    } else {
        for line in catalog::denial_lines(attempt.max(1)) {
            println!("{line}");
        }
        println!("ACCESS DENIED");
    }
    Ok(())
}
