//! Shared wall-clock driver for the playback commands.
//!
//! The core scheduler runs on virtual time; playback sleeps until the next
//! timer deadline, then advances the virtual clock to it, until no timers
//! remain. All callbacks still execute on this one thread, in deadline
//! order, exactly as they do under simulated time in tests.

use std::io::Write;
use std::time::Duration;

use propterm_core::Scheduler;

/// Pump the scheduler to completion at real-time speed.
pub fn drive(scheduler: &Scheduler) -> Result<(), Box<dyn std::error::Error>> {
    drive_scaled(scheduler, 1.0)
}

/// Pump the scheduler to completion, with virtual time running at `speed`
/// times real time (2.0 plays a cutscene twice as fast).
pub fn drive_scaled(
    scheduler: &Scheduler,
    speed: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let speed = if speed > 0.0 { speed } else { 1.0 };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(async {
        while let Some(deadline) = scheduler.next_deadline_ms() {
            let now = scheduler.now_ms();
            if deadline > now {
                let wait_ms = (deadline - now) as f64 / speed;
                tokio::time::sleep(Duration::from_millis(wait_ms as u64)).await;
            }
            scheduler.advance_to(deadline);
        }
    });
    Ok(())
}

/// Render a fixed-width progress bar in the access panel's style.
pub fn progress_bar(value: f64) -> String {
    let filled = (value / 7.0).floor().clamp(0.0, 14.0) as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "■".repeat(filled),
        "□".repeat(14 - filled),
        value
    )
}

/// Redraw a single status line in place.
pub fn redraw_line(line: &str) {
    print!("\r{line}");
    let _ = std::io::stdout().flush();
}
