use clap::Subcommand;
use propterm_core::{
    catalog, Event, MockIntel, ProgressSimulator, Scheduler, StageSequencer,
};

use super::common;

#[derive(Subcommand)]
pub enum LookupAction {
    /// Query a results year of an examination
    Year {
        /// Examination code (e.g. KCSE)
        exam: String,
        /// Results year
        year: i32,
        /// Seed for reproducible mock statistics
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Query a school's mock exam data
    School {
        /// School code (e.g. ALH-001) or name fragment
        code: String,
    },
    /// List the examination catalog
    Exams,
    /// List the mock national school list
    Schools,
}

pub fn run(action: LookupAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        LookupAction::Year { exam, year, seed } => query_year(&exam, year, seed),
        LookupAction::School { code } => query_school(&code),
        LookupAction::Exams => {
            let json = serde_json::to_string_pretty(&catalog::exam_types())?;
            println!("{json}");
            Ok(())
        }
        LookupAction::Schools => {
            let json = serde_json::to_string_pretty(&catalog::schools())?;
            println!("{json}");
            Ok(())
        }
    }
}

fn query_year(exam: &str, year: i32, seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(exam) = catalog::find_exam(exam) else {
        return Err(format!("unknown examination: {exam}").into());
    };
    if !(catalog::RESULT_YEAR_MIN..=catalog::RESULT_YEAR_MAX).contains(&year) {
        return Err(format!(
            "year out of range ({}-{})",
            catalog::RESULT_YEAR_MIN,
            catalog::RESULT_YEAR_MAX
        )
        .into());
    }

    println!("Accessing {} {} Results...", exam.code, year);
    println!("Querying Mock Database...");

    let scheduler = Scheduler::new();
    let simulator = ProgressSimulator::new(scheduler.clone());
    simulator.run_to_observed(100.0, 1500, |event| {
        if let Event::ProgressStepped { value, .. } = event {
            common::redraw_line(&common::progress_bar(*value));
        }
    });
    common::drive(&scheduler)?;
    println!();

    if year == catalog::UNRELEASED_YEAR {
        println!("RESULTS NOT READY");
        println!("{} {} results have not been released yet.", exam.code, year);
        return Ok(());
    }

    let mut intel = match seed {
        Some(seed) => MockIntel::new(seed),
        None => MockIntel::from_entropy(),
    };
    let summary = intel.year_summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!("(MOCK DATA - FOR MOVIE USE ONLY)");
    Ok(())
}

fn query_school(code: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(school) = catalog::find_school(code) else {
        return Err(format!("unknown school: {code}").into());
    };

    let scheduler = Scheduler::new();
    let sequencer = StageSequencer::new(scheduler.clone());
    sequencer.start_observed(
        vec![catalog::school_query_stage(&school)],
        |event| {
            if let Event::LogRevealed { line, .. } = event {
                println!("{line}");
            }
        },
        || {},
    );
    common::drive(&scheduler)?;
    Ok(())
}
