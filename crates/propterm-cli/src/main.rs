use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "propterm-cli", version, about = "Propterm CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scripted hacking cutscene
    Sequence {
        #[command(subcommand)]
        action: commands::sequence::SequenceAction,
    },
    /// Access panel authentication theater
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Mock results portal lookups
    Lookup {
        #[command(subcommand)]
        action: commands::lookup::LookupAction,
    },
    /// Exploit development lab
    Exploit {
        #[command(subcommand)]
        action: commands::exploit::ExploitAction,
    },
    /// Edit-session expiry countdown
    Countdown {
        #[command(subcommand)]
        action: commands::countdown::CountdownAction,
    },
    /// Manage the timing configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Sequence { action } => commands::sequence::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Lookup { action } => commands::lookup::run(action),
        Commands::Exploit { action } => commands::exploit::run(action),
        Commands::Countdown { action } => commands::countdown::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
