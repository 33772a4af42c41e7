//! ormcheck CLI
//!
//! Command-line interface for the round-trip fidelity checker

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "ormcheck")]
#[command(about = "ormcheck - relational round-trip type-fidelity checker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the scenario suite against a backend
    Run(commands::run::RunArgs),
    /// Print CREATE TABLE statements for a dialect
    Ddl(commands::ddl::DdlArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Ddl(args) => commands::ddl::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
