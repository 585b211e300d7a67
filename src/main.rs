use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

mod config;
mod error;
mod gpa;
mod ledger;
mod models;
mod rank;
mod report;

use config::{Config, Roster};
use ledger::Ledger;
use models::RankedStudent;

#[derive(Parser)]
#[command(name = "cohort-ranker")]
#[command(about = "Semester GPA rank generator for a student cohort", long_about = None)]
struct Cli {
    /// Path to the run configuration
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print a summary
    CheckConfig,
    /// Compute the ranking and print the top students
    Rank {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Write both result analysis spreadsheets
    Export {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;

    match cli.command {
        Commands::CheckConfig => {
            let roster = config::load_roster(&config.roster_path, &config.course)
                .with_context(|| format!("failed to load roster {}", config.roster_path.display()))?;
            println!("Course {} with {} modules, {} total credits.", config.course, config.modules.len(), config.total_credits);
            for module in &config.modules {
                println!("- {} ({} credits)", module.id, module.credits);
            }
            println!(
                "Roster: {} students, indexes {}..={}.",
                roster.entries.len(),
                roster.index_start,
                roster.index_end
            );
        }
        Commands::Rank { limit } => {
            let (roster, _, ranked) = run_pipeline(&config)?;
            report::print_top(&ranked, &roster, limit);
        }
        Commands::Export { out_dir } => {
            let (roster, ledger, ranked) = run_pipeline(&config)?;
            let (compact, extended) = report::export(&out_dir, &config, &roster, &ledger, &ranked)?;
            println!("Report written to {}.", compact.display());
            println!("Report written to {}.", extended.display());
        }
    }

    Ok(())
}

fn run_pipeline(config: &Config) -> anyhow::Result<(Roster, Ledger, Vec<RankedStudent>)> {
    let roster = config::load_roster(&config.roster_path, &config.course)
        .with_context(|| format!("failed to load roster {}", config.roster_path.display()))?;
    let ledger = ledger::build(config, &roster)?;
    if ledger.available.is_empty() {
        bail!(
            "no module results sheets found in {}",
            config.results_dir.display()
        );
    }
    let scored = gpa::evaluate(&ledger, config);
    let ranked = rank::rank(scored, &config.scale);
    Ok((roster, ledger, ranked))
}
