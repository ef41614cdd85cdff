use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use youth_transition::{logging, run_cleaning, Analysis, DataConfig, DataStore};

#[derive(Parser)]
#[command(name = "youth-transition")]
#[command(about = "Clean and summarise UIDAI biometric, demographic and enrolment extracts")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    data: DataConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize state names in the raw extracts and write the cleaned snapshot
    Clean,
    /// Print the overview statistics as JSON
    Report,
}

fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Clean => run_clean(&cli.data),
        Commands::Report => run_report(&cli.data),
    }
}

fn run_clean(config: &DataConfig) -> Result<()> {
    println!("{}", "=".repeat(80));
    println!("DATA CLEANING - STANDARDIZING STATE NAMES");
    println!("{}", "=".repeat(80));

    let paths = config.paths();
    let report = run_cleaning(&paths)?;
    print!("{}", report);

    println!("\n{}", "=".repeat(80));
    println!("✅ DATA CLEANING COMPLETE!");
    println!("{}", "=".repeat(80));
    println!("\nCleaned data saved to: {}", paths.cleaned_dir.display());
    println!("Start the server with --source cleaned (or auto) to use it.");

    Ok(())
}

fn run_report(config: &DataConfig) -> Result<()> {
    let paths = config.paths();
    let source = config.resolve_source(&paths);
    let store = DataStore::new(source, paths);

    let data = store.datasets().context("Failed to load datasets")?;
    let analysis = Analysis::compute(data);
    let today = chrono::Local::now().date_naive();
    let overview = youth_transition::overview(data, &analysis, today)?;

    println!("{}", serde_json::to_string_pretty(&overview)?);
    Ok(())
}
