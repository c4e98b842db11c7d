//! NPS Analyzer - Survey analysis and report generation
//!
//! Loads a spreadsheet of survey responses, computes the Net Promoter Score
//! and writes the detractor report and the zone leaderboard as Excel files.
//!
//! Usage: nps-analyzer <analyze|detractors|leaderboard|report> -i <file>

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use nps_analyzer::leaderboard::DEFAULT_CHART_ZONES;
use nps_analyzer::pipeline::{
    generate_all, generate_detractor_report, generate_leaderboard, run_analysis, ReportConfig,
    ReportOutcome,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nps-analyzer")]
#[command(about = "Analyze NPS survey data and generate detractor and zone reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the report-writing commands.
#[derive(Args)]
struct ReportArgs {
    /// Input spreadsheet (.xlsx, .xls, .ods) or CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the exported reports
    #[arg(short, long, env = "NPS_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Number of zones in the leaderboard chart
    #[arg(long, env = "NPS_TOP_N", default_value_t = DEFAULT_CHART_ZONES)]
    top: usize,

    /// Also export each report as CSV
    #[arg(long)]
    csv: bool,
}

impl From<ReportArgs> for ReportConfig {
    fn from(args: ReportArgs) -> Self {
        ReportConfig {
            input: args.input,
            output_dir: args.output_dir,
            top_n: args.top,
            csv: args.csv,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the overall NPS and segment distribution
    Analyze {
        /// Input spreadsheet (.xlsx, .xls, .ods) or CSV file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Export detractor responses (score below 7), ordered by zone volume
    Detractors(ReportArgs),

    /// Rank zones by reclassified NPS and export the leaderboard
    Leaderboard(ReportArgs),

    /// Run the analysis and generate both reports
    Report(ReportArgs),
}

fn print_outcome(outcome: &ReportOutcome) {
    println!("{}", outcome.message);
    for file in &outcome.files {
        println!("  -> {}", file.display());
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { input } => {
            print!("{}", run_analysis(&input)?);
        }
        Commands::Detractors(args) => {
            let config = ReportConfig::from(args);
            print_outcome(&generate_detractor_report(&config)?);
        }
        Commands::Leaderboard(args) => {
            let config = ReportConfig::from(args);
            let (outcome, table) = generate_leaderboard(&config)?;
            print!("{}", table);
            print_outcome(&outcome);
        }
        Commands::Report(args) => {
            let config = ReportConfig::from(args);
            print!("{}", generate_all(&config)?);
        }
    }

    Ok(())
}
