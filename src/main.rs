use clap::{Parser, Subcommand};
use ryg_report::cli;
use ryg_report::error::ReportResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ryg-report")]
#[command(about = "Red/Yellow/Green supply-balance reports from demand workbooks")]
#[command(long_about = "ryg-report - RYG supply-balance report generator

Reads a multi-sheet demand workbook, correlates demand rows with the model
reference sheet, and writes a consolidated status report: one block per
material group with supply/demand/balance projections over a rolling
26-week horizon, expressed partly as values and partly as formulas the
target spreadsheet application evaluates on open.

INPUT CONVENTIONS:
  Demanda          group key in column A (sorted), part number in column B,
                   per-model quantities in columns E..Z, model names in
                   row 2, week dates from column AA in row 1
  Info Referencia  model reference rows: id, name, risk, program,
                   APN PCBA, APN description

EXAMPLES:
  ryg-report generate demand.xlsm report.xlsx
  ryg-report generate demand.xlsm report.xlsx --verbose
  ryg-report validate demand.xlsm")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Generate the RYG report workbook.

Loads the demand workbook, builds the report sheet group by group, and
saves everything (data sheets plus the generated RYG sheet) to the output
path. Generation runs on a background worker by default; progress is
printed as each group completes.

The demand sheet must be sorted by group key: rows for a group are
consumed as one contiguous block and never rescanned.")]
    /// Generate the RYG report workbook
    Generate {
        /// Path to the demand workbook (.xlsx/.xlsm)
        input: PathBuf,

        /// Output workbook path (.xlsx)
        output: PathBuf,

        /// Show verbose steps
        #[arg(short, long)]
        verbose: bool,

        /// Run in the current thread instead of a background worker
        #[arg(long)]
        foreground: bool,
    },

    #[command(long_about = "Validate a demand workbook without writing output.

Checks that the required sheets exist and that the demand sheet holds at
least one material group under the expected column conventions. Exits
non-zero when the workbook would not produce a usable report.")]
    /// Check a demand workbook against the input conventions
    Validate {
        /// Path to the demand workbook (.xlsx/.xlsm)
        input: PathBuf,
    },
}

fn main() -> ReportResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            verbose,
            foreground,
        } => cli::generate(input, output, verbose, foreground),

        Commands::Validate { input } => cli::validate(input),
    }
}
