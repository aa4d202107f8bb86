use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use sector_report::cli;
use sector_report::config::CompanyJob;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sector-report")]
#[command(about = "Group cellular sector exports by tower and write a styled Excel report")]
#[command(long_about = "Sector Report - tower-level Excel report from per-company sector CSV exports

Every input row is one sector of a tower. Rows sharing a record_id are merged
into one row per tower: per-tower fields come from the first row, per-sector
fields are joined in file order, and LTE / 5G bandwidth is summed.

COMMANDS:
  process  - One company CSV into one sheet of a workbook
  batch    - Several companies from a YAML batch file into one workbook
  inspect  - Dry run: tower counts, totals and inconsistent towers

EXAMPLES:
  sector-report process rogers.csv --company Rogers \\
      --licensee \"Rogers Communications Canada Inc.\" --province QC --workbook report.xlsx
  sector-report batch companies.yaml
  sector-report inspect telus.csv --json")]
#[command(version)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Process one company export into one worksheet.

The workbook is created when missing. Sheets already in it are kept; a sheet
with the same name is replaced. The header row is styled dark blue with white
bold text.

EXAMPLE:
  sector-report process \"TELUS sectors.csv\" --company TELUS --licensee TELUS \\
      --province QC --workbook Telecom_Data.xlsx")]
    /// Process one company CSV into a workbook sheet
    Process {
        /// Company sector export (.csv)
        input: PathBuf,

        /// Company display name (default sheet name)
        #[arg(long)]
        company: String,

        /// Licensee written on every row
        #[arg(long)]
        licensee: String,

        /// Province code written on every row
        #[arg(long)]
        province: String,

        /// Destination sheet name (defaults to the company name)
        #[arg(long)]
        sheet: Option<String>,

        /// Destination workbook (.xlsx)
        #[arg(short, long)]
        workbook: PathBuf,

        /// Fail when a tower's rows disagree on per-tower fields
        #[arg(long)]
        strict: bool,
    },

    #[command(long_about = "Process every company listed in a YAML batch file.

BATCH FILE:
  workbook: Telecom_Data.xlsx
  companies:
    - input: Rogers sectors.csv
      company: Rogers
      licensee: Rogers Communications Canada Inc.
      province: QC
    - input: TELUS sectors.csv
      company: TELUS
      licensee: TELUS
      province: QC
      sheet: TELUS

Companies run in order. If one fails, sheets of the companies before it are
still saved and the run stops.")]
    /// Process all companies from a YAML batch file
    Batch {
        /// Batch file (.yaml)
        config: PathBuf,

        /// Fail when a tower's rows disagree on per-tower fields
        #[arg(long)]
        strict: bool,
    },

    /// Dry run one company CSV without writing a workbook
    Inspect {
        /// Company sector export (.csv)
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Process {
            input,
            company,
            licensee,
            province,
            sheet,
            workbook,
            strict,
        } => {
            let context = format!("processing {}", input.display());
            let job = CompanyJob {
                input,
                company,
                licensee,
                province,
                sheet,
            };
            cli::process(job, workbook, strict).context(context)
        }

        Commands::Batch { config, strict } => {
            let context = format!("running batch {}", config.display());
            cli::batch(config, strict).context(context)
        }

        Commands::Inspect { input, json } => {
            let context = format!("inspecting {}", input.display());
            cli::inspect(input, json).context(context)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "❌ Error:".red().bold(), e);
        std::process::exit(1);
    }
}
