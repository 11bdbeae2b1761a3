// stocksync CLI - supplier stock, cost and price sync for a product export

mod exit_codes;
mod sync;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "stocksync")]
#[command(about = "Sync stock flags, costs and prices from supplier lists into a product export")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the product export against both supplier lists
    #[command(after_help = "\
Writes <prefix>_<YYYYmmdd_HHMMSS>.csv with only the rows whose quantity or
cost changed, plus duplicates_report.csv when supplier A repeats a code.
Inputs may be CSV/TXT/TSV (delimiter detected) or XLS/XLSX/ODS.

Examples:
  stocksync run --target products.csv --supplier-a stocklist.xls --supplier-b bbr.csv
  stocksync run --target products.csv --supplier-a a.csv --supplier-b b.csv --markup markup.txt
  stocksync run --target products.csv --supplier-a a.csv --supplier-b b.csv --out-dir exports/ --json
  RUST_LOG=stocksync_recon=info stocksync run --target p.csv --supplier-a a.csv --supplier-b b.csv -q")]
    Run {
        /// Product export to correct
        #[arg(long)]
        target: PathBuf,

        /// Supplier A stock list (trademark + code columns)
        #[arg(long)]
        supplier_a: PathBuf,

        /// Supplier B stock list (code + residual quantity)
        #[arg(long)]
        supplier_b: PathBuf,

        /// Tab-separated brand markup table for supplier A prices
        #[arg(long, env = "STOCKSYNC_MARKUP", default_value = "markup.txt")]
        markup: PathBuf,

        /// TOML config overriding column names, trademarks and markups
        #[arg(long, env = "STOCKSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// Directory for the update file and duplicate report
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Print a JSON summary to stdout
        #[arg(long)]
        json: bool,

        /// Do not print the run log
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Check a config file without running
    #[command(after_help = "\
Examples:
  stocksync validate sync.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },

    /// List the trademarks accepted from supplier A
    #[command(after_help = "\
Examples:
  stocksync trademarks
  stocksync trademarks --config sync.toml --json")]
    Trademarks {
        /// TOML config whose [trademarks] list replaces the built-in one
        #[arg(long, env = "STOCKSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Run {
            target,
            supplier_a,
            supplier_b,
            markup,
            config,
            out_dir,
            json,
            quiet,
        } => sync::cmd_run(sync::RunArgs {
            target,
            supplier_a,
            supplier_b,
            markup,
            config,
            out_dir,
            json,
            quiet,
        }),
        Commands::Validate { config } => sync::cmd_validate(config),
        Commands::Trademarks { config, json } => sync::cmd_trademarks(config, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Diagnostics go to stderr and are off unless `RUST_LOG` asks for them;
/// the run log itself is printed by the command.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
