// Stocktake CLI - product catalog reconciled from delimited files

mod exit_codes;
mod menu;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use stocktake_config::Settings;
use stocktake_core::normalize::{parse_date, parse_name, parse_price, parse_quantity};
use stocktake_core::{Candidate, ParseError, ProductId, Store, StoreError};
use stocktake_io::{IoError, SqliteStore};
use stocktake_recon::{reconcile, snapshot};

use exit_codes::{
    io_exit_code, store_exit_code, EXIT_ERROR, EXIT_IMPORT_ROW_FAILURES, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "stocktake")]
#[command(about = "Product catalog kept in sync with delimited files (last write wins)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// SQLite store to open (overrides store.path in settings)
    #[arg(long, global = true, env = "STOCKTAKE_DB")]
    db: Option<PathBuf>,

    /// Settings file (default: <config dir>/stocktake/settings.json)
    #[arg(long, global = true, env = "STOCKTAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Log every reconciliation decision to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a delimited file into the store (exit 6 if any row was rejected)
    #[command(after_help = "\
The header row must name product_name, product_price, product_quantity and
date_updated. For each name the row with the newest date_updated wins; older
rows are ignored and malformed rows are reported without stopping the import.

Examples:
  stocktake import inventory.csv
  stocktake import inventory.tsv --delimiter $'\\t'
  stocktake import inventory.csv --json | jq .failures")]
    Import {
        /// File to import
        file: PathBuf,

        /// Field delimiter (default: import.delimiter from settings)
        #[arg(long)]
        delimiter: Option<char>,

        /// Print the import summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show one product by id
    View {
        /// Product id
        id: i64,

        /// Print the product as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add or update a product by name (kept only if not older than the stored value)
    #[command(after_help = "\
Examples:
  stocktake add --name 'Widget - Economy' --price '$12.50' --quantity 3
  stocktake add --name Gizmo --price 4 --quantity 10 --date 01/02/2020")]
    Add {
        /// Product name (identity key)
        #[arg(long)]
        name: String,

        /// Price, e.g. $12.50
        #[arg(long, allow_hyphen_values = true)]
        price: String,

        /// Quantity on hand
        #[arg(long, allow_hyphen_values = true)]
        quantity: String,

        /// Date of this value, MM/DD/YYYY (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write every product to a backup file
    #[command(after_help = "\
Examples:
  stocktake backup
  stocktake backup -o nightly.csv
  stocktake backup -o - | head -5")]
    Backup {
        /// Output file, or - for stdout (default: backup.path from settings)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Field delimiter (default: import.delimiter from settings)
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Interactive menu (default when no command is given)
    Menu,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nbuild:   ", env!("BUILD_PROFILE"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let result = run(cli, settings);

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

fn run(cli: Cli, settings: Settings) -> Result<(), CliError> {
    let db_path = cli.db.clone().unwrap_or_else(|| settings.store_path.clone());
    let mut store = open_store(&db_path)?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Import { file, delimiter, json } => {
            let delimiter = delimiter_byte(delimiter, &settings)?;
            cmd_import(&mut store, &file, delimiter, json)
        }
        Commands::View { id, json } => cmd_view(&store, id, json),
        Commands::Add { name, price, quantity, date, json } => {
            cmd_add(&mut store, &name, &price, &quantity, date.as_deref(), json)
        }
        Commands::Backup { output, delimiter } => {
            let delimiter = delimiter_byte(delimiter, &settings)?;
            let output = output.unwrap_or_else(|| settings.backup_path.clone());
            cmd_backup(&store, &output, delimiter)
        }
        Commands::Menu => cmd_menu(&mut store, &settings),
    }
}

/// Library crates log through `log`; the subscriber's log bridge picks them up.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("STOCKTAKE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Ignore failure: a subscriber may already be installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn open_store(path: &Path) -> Result<SqliteStore, CliError> {
    log::debug!("opening store {}", path.display());
    SqliteStore::open(path).map_err(|e| {
        CliError::store(e).with_hint(format!("check that {} is a stocktake store", path.display()))
    })
}

fn delimiter_byte(flag: Option<char>, settings: &Settings) -> Result<u8, CliError> {
    match flag {
        Some(c) if c.is_ascii() => Ok(c as u8),
        Some(c) => Err(CliError::args(format!("delimiter must be a single ASCII character, got {c:?}"))),
        None => settings.delimiter_byte().map_err(CliError::args),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(err: ParseError) -> Self {
        Self { code: EXIT_PARSE, message: err.to_string(), hint: None }
    }

    pub fn store(err: StoreError) -> Self {
        Self { code: store_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Create error from a file-level import/backup failure with proper exit code.
    pub fn file(err: IoError) -> Self {
        let code = io_exit_code(&err);
        let hint = match &err {
            IoError::MissingColumn { .. } => {
                Some("header must name product_name, product_price, product_quantity, date_updated".to_string())
            }
            IoError::Csv(_) => Some("is --delimiter set correctly for this file?".to_string()),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    })
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io(e.to_string())
    }
}

// ============================================================================
// import
// ============================================================================

fn cmd_import(store: &mut SqliteStore, file: &Path, delimiter: u8, json: bool) -> Result<(), CliError> {
    let summary = stocktake_io::csv::import(store, file, delimiter).map_err(CliError::file)?;

    if json {
        println!("{}", to_json(&summary)?);
    }

    // Human summary to stderr
    eprintln!(
        "import: {} rows, {} created, {} updated, {} ignored (stale), {} failed",
        summary.rows, summary.created, summary.updated, summary.ignored, summary.failed,
    );
    for failure in &summary.failures {
        match &failure.name {
            Some(name) => eprintln!("  line {} ({}): {}", failure.line, name, failure.error),
            None => eprintln!("  line {}: {}", failure.line, failure.error),
        }
    }

    if !summary.is_clean() {
        return Err(CliError {
            code: EXIT_IMPORT_ROW_FAILURES,
            message: format!("{} of {} rows rejected", summary.failed, summary.rows),
            hint: None,
        });
    }
    Ok(())
}

// ============================================================================
// view
// ============================================================================

fn cmd_view(store: &SqliteStore, id: i64, json: bool) -> Result<(), CliError> {
    let product = store.get(ProductId(id)).map_err(CliError::store)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        writeln!(out, "{}", to_json(&product)?)?;
    } else {
        write!(out, "{}", menu::render_product(&product))?;
    }
    Ok(())
}

// ============================================================================
// add
// ============================================================================

fn cmd_add(
    store: &mut SqliteStore,
    name: &str,
    price: &str,
    quantity: &str,
    date: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let candidate = Candidate {
        name: parse_name(name).map_err(CliError::parse)?,
        price_cents: parse_price(price).map_err(CliError::parse)?,
        quantity: parse_quantity(quantity).map_err(CliError::parse)?,
        updated_at: match date {
            Some(text) => parse_date(text).map_err(CliError::parse)?,
            None => menu::today(),
        },
    };

    let outcome = reconcile(store, &candidate).map_err(CliError::store)?;
    let product = store.get(outcome.id()).map_err(CliError::store)?;

    if json {
        println!("{}", to_json(&serde_json::json!({ "outcome": outcome, "product": product }))?);
    } else {
        println!("{}", outcome);
    }
    Ok(())
}

// ============================================================================
// backup
// ============================================================================

fn cmd_backup(store: &SqliteStore, output: &Path, delimiter: u8) -> Result<(), CliError> {
    if output == Path::new("-") {
        let rows = snapshot(store).map_err(CliError::store)?;
        let stdout = io::stdout();
        stocktake_io::csv::write_backup(&rows, stdout.lock(), delimiter).map_err(CliError::file)?;
        return Ok(());
    }

    let count = stocktake_io::csv::export(store, output, delimiter).map_err(CliError::file)?;
    eprintln!("backed up {} products to {}", count, output.display());
    Ok(())
}

// ============================================================================
// menu
// ============================================================================

fn cmd_menu(store: &mut SqliteStore, settings: &Settings) -> Result<(), CliError> {
    let delimiter = settings.delimiter_byte().map_err(CliError::args)?;

    if let Some(seed) = settings.seed_on_start().filter(|p| p.exists()) {
        let summary = stocktake_io::csv::import(store, seed, delimiter).map_err(CliError::file)?;
        eprintln!(
            "seeded from {}: {} created, {} updated, {} ignored, {} failed",
            seed.display(),
            summary.created,
            summary.updated,
            summary.ignored,
            summary.failed,
        );
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut session = menu::Session {
        store,
        input: &mut input,
        out: &mut out,
        backup_path: settings.backup_path.clone(),
        delimiter,
    };
    menu::run(&mut session)
}
