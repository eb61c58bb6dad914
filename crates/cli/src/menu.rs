//! Interactive menu: single-key commands over the same store as the CLI.
//!
//! The menu only collects raw strings and shows results; every field goes
//! through the normalizer and every write through the reconciler.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use chrono::NaiveDate;

use stocktake_core::normalize::{format_date, format_price, parse_date, parse_name, parse_price, parse_quantity};
use stocktake_core::{Candidate, Product, ProductId, Store, StoreError};
use stocktake_recon::reconcile;

use crate::CliError;

/// Everything a menu handler may touch.
pub struct Session<'a> {
    pub store: &'a mut dyn Store,
    pub input: &'a mut dyn BufRead,
    pub out: &'a mut dyn Write,
    pub backup_path: PathBuf,
    pub delimiter: u8,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

type Handler = fn(&mut Session<'_>) -> Result<Flow, CliError>;

pub struct MenuCommand {
    pub code: char,
    pub description: &'static str,
    pub handler: Handler,
}

/// Menu entries, in display order.
pub const COMMANDS: &[MenuCommand] = &[
    MenuCommand { code: 'v', description: "View a product by id", handler: view_product },
    MenuCommand { code: 'a', description: "Add a product", handler: add_product },
    MenuCommand { code: 'b', description: "Back up the catalog", handler: backup },
    MenuCommand { code: 'q', description: "Quit", handler: quit },
];

fn lookup(input: &str) -> Option<&'static MenuCommand> {
    let mut chars = input.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            let c = c.to_ascii_lowercase();
            COMMANDS.iter().find(|cmd| cmd.code == c)
        }
        _ => None,
    }
}

/// Run the menu until `q` or end of input.
pub fn run(session: &mut Session<'_>) -> Result<(), CliError> {
    loop {
        let count = session.store.count().map_err(CliError::store)?;
        writeln!(session.out, "\nStocktake ({count} products)")?;
        for cmd in COMMANDS {
            writeln!(session.out, "  {}) {}", cmd.code, cmd.description)?;
        }

        let Some(line) = prompt(session, "> ")? else {
            return Ok(());
        };
        let Some(cmd) = lookup(&line) else {
            writeln!(session.out, "Unknown command '{}'.", line.trim())?;
            continue;
        };

        if (cmd.handler)(session)? == Flow::Quit {
            return Ok(());
        }
    }
}

// ---------------------------------------------------------------------------
// Prompting
// ---------------------------------------------------------------------------

/// Print `label` and read one line. `None` at end of input.
fn prompt(session: &mut Session<'_>, label: &str) -> Result<Option<String>, CliError> {
    write!(session.out, "{label}")?;
    session.out.flush()?;

    let mut line = String::new();
    if session.input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Prompt until `parse` accepts the answer, showing each rejection.
fn prompt_parsed<T, E: Display>(
    session: &mut Session<'_>,
    label: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<Option<T>, CliError> {
    loop {
        let Some(line) = prompt(session, label)? else {
            return Ok(None);
        };
        match parse(&line) {
            Ok(value) => return Ok(Some(value)),
            Err(e) => writeln!(session.out, "  {e}")?,
        }
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn render_product(p: &Product) -> String {
    format!(
        "Product #{}\n  Name:     {}\n  Price:    {}\n  Quantity: {}\n  Updated:  {}\n",
        p.id,
        p.name,
        format_price(p.price_cents),
        p.quantity,
        format_date(p.updated_at),
    )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn view_product(session: &mut Session<'_>) -> Result<Flow, CliError> {
    let Some(id) = prompt_parsed(session, "Product id: ", |s| {
        s.trim().parse::<i64>().map_err(|_| format!("'{}' is not a product id", s.trim()))
    })?
    else {
        return Ok(Flow::Quit);
    };

    match session.store.get(ProductId(id)) {
        Ok(product) => write!(session.out, "{}", render_product(&product))?,
        Err(e @ StoreError::NotFound { .. }) => writeln!(session.out, "{e}")?,
        Err(e) => return Err(CliError::store(e)),
    }
    Ok(Flow::Continue)
}

fn add_product(session: &mut Session<'_>) -> Result<Flow, CliError> {
    let Some(name) = prompt_parsed(session, "Name: ", parse_name)? else {
        return Ok(Flow::Quit);
    };
    let Some(price_cents) = prompt_parsed(session, "Price (e.g. $12.50): ", parse_price)? else {
        return Ok(Flow::Quit);
    };
    let Some(quantity) = prompt_parsed(session, "Quantity: ", parse_quantity)? else {
        return Ok(Flow::Quit);
    };
    let Some(updated_at) = prompt_parsed(session, "Date updated (MM/DD/YYYY, blank for today): ", |s| {
        if s.trim().is_empty() {
            Ok(today())
        } else {
            parse_date(s)
        }
    })?
    else {
        return Ok(Flow::Quit);
    };

    let candidate = Candidate { name, quantity, price_cents, updated_at };
    let outcome = reconcile(&mut *session.store, &candidate).map_err(CliError::store)?;
    writeln!(session.out, "{}", capitalize(&outcome.to_string()))?;
    Ok(Flow::Continue)
}

fn backup(session: &mut Session<'_>) -> Result<Flow, CliError> {
    match stocktake_io::csv::export(&*session.store, &session.backup_path, session.delimiter) {
        Ok(count) => writeln!(session.out, "Backed up {count} products to {}.", session.backup_path.display())?,
        Err(e) => writeln!(session.out, "Backup failed: {e}")?,
    }
    Ok(Flow::Continue)
}

fn quit(_session: &mut Session<'_>) -> Result<Flow, CliError> {
    Ok(Flow::Quit)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
