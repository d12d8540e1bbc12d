//! msheet - read and write sheet rectangles in a local spreadsheet book

mod book;
mod table;

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use matrix_sheets::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::book::{Book, Selector};

#[derive(Parser)]
#[command(name = "msheet")]
#[command(
    author,
    version,
    about = "Read and write rectangles of a spreadsheet book as CSV"
)]
struct Cli {
    /// Book file holding the spreadsheets
    #[arg(long, env = "MSHEET_BOOK", default_value = "book.json", global = true)]
    book: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a spreadsheet and print its key
    New {
        /// Spreadsheet title
        name: String,
    },

    /// List the sheets of a spreadsheet
    Sheets {
        #[command(flatten)]
        target: Target,
    },

    /// Read a rectangle and print it as CSV
    Read {
        /// Sheet name
        sheet: String,

        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        anchor: Anchor,

        /// Number of rows (0: discover from the data)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        rows: i64,

        /// Number of columns (0: discover from the data)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        cols: i64,

        /// Read raw text instead of numbers
        #[arg(long)]
        text: bool,

        /// Value for absent cells; requires --rows and --cols
        #[arg(long)]
        fill: Option<String>,

        /// What to do with cells that are not numbers
        #[arg(long, value_enum, default_value_t = Policy::Drop)]
        on_text: Policy,
    },

    /// Write CSV from a file (or stdin) into a sheet, creating it if needed
    Write {
        /// Sheet name
        sheet: String,

        /// CSV input file (default: stdin)
        input: Option<PathBuf>,

        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        anchor: Anchor,

        /// Write values as text instead of parsing numbers
        #[arg(long)]
        text: bool,
    },

    /// Delete a sheet
    Delete {
        /// Sheet name
        sheet: String,

        #[command(flatten)]
        target: Target,
    },
}

/// Spreadsheet selection
#[derive(Args)]
struct Target {
    /// Spreadsheet key
    #[arg(long, conflicts_with = "name")]
    key: Option<String>,

    /// Spreadsheet title
    #[arg(long)]
    name: Option<String>,
}

impl Target {
    fn selector(self) -> Selector {
        Selector::new(self.key, self.name)
    }
}

/// Top-left cell of a rectangle
#[derive(Args)]
struct Anchor {
    /// Anchor in A1 notation (e.g. C4)
    #[arg(long, conflicts_with_all = ["row", "col"])]
    at: Option<CellCoord>,

    /// Anchor row, 1-based
    #[arg(long, default_value_t = 1)]
    row: u32,

    /// Anchor column, 1-based
    #[arg(long, default_value_t = 1)]
    col: u32,
}

impl Anchor {
    fn coord(&self) -> Result<CellCoord> {
        let coord = self.at.unwrap_or(CellCoord::new(self.row, self.col));
        Ok(coord.validated()?)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// Leave such cells out
    Drop,
    /// Keep them as text (numeric reads then fail on them)
    Keep,
    /// Fail numeric reads of the sheet
    Error,
}

impl From<Policy> for ParseFailurePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Drop => ParseFailurePolicy::Drop,
            Policy::Keep => ParseFailurePolicy::KeepAsText,
            Policy::Error => ParseFailurePolicy::Error,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut book = Book::load(&cli.book)?;

    match cli.command {
        Commands::New { name } => {
            let key = book.service_mut().create_spreadsheet(&name);
            book.save()?;
            println!("{key}");
        }
        Commands::Sheets { target } => list_sheets(&mut book, &target.selector())?,
        Commands::Read {
            sheet,
            target,
            anchor,
            rows,
            cols,
            text,
            fill,
            on_text,
        } => {
            let options = SessionOptions {
                parse_failure: on_text.into(),
                ..SessionOptions::default()
            };
            let mut session = book.session(&target.selector(), options)?;
            let anchor = anchor.coord()?;
            let stdout = io::stdout().lock();

            if text {
                let request = ReadRequest::from(anchor).rows(rows).cols(cols);
                let request = match fill {
                    Some(fill) => request.fill(fill),
                    None => request,
                };
                let matrix = session.read::<String>(&sheet, &request)?;
                table::write_csv(stdout, &matrix)?;
            } else {
                let request = ReadRequest::from(anchor).rows(rows).cols(cols);
                let request = match fill {
                    Some(fill) => request.fill(
                        fill.trim()
                            .parse::<f64>()
                            .with_context(|| format!("Fill value '{fill}' is not a number"))?,
                    ),
                    None => request,
                };
                let matrix = session.read::<f64>(&sheet, &request)?;
                table::write_csv(stdout, &matrix)?;
            }
        }
        Commands::Write {
            sheet,
            input,
            target,
            anchor,
            text,
        } => {
            let anchor = anchor.coord()?;
            let input = open_input(input.as_ref())?;
            {
                let mut session = book.session(&target.selector(), SessionOptions::default())?;
                let summary = if text {
                    session.write(&table::parse_text(input)?, &sheet, anchor)?
                } else {
                    session.write(&table::parse_numeric(input)?, &sheet, anchor)?
                };
                match summary.rect {
                    Some(rect) => eprintln!("Wrote {} cells to {sheet}!{rect}", summary.cells),
                    None => eprintln!("No values to write; sheet '{sheet}' exists"),
                }
            }
            book.save()?;
        }
        Commands::Delete { sheet, target } => {
            {
                let mut session = book.session(&target.selector(), SessionOptions::default())?;
                session.delete_sheet(&sheet)?;
            }
            book.save()?;
            eprintln!("Deleted sheet '{sheet}'");
        }
    }

    Ok(())
}

fn list_sheets(book: &mut Book, selector: &Selector) -> Result<()> {
    let mut session = book.session(selector, SessionOptions::default())?;
    for name in session.sheet_names() {
        let desc = session.descriptor(&name)?;
        println!(
            "{}\t{}x{}\t{}",
            desc.name, desc.row_count, desc.col_count, desc.updated
        );
    }
    Ok(())
}

fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

/// Log to stderr; `RUST_LOG` overrides the `-v` level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_key_and_name_conflict() {
        let result = Cli::try_parse_from(["msheet", "sheets", "--key", "k", "--name", "n"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_at_and_row_conflict() {
        let result = Cli::try_parse_from(["msheet", "read", "Data", "--at", "B2", "--row", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_anchor_from_a1() {
        let cli = Cli::try_parse_from(["msheet", "read", "Data", "--at", "C4", "--rows", "-1"])
            .unwrap();
        match cli.command {
            Commands::Read { anchor, rows, .. } => {
                assert_eq!(anchor.coord().unwrap(), CellCoord::new(4, 3));
                assert_eq!(rows, -1);
            }
            _ => panic!("expected read"),
        }
    }

    #[test]
    fn test_zero_anchor_rejected() {
        let cli = Cli::try_parse_from(["msheet", "write", "Data", "--row", "0"]).unwrap();
        match cli.command {
            Commands::Write { anchor, .. } => assert!(anchor.coord().is_err()),
            _ => panic!("expected write"),
        }
    }
}
