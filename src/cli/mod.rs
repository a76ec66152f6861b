use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::application::{LedgerEngine, LedgerError};
use crate::domain::{EXPENSE_LITERAL, INCOME_LITERAL, Transaction, format_rupiah};
use crate::io::Exporter;
use crate::storage::{HEADER, LedgerStore};

/// Saldo - Personal income/expense ledger
#[derive(Parser)]
#[command(name = "saldo")]
#[command(about = "Keep track of income and expenses in a plain CSV file")]
#[command(version)]
pub struct Cli {
    /// Ledger file path
    #[arg(short, long, global = true, default_value = "data.csv")]
    pub file: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the ledger file if it does not exist yet
    Init,

    /// Record a new transaction, stamped with the current time
    Add {
        /// What the money was for
        #[arg(allow_hyphen_values = true)]
        description: String,

        /// Whole amount, digits only (e.g. "150000")
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Income or expense
        #[arg(short, long, value_enum, ignore_case = true, default_value_t = KindArg::Pemasukan)]
        kind: KindArg,
    },

    /// Change an existing transaction; fields not given keep their current value
    Edit {
        /// Position shown by `list`
        #[arg(allow_negative_numbers = true)]
        position: i64,

        /// New description
        #[arg(short, long, allow_hyphen_values = true)]
        description: Option<String>,

        /// New amount
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,

        /// New kind
        #[arg(short, long, value_enum, ignore_case = true)]
        kind: Option<KindArg>,
    },

    /// Remove a transaction; later entries move up by one position
    Delete {
        /// Position shown by `list`
        #[arg(allow_negative_numbers = true)]
        position: i64,
    },

    /// Show a single transaction
    Show {
        /// Position shown by `list`
        #[arg(allow_negative_numbers = true)]
        position: i64,
    },

    /// List all transactions followed by the balance
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show income, expense and balance totals
    Balance {
        /// Output format (csv is not supported here)
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Export the ledger to JSON or CSV
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Income
    #[value(name = "pemasukan", alias = "income")]
    Pemasukan,
    /// Expense
    #[value(name = "pengeluaran", alias = "expense")]
    Pengeluaran,
}

impl KindArg {
    /// The literal written to the ledger file.
    pub fn literal(self) -> &'static str {
        match self {
            KindArg::Pemasukan => INCOME_LITERAL,
            KindArg::Pengeluaran => EXPENSE_LITERAL,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                let store = LedgerStore::new(&self.file);
                if store.ensure_initialized()? {
                    println!("Ledger initialized: {}", self.file.display());
                } else {
                    println!("Ledger already exists: {}", self.file.display());
                }
            }

            Commands::Add {
                description,
                amount,
                kind,
            } => {
                let mut engine = open_engine(&self.file)?;
                let tx = engine
                    .create(&description, kind.literal(), &amount)
                    .context("Transaction not recorded")?;
                println!(
                    "Recorded: {} {} {} ({})",
                    tx.kind,
                    format_rupiah(tx.amount_value().unwrap_or_default()),
                    tx.description,
                    tx.timestamp
                );
                println!("Position: {}", engine.len() - 1);
                print_balance_line(&engine);
            }

            Commands::Edit {
                position,
                description,
                amount,
                kind,
            } => {
                let mut engine = open_engine(&self.file)?;
                run_edit_command(&mut engine, position, description, amount, kind)?;
            }

            Commands::Delete { position } => {
                let mut engine = open_engine(&self.file)?;
                let removed = engine
                    .delete(to_position(position))
                    .with_context(|| format!("Cannot delete position {}", position))?;
                println!(
                    "Deleted: {} {} {}",
                    removed.kind, removed.amount, removed.description
                );
                print_balance_line(&engine);
            }

            Commands::Show { position } => {
                let engine = open_engine(&self.file)?;
                let tx = to_position(position)
                    .and_then(|p| engine.get(p))
                    .with_context(|| {
                        format!(
                            "No transaction at position {} (ledger has {} entries)",
                            position,
                            engine.len()
                        )
                    })?;
                print_transaction(position, tx);
            }

            Commands::List { format } => {
                let engine = open_engine(&self.file)?;
                run_list_command(&engine, format)?;
            }

            Commands::Balance { format } => {
                let engine = open_engine(&self.file)?;
                run_balance_command(&engine, format)?;
            }

            Commands::Export { output, format } => {
                let engine = open_engine(&self.file)?;
                run_export_command(&engine, output, format)?;
            }
        }

        Ok(())
    }
}

fn open_engine(path: &Path) -> Result<LedgerEngine> {
    LedgerEngine::open(path).with_context(|| format!("Failed to open ledger {}", path.display()))
}

fn run_edit_command(
    engine: &mut LedgerEngine,
    position: i64,
    description: Option<String>,
    amount: Option<String>,
    kind: Option<KindArg>,
) -> Result<()> {
    // Select first, the same way picking a row fills the edit form.
    let selected = match to_position(position) {
        Some(p) => engine.select(p).cloned(),
        None => Err(LedgerError::Range {
            position: None,
            len: engine.len(),
        }),
    };
    let current = selected.with_context(|| format!("Cannot edit position {}", position))?;

    let description = description.unwrap_or(current.description);
    let amount = amount.unwrap_or(current.amount);
    let kind = match kind {
        Some(k) => k.literal().to_string(),
        None => current.kind.to_string(),
    };

    let tx = engine
        .update_selected(&description, &kind, &amount)
        .with_context(|| format!("Cannot edit position {}", position))?;
    println!(
        "Updated: {} {} {} ({})",
        tx.kind,
        format_rupiah(tx.amount_value().unwrap_or_default()),
        tx.description,
        tx.timestamp
    );
    print_balance_line(engine);
    Ok(())
}

fn run_list_command(engine: &LedgerEngine, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if engine.is_empty() {
                println!("No transactions found.");
            } else {
                println!(
                    "{:>4}  {:<19}  {:<30}  {:<12}  {:>15}",
                    "#", HEADER[0], HEADER[1], HEADER[2], HEADER[3]
                );
                println!("{}", "-".repeat(88));
                for (position, tx) in engine.transactions().iter().enumerate() {
                    println!(
                        "{:>4}  {:<19}  {:<30}  {:<12}  {:>15}",
                        position,
                        tx.timestamp,
                        truncate(&tx.description, 30),
                        tx.kind,
                        display_amount(tx)
                    );
                }
            }
            println!();
            print_balance_line(engine);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(engine.transactions())?;
            println!("{}", json);
        }
        OutputFormat::Csv => {
            Exporter::new(engine).export_csv(io::stdout().lock())?;
        }
    }
    Ok(())
}

fn run_balance_command(engine: &LedgerEngine, format: OutputFormat) -> Result<()> {
    let summary = engine.summary();
    match format {
        OutputFormat::Table => {
            println!("Transactions: {}", summary.count);
            println!("Income:       {}", format_rupiah(summary.income));
            println!("Expense:      {}", format_rupiah(summary.expense));
            println!("Saldo:        {}", format_rupiah(summary.balance));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Csv => anyhow::bail!("CSV output is not available for balance"),
    }
    Ok(())
}

fn run_export_command(
    engine: &LedgerEngine,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> Result<()> {
    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file {}", path.display())
        })?)),
        None => Box::new(io::stdout().lock()),
    };

    let exporter = Exporter::new(engine);
    let count = match format {
        ExportFormat::Json => exporter.export_json(writer)?.transactions.len(),
        ExportFormat::Csv => exporter.export_csv(writer)?,
    };

    if let Some(path) = output {
        eprintln!("Exported {} transactions to {}", count, path.display());
    }
    Ok(())
}

fn print_transaction(position: i64, tx: &Transaction) {
    println!("Transaction #{}", position);
    match tx.parsed_timestamp() {
        Some(ts) => println!("  {}:    {}", HEADER[0], ts.format("%A, %d %B %Y %H:%M:%S")),
        None => println!("  {}:    {} (unrecognized format)", HEADER[0], tx.timestamp),
    }
    println!("  {}: {}", HEADER[1], tx.description);
    if tx.kind.is_recognized() {
        println!("  {}:       {}", HEADER[2], tx.kind);
    } else {
        println!("  {}:       {} (not counted in balance)", HEADER[2], tx.kind);
    }
    println!("  {}:     {}", HEADER[3], display_amount(tx));
}

fn print_balance_line(engine: &LedgerEngine) {
    println!("Saldo: {}", format_rupiah(engine.balance()));
}

/// Amount with thousands separators, or the raw text when it is not a valid amount.
fn display_amount(tx: &Transaction) -> String {
    match tx.amount_value() {
        Some(v) => crate::domain::format_thousands(v),
        None => tx.amount.clone(),
    }
}

/// Positions arrive signed so that a negative one is reported instead of rejected
/// by the argument parser.
fn to_position(position: i64) -> Option<usize> {
    usize::try_from(position).ok()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.replace('\n', " ")
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head.replace('\n', " "))
    }
}
