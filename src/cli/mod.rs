use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};

use crate::application::{LedgerService, SlotStatus};
use crate::domain::{
    DEFAULT_CURRENCY_SYMBOL, ExpenseRecord, NewRecord, RecordQuery, SpendType, format_currency,
    parse_cents,
};
use crate::io::DEFAULT_CSV_FILE_NAME;

/// Pitaka - Offline Expense Tracker
#[derive(Parser)]
#[command(name = "pitaka")]
#[command(about = "A single-device expense tracker with daily, weekly and monthly totals")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "PITAKA_DATABASE", default_value = "pitaka.db")]
    pub database: String,

    /// Currency symbol used when displaying amounts
    #[arg(long, env = "PITAKA_CURRENCY", default_value = DEFAULT_CURRENCY_SYMBOL)]
    pub currency: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new expense
    Add {
        /// Amount (e.g., "150.50" or "150")
        amount: String,

        /// Category (defaults to the first configured category)
        #[arg(short, long)]
        category: Option<String>,

        /// Type: needs, wants, savings, income
        #[arg(short = 't', long = "type", default_value = "needs")]
        spend_type: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a record by id (a unique prefix is enough)
    Delete {
        /// Record ID or prefix
        id: String,
    },

    /// List records, most recent first
    List {
        /// Match notes or category, case-insensitive
        #[arg(short, long)]
        search: Option<String>,

        /// Only this type
        #[arg(short = 't', long = "type")]
        spend_type: Option<String>,

        /// Only this exact category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show today, this week and this month totals with remaining budget
    Summary,

    /// Monthly budget commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Category list commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Export records to CSV or the full ledger to JSON
    Export {
        /// Output file, `-` for stdout (CSV defaults to budget-expenses.csv, JSON to stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },

    /// Import records from a CSV file produced by `export`
    Import {
        /// Input file
        input: String,

        /// Validate without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete ALL saved records
    Wipe {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the monthly budget
    Set {
        /// Amount (e.g., "15000")
        amount: String,
    },

    /// Show the monthly budget and what is left of it
    Show,

    /// Clear the monthly budget
    Clear,
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List,

    /// Add a category
    Add { name: String },

    /// Remove a category (existing records are kept as they are)
    Remove { name: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut service = LedgerService::open(&self.database)
            .await
            .with_context(|| format!("Failed to open database: {}", self.database))?;
        report_corrupt_slots(&service);

        let currency = self.currency.as_str();
        let today = Local::now().date_naive();

        match self.command {
            Commands::Add {
                amount,
                category,
                spend_type,
                date,
                notes,
            } => {
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '150.50' or '150'")?;
                let spend_type = parse_spend_type(&spend_type)?;
                let date = match date {
                    Some(date_str) => parse_date(&date_str).with_context(|| {
                        format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                    })?,
                    None => today,
                };
                let category = category
                    .or_else(|| service.categories().first().map(str::to_string))
                    .unwrap_or_else(|| "Others".to_string());

                if !service.categories().contains(category.trim()) {
                    eprintln!(
                        "Note: '{}' is not in the category list (see `pitaka category add`)",
                        category.trim()
                    );
                }

                let input = NewRecord::new(date, category, spend_type)
                    .with_amount(amount_cents)
                    .with_notes(notes.unwrap_or_default());
                let record = service.add_record(input).await?;

                println!(
                    "Recorded: {} {} ({}, {}) [{}]",
                    record.date,
                    format_currency(record.amount_cents, currency),
                    record.category,
                    record.spend_type,
                    short_id(&record)
                );
            }

            Commands::Delete { id } => match service.find_record_id(&id)? {
                Some(record_id) => {
                    if let Some(record) = service.remove_record(record_id).await {
                        println!(
                            "Deleted: {} {} ({})",
                            record.date,
                            format_currency(record.amount_cents, currency),
                            record.category
                        );
                    }
                }
                None => println!("No record matches id '{}'", id),
            },

            Commands::List {
                search,
                spend_type,
                category,
            } => {
                let query = RecordQuery {
                    text: search,
                    spend_type: spend_type.as_deref().map(parse_spend_type).transpose()?,
                    category,
                };
                run_list_command(&service, &query, currency);
            }

            Commands::Summary => run_summary_command(&service, today, currency),

            Commands::Budget(budget_cmd) => {
                run_budget_command(&mut service, budget_cmd, today, currency).await?;
            }

            Commands::Category(category_cmd) => {
                run_category_command(&mut service, category_cmd).await;
            }

            Commands::Export { output, format } => {
                run_export_command(&service, output.as_deref(), format)?;
            }

            Commands::Import { input, dry_run } => {
                run_import_command(&mut service, &input, dry_run).await?;
            }

            Commands::Wipe { yes } => {
                let confirmed = yes
                    || confirm(
                        "Delete ALL saved expenses on this device? [y/N] ",
                        std::io::stdin().lock(),
                    )?;
                if !confirmed {
                    println!("Nothing deleted.");
                    return Ok(());
                }
                let count = service.wipe(true).await?;
                println!("Deleted {} record(s).", count);
            }
        }

        Ok(())
    }
}

fn report_corrupt_slots(service: &LedgerService) {
    let report = service.load_report();
    for (name, status) in [
        ("records", report.records),
        ("categories", report.categories),
        ("budget", report.budget),
    ] {
        match status {
            SlotStatus::Corrupt => {
                eprintln!("Warning: stored {} were unreadable, using defaults", name)
            }
            SlotStatus::Repaired => {
                eprintln!("Warning: some stored {} were invalid and were skipped", name)
            }
            SlotStatus::Absent | SlotStatus::Loaded => {}
        }
    }
}

fn run_list_command(service: &LedgerService, query: &RecordQuery, currency: &str) {
    let records = service.list_records(query);

    if records.is_empty() {
        println!("No expenses yet. Add your first one with `pitaka add`.");
        return;
    }

    println!(
        "{:<10} {:<12} {:<12} {:<8} {:>14} NOTES",
        "ID", "DATE", "CATEGORY", "TYPE", "AMOUNT"
    );
    println!("{}", "-".repeat(78));
    for record in records {
        let notes = if record.notes.is_empty() {
            "-"
        } else {
            record.notes.as_str()
        };
        println!(
            "{:<10} {:<12} {:<12} {:<8} {:>14} {}",
            short_id(record),
            record.date,
            truncate(&record.category, 12),
            record.spend_type,
            format_currency(record.amount_cents, currency),
            truncate(notes, 30)
        );
    }
}

fn run_summary_command(service: &LedgerService, today: NaiveDate, currency: &str) {
    let summary = service.summary(today);

    println!("{:<12} {:>14}", "Today", format_currency(summary.today, currency));
    println!("{:<12} {:>14}", "This week", format_currency(summary.week, currency));
    println!("{:<12} {:>14}", "This month", format_currency(summary.month, currency));
    println!("{:<12} {:>14}", "Remaining", format_currency(summary.remaining, currency));
}

async fn run_budget_command(
    service: &mut LedgerService,
    cmd: BudgetCommands,
    today: NaiveDate,
    currency: &str,
) -> Result<()> {
    match cmd {
        BudgetCommands::Set { amount } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '15000' or '15000.00'")?;
            service.set_budget(amount_cents).await?;
            println!("Monthly budget: {}", format_currency(amount_cents, currency));
        }

        BudgetCommands::Show => {
            let summary = service.summary(today);
            if summary.budget > 0 {
                println!("Monthly budget: {}", format_currency(summary.budget, currency));
            } else {
                println!("Monthly budget: not set");
            }
            println!("Spent this month: {}", format_currency(summary.month, currency));
            println!("Remaining: {}", format_currency(summary.remaining, currency));
        }

        BudgetCommands::Clear => {
            service.set_budget(0).await?;
            println!("Monthly budget cleared");
        }
    }

    Ok(())
}

async fn run_category_command(service: &mut LedgerService, cmd: CategoryCommands) {
    match cmd {
        CategoryCommands::List => {
            for name in service.categories().iter() {
                println!("{}", name);
            }
        }

        CategoryCommands::Add { name } => {
            if service.add_category(&name).await {
                println!("Added category: {}", name.trim());
            } else {
                println!("Category '{}' is blank or already exists", name.trim());
            }
        }

        CategoryCommands::Remove { name } => {
            if service.remove_category(&name).await {
                println!("Removed category: {}", name.trim());
            } else {
                println!("No category named '{}'", name.trim());
            }
        }
    }
}

/// Where `export` writes: `None` means stdout.
fn export_destination(output: Option<&str>, format: ExportFormat) -> Option<&str> {
    match (output, format) {
        (Some("-"), _) => None,
        (Some(path), _) => Some(path),
        (None, ExportFormat::Csv) => Some(DEFAULT_CSV_FILE_NAME),
        (None, ExportFormat::Json) => None,
    }
}

fn run_export_command(
    service: &LedgerService,
    output: Option<&str>,
    format: ExportFormat,
) -> Result<()> {
    use crate::io::{write_csv, write_snapshot_json};
    use std::fs::File;
    use std::io::stdout;

    let output = export_destination(output, format);
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        ExportFormat::Csv => {
            let count = write_csv(service.ledger().records(), writer)?;
            match output {
                Some(path) => eprintln!("Exported {} records to {}", count, path),
                None => println!(),
            }
        }
        ExportFormat::Json => {
            let snapshot = write_snapshot_json(service.ledger(), writer)?;
            match output {
                Some(path) => eprintln!(
                    "Exported {} records and {} categories to {}",
                    snapshot.records.len(),
                    snapshot.categories.len(),
                    path
                ),
                None => println!(),
            }
        }
    }

    Ok(())
}

async fn run_import_command(service: &mut LedgerService, input: &str, dry_run: bool) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;

    let file = File::open(input).with_context(|| format!("Failed to open input file: {}", input))?;
    let result = Importer::new(service)
        .import_csv(file, ImportOptions { dry_run })
        .await?;

    for error in &result.errors {
        eprintln!("Line {}: {}", error.line, error.error);
    }
    if dry_run {
        println!(
            "Dry run: {} record(s) valid, {} invalid",
            result.imported,
            result.errors.len()
        );
    } else {
        println!(
            "Imported {} record(s), {} skipped",
            result.imported,
            result.errors.len()
        );
    }
    Ok(())
}

/// Ask a yes/no question on stdout and read the answer from `input`.
/// Anything but "y" or "yes" is a no.
fn confirm(prompt: &str, mut input: impl BufRead) -> Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn parse_spend_type(s: &str) -> Result<SpendType> {
    SpendType::from_str(s).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid type '{}'. Valid types: needs, wants, savings, income",
            s
        )
    })
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")
}

fn short_id(record: &ExpenseRecord) -> String {
    record.id.to_string()[..8].to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
