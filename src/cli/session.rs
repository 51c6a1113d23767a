use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::application::ExpenseService;
use crate::domain::{CategoryAdded, Cents, ExpenseRecord, format_cents};
use crate::io::{ExportFormat, ExportKind, Exporter};

use super::{command_lines, split_args};

const BAR_WIDTH: usize = 30;

/// One line of input inside a session.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Record an expense
    #[command(allow_negative_numbers = true)]
    Add {
        /// Amount (e.g., "12.50" or "12")
        amount: String,

        /// Category label
        category: String,

        /// What the money was spent on. Words may start with `-`; a
        /// `--date` among them is still taken as the date.
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        description: Vec<String>,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List every expense in entry order
    List,

    /// Show the most recent expenses, newest first
    Recent {
        /// How many to show (defaults to the configured limit)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Show total, average and highest expense
    Metrics,

    /// Show metrics, recent expenses and category totals
    Dashboard,

    /// List known categories
    Categories,

    /// Add a category
    Category {
        /// Label to add
        label: String,
    },

    /// Totals per category
    ByCategory,

    /// Spending over time
    Trend {
        /// One bar per day in date order instead of one per expense
        #[arg(long)]
        sorted: bool,
    },

    /// Min, median and max per category
    Distribution,

    /// Export data to CSV or JSON
    Export {
        /// What to export
        #[arg(value_enum)]
        kind: ExportKind,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file (session output if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove every expense (categories are kept)
    Reset,

    /// End the session
    #[command(alias = "exit")]
    Quit,
}

/// Whether the session keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// An interactive expense-tracking session: reads commands, runs them
/// against its own [`ExpenseService`] and writes the results to `out`.
pub struct Session<W: Write> {
    service: ExpenseService,
    currency: String,
    out: W,
    prompt: bool,
}

impl<W: Write> Session<W> {
    pub fn new(service: ExpenseService, currency: &str, out: W) -> Self {
        Self {
            service,
            currency: currency.to_string(),
            out,
            prompt: false,
        }
    }

    /// Print a prompt before each command.
    pub fn set_prompt(&mut self, prompt: bool) {
        self.prompt = prompt;
    }

    pub fn service(&self) -> &ExpenseService {
        &self.service
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn greet(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "Impensa {}. Type `help` for commands, `quit` to leave.",
            env!("CARGO_PKG_VERSION")
        )?;
        Ok(())
    }

    /// Run commands until `quit` or end of input. A failing command is
    /// reported and the session goes on.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        self.show_prompt()?;
        for line in command_lines(input) {
            let line = line.context("failed to read command")?;
            let (command, outcome) = match line {
                Ok(text) => {
                    let outcome = self.execute(&text);
                    (text, outcome)
                }
                Err(e) => (
                    String::from_utf8_lossy(e.as_bytes()).into_owned(),
                    Err(anyhow::anyhow!("line is not valid UTF-8 ({e})")),
                ),
            };
            match outcome {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    warn!(command = %command.trim(), error = %e, "command failed");
                    writeln!(self.out, "error: {e:#}")?;
                }
            }
            self.show_prompt()?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn show_prompt(&mut self) -> Result<()> {
        if self.prompt {
            write!(self.out, "> ")?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Parse and run a single command line.
    pub fn execute(&mut self, line: &str) -> Result<Flow> {
        let args = split_args(line)?;
        if args.is_empty() {
            return Ok(Flow::Continue);
        }

        let parsed = match SessionLine::try_parse_from(&args) {
            Ok(parsed) => parsed,
            Err(e) => {
                use clap::error::ErrorKind;
                if matches!(
                    e.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    write!(self.out, "{}", e.render())?;
                    return Ok(Flow::Continue);
                }
                anyhow::bail!("{}", first_line(&e.render().to_string()));
            }
        };

        match parsed.command {
            SessionCommand::Add {
                amount,
                category,
                description,
                date,
            } => {
                let (description, trailing_date) = take_date_option(description)?;
                let date = match (date, trailing_date) {
                    (Some(_), Some(_)) => anyhow::bail!("the date was given more than once"),
                    (date, trailing_date) => date.or(trailing_date),
                };
                let date = date.map(|d| parse_date(&d)).transpose()?;
                let record = self.service.record_expense(
                    &amount,
                    &category,
                    &description.join(" "),
                    date,
                )?;
                writeln!(
                    self.out,
                    "Added {} {} on {}: {}",
                    self.money(record.amount_cents),
                    record.category,
                    record.date.format("%Y-%m-%d"),
                    record.description
                )?;
            }

            SessionCommand::List => {
                let records = self.service.records().to_vec();
                self.print_records(&records, "No expenses to display yet! Start adding some.")?;
            }

            SessionCommand::Recent { count } => {
                if count == Some(0) {
                    anyhow::bail!("count must be at least 1");
                }
                let records = self
                    .service
                    .recent(count.unwrap_or(self.service.recent_limit()));
                self.print_records(&records, "No expenses recorded yet!")?;
            }

            SessionCommand::Metrics => self.print_metrics()?,

            SessionCommand::Dashboard => self.print_dashboard()?,

            SessionCommand::Categories => {
                let labels: Vec<&str> = self.service.categories().iter().collect();
                writeln!(self.out, "{}", labels.join(", "))?;
            }

            SessionCommand::Category { label } => match self.service.add_category(&label) {
                CategoryAdded::Added => writeln!(self.out, "Added category: {}", label.trim())?,
                CategoryAdded::NoOp => writeln!(self.out, "Category unchanged.")?,
            },

            SessionCommand::ByCategory => self.print_by_category()?,

            SessionCommand::Trend { sorted } => {
                let points = if sorted {
                    self.service.daily_totals()
                } else {
                    self.service.time_series()
                };
                let points: Vec<(NaiveDate, Cents)> =
                    points.iter().map(|p| (p.date, p.amount_cents)).collect();
                self.print_trend(&points)?;
            }

            SessionCommand::Distribution => self.print_distribution()?,

            SessionCommand::Export {
                kind,
                format,
                output,
            } => {
                let exporter = Exporter::new(&self.service);
                match output {
                    Some(path) => {
                        let file = File::create(&path)
                            .with_context(|| format!("failed to create {}", path.display()))?;
                        let count = exporter.export(kind, format, BufWriter::new(file))?;
                        writeln!(self.out, "Exported {} rows to {}", count, path.display())?;
                    }
                    None => {
                        exporter.export(kind, format, &mut self.out)?;
                        writeln!(self.out)?;
                    }
                }
            }

            SessionCommand::Reset => {
                let removed = self.service.reset();
                writeln!(self.out, "Removed {removed} expenses. Ready for new tracking!")?;
            }

            SessionCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn money(&self, cents: Cents) -> String {
        format!("{}{}", self.currency, format_cents(cents))
    }

    fn print_records(&mut self, records: &[ExpenseRecord], empty_message: &str) -> Result<()> {
        if records.is_empty() {
            writeln!(self.out, "{empty_message}")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "{:<12} {:>12} {:<15} DESCRIPTION",
            "DATE", "AMOUNT", "CATEGORY"
        )?;
        writeln!(self.out, "{}", "-".repeat(70))?;
        for record in records {
            writeln!(
                self.out,
                "{:<12} {:>12} {:<15} {}",
                record.date.format("%Y-%m-%d"),
                self.money(record.amount_cents),
                truncate(&record.category, 15),
                truncate(&record.description, 30)
            )?;
        }
        Ok(())
    }

    fn print_metrics(&mut self) -> Result<()> {
        let metrics = self.service.metrics();
        writeln!(self.out, "Total Expenses:   {:>15}", self.money(metrics.total))?;
        writeln!(self.out, "Average Expense:  {:>15}", self.money(metrics.average))?;
        writeln!(self.out, "Highest Expense:  {:>15}", self.money(metrics.maximum))?;
        writeln!(self.out, "Count:            {:>15}", metrics.count)?;
        Ok(())
    }

    fn print_dashboard(&mut self) -> Result<()> {
        let dashboard = self.service.dashboard();

        self.print_metrics()?;
        writeln!(self.out)?;
        writeln!(self.out, "Recent Expenses")?;
        self.print_records(&dashboard.recent, "No expenses recorded yet!")?;

        if !dashboard.by_category.is_empty() {
            writeln!(self.out)?;
            writeln!(self.out, "Expenses by Category")?;
            for (category, total) in &dashboard.by_category {
                writeln!(
                    self.out,
                    "  {:<18} {:>12}",
                    truncate(category, 18),
                    self.money(*total)
                )?;
            }
        }
        Ok(())
    }

    fn print_by_category(&mut self) -> Result<()> {
        let report = self.service.category_report();
        if report.categories.is_empty() {
            writeln!(self.out, "Add some expenses to see the analysis!")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "{:<20} {:>12} {:>8} {:>12} {:>8}",
            "CATEGORY", "TOTAL", "COUNT", "AVERAGE", "PERCENT"
        )?;
        writeln!(self.out, "{}", "-".repeat(65))?;
        for cat in &report.categories {
            writeln!(
                self.out,
                "{:<20} {:>12} {:>8} {:>12} {:>7.1}%",
                truncate(&cat.category, 20),
                self.money(cat.total),
                cat.count,
                self.money(cat.average),
                cat.percentage
            )?;
        }
        writeln!(self.out, "{}", "-".repeat(65))?;
        writeln!(self.out, "{:<20} {:>12}", "TOTAL", self.money(report.total))?;
        Ok(())
    }

    fn print_trend(&mut self, points: &[(NaiveDate, Cents)]) -> Result<()> {
        if points.is_empty() {
            writeln!(self.out, "Add some expenses to see the analysis!")?;
            return Ok(());
        }

        let max = points.iter().map(|(_, amount)| *amount).max().unwrap_or(0);
        for (date, amount) in points {
            writeln!(
                self.out,
                "{} {:>12} {}",
                date.format("%Y-%m-%d"),
                self.money(*amount),
                "#".repeat(bar_length(*amount, max))
            )?;
        }
        Ok(())
    }

    fn print_distribution(&mut self) -> Result<()> {
        let distribution = self.service.distribution();
        if distribution.is_empty() {
            writeln!(self.out, "Add some expenses to see the analysis!")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "{:<20} {:>6} {:>12} {:>12} {:>12}",
            "CATEGORY", "COUNT", "MIN", "MEDIAN", "MAX"
        )?;
        writeln!(self.out, "{}", "-".repeat(66))?;
        for (category, d) in &distribution {
            writeln!(
                self.out,
                "{:<20} {:>6} {:>12} {:>12} {:>12}",
                truncate(category, 20),
                d.count,
                self.money(d.min),
                self.money(d.median),
                self.money(d.max)
            )?;
        }
        Ok(())
    }
}

/// Bar length proportional to `amount / max`, at least one mark for any
/// positive amount.
fn bar_length(amount: Cents, max: Cents) -> usize {
    if max <= 0 || amount <= 0 {
        return 0;
    }
    let scaled = (amount as u128 * BAR_WIDTH as u128 / max as u128) as usize;
    scaled.max(1)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn first_line(s: &str) -> &str {
    let line = s.lines().next().unwrap_or(s);
    line.strip_prefix("error: ").unwrap_or(line)
}

/// Pull a `--date D`, `-d D` or `--date=D` out of the description words.
fn take_date_option(words: Vec<String>) -> Result<(Vec<String>, Option<String>)> {
    let mut description = Vec::with_capacity(words.len());
    let mut date = None;
    let mut words = words.into_iter();

    while let Some(word) = words.next() {
        let value = match word.as_str() {
            "--date" | "-d" => words
                .next()
                .with_context(|| format!("{word} needs a value (YYYY-MM-DD)"))?,
            other => match other.strip_prefix("--date=") {
                Some(value) => value.to_string(),
                None => {
                    description.push(word);
                    continue;
                }
            },
        };
        if date.replace(value).is_some() {
            anyhow::bail!("the date was given more than once");
        }
    }

    Ok((description, date))
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))
}
