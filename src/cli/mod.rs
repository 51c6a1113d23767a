use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::PathBuf;
use std::string::FromUtf8Error;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use crate::application::ExpenseService;
use crate::config::{ConfigOverrides, SessionConfig};
use crate::logging;

mod session;

pub use session::*;

/// Impensa - in-memory expense tracker
#[derive(Parser, Debug)]
#[command(name = "impensa")]
#[command(about = "Track expenses for the length of a session and summarize them")]
#[command(version)]
pub struct Cli {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Read session commands from a file instead of stdin
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Number of records shown by `recent` and `dashboard`
    #[arg(long)]
    pub recent: Option<usize>,

    /// Only accept expenses in known categories
    #[arg(long)]
    pub strict: bool,

    /// Extra category to offer besides the defaults (repeatable)
    #[arg(long = "category", value_name = "LABEL")]
    pub categories: Vec<String>,

    /// Symbol printed in front of amounts
    #[arg(long)]
    pub currency: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        logging::init(self.verbose)?;

        let overrides = ConfigOverrides {
            recent_limit: self.recent,
            strict_categories: self.strict,
            extra_categories: self.categories,
            currency_symbol: self.currency,
        };
        let config = SessionConfig::resolve(self.config.as_deref(), overrides)?;
        debug!(?config, "session configuration");

        let service = ExpenseService::new(&config);
        let mut session = Session::new(service, &config.currency_symbol, io::stdout().lock());

        match self.script {
            Some(path) => {
                let file = File::open(&path)
                    .with_context(|| format!("failed to open script {}", path.display()))?;
                session.run(BufReader::new(file))
            }
            None => {
                let stdin = io::stdin();
                if stdin.is_terminal() {
                    session.set_prompt(true);
                    session.greet()?;
                }
                session.run(stdin.lock())
            }
        }
    }
}

/// Split a command line into arguments. Single or double quotes group words
/// and are removed; there are no escapes.
pub fn split_args(line: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        anyhow::bail!("unterminated {q} quote");
    }
    if in_word {
        args.push(current);
    }
    Ok(args)
}

/// Lines that carry no command.
fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Read lines until EOF, skipping blanks and comments. The outer error is an
/// I/O failure; the inner one is a line that is not valid UTF-8.
fn command_lines<R: BufRead>(
    input: R,
) -> impl Iterator<Item = io::Result<Result<String, FromUtf8Error>>> {
    input
        .split(b'\n')
        .map(|bytes| {
            bytes.map(|mut bytes| {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                String::from_utf8(bytes)
            })
        })
        .filter(|line| !matches!(line, Ok(Ok(l)) if is_blank_or_comment(l)))
}
