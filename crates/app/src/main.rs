#![forbid(unsafe_code)]

mod backend;
mod commands;
mod config;
mod terminal;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quiz_core::QuizName;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, Backend, Overrides};

#[derive(Parser)]
#[command(name = "fizlet", about = "Multiple-choice quizzes in the terminal", version)]
struct Cli {
    /// Where user question sets are stored
    #[arg(long, global = true, value_enum)]
    backend: Option<Backend>,

    /// SQLite database URL (sqlite backend)
    #[arg(long, global = true, value_name = "URL")]
    db: Option<String>,

    /// Question file (json backend)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Seed for option shuffling, for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Configuration file (default: fizlet.json if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Take a quiz (default command)
    Quiz {
        /// Question set to study (default from config, else `sql`)
        name: Option<String>,
    },

    /// List question sets
    List,

    /// Import a JSON question file as a new set
    Create {
        name: String,
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },

    /// Check a JSON question file without saving it
    Validate {
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },

    /// Add one question to a set, creating the set if needed
    Add { name: String },

    /// Remove a question by its 1-based number
    RemoveQuestion { name: String, number: usize },

    /// Delete a whole set
    Delete { name: String },

    /// Print a set as JSON, or write it to a file
    Export {
        name: String,
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    // RUST_LOG wins over --verbose.
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok())?;
    config.apply_overrides(Overrides {
        backend: cli.backend,
        database_url: cli.db.clone(),
        store_path: cli.store.clone(),
        seed: cli.seed,
    });
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    tracing::debug!(?config, "resolved configuration");
    let services = backend::open_services(&config).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command.unwrap_or(Command::Quiz { name: None }) {
        Command::Quiz { name } => {
            let name = QuizName::new(name.unwrap_or(config.default_quiz))?;
            let quiz = services.quiz();
            let mut run = quiz.start(&name).await?;
            terminal::run_quiz(&quiz, &mut run, io::stdin().lock(), &mut out).await?;
        }
        Command::List => commands::list(&services, &mut out).await?,
        Command::Create { name, file } => {
            commands::create(&services, &QuizName::new(name)?, &file, &mut out).await?;
        }
        Command::Validate { file } => commands::validate(&services, &file, &mut out)?,
        Command::Add { name } => {
            commands::add(&services, &QuizName::new(name)?, io::stdin().lock(), &mut out).await?;
        }
        Command::RemoveQuestion { name, number } => {
            commands::remove_question(&services, &QuizName::new(name)?, number, &mut out).await?;
        }
        Command::Delete { name } => {
            commands::delete(&services, &QuizName::new(name)?, &mut out).await?;
        }
        Command::Export { name, out: target } => {
            commands::export(&services, &QuizName::new(name)?, target.as_deref(), &mut out)
                .await?;
        }
    }
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
