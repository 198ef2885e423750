// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Holocron CLI - Star Wars reference data with local edits

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use holocron::fetcher::ApiError;
use holocron::preferences::Theme;
use holocron::resource::EntityKind;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "holocron")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "HOLOCRON_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Data directory override
    #[arg(long, env = "HOLOCRON_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List entity kinds and their editable fields
    Kinds,

    /// List a page of entities with local edits applied
    List {
        /// Entity kind (characters, films, planets, starships, species, vehicles)
        kind: EntityKind,

        /// Search term
        #[arg(short, long)]
        search: Option<String>,

        /// Page number
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
    },

    /// Show one entity with local edits applied
    Show {
        /// Entity kind
        kind: EntityKind,

        /// Entity ID
        id: String,

        /// Show the API data without local edits
        #[arg(long)]
        original: bool,

        /// Print long values such as the opening crawl in full
        #[arg(long)]
        full: bool,
    },

    /// Save a local edit
    Edit {
        /// Entity kind
        kind: EntityKind,

        /// Entity ID
        id: String,

        /// Field assignment (field=value), repeatable
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Field to drop from the edit, repeatable
        #[arg(long = "unset", value_name = "FIELD")]
        unset: Vec<String>,

        /// Discard the saved edit before applying --set
        #[arg(long)]
        replace: bool,
    },

    /// Discard the local edit of an entity
    Restore {
        /// Entity kind
        kind: EntityKind,

        /// Entity ID
        id: String,
    },

    /// List saved local edits
    Edits {
        /// Only this kind
        kind: Option<EntityKind>,
    },

    /// Remove local edits and preferences
    Clear {
        /// Only drop the edits of this kind
        #[arg(long)]
        kind: Option<EntityKind>,

        /// Confirm
        #[arg(long)]
        yes: bool,
    },

    /// Get or set the color theme
    Theme {
        /// Theme to save (light, dark)
        theme: Option<Theme>,
    },

    /// Show recent searches
    History {
        /// Forget recent searches
        #[arg(long)]
        clear: bool,
    },

    /// Show effective configuration
    Config {
        /// Configuration key (omit for all)
        key: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let not_found = err
                .chain()
                .filter_map(|cause| cause.downcast_ref::<ApiError>())
                .any(ApiError::is_not_found);
            if not_found {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = holocron::config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => config.log_level.parse().unwrap_or(tracing::Level::INFO),
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = commands::Context {
        palette: commands::Palette::new(
            !cli.no_color && !cli.json && std::io::stdout().is_terminal(),
        ),
        json: cli.json,
        config,
    };

    // Execute command
    match cli.command {
        Commands::Kinds => commands::kinds::run(&ctx),
        Commands::List { kind, search, page } => commands::list::run(&ctx, kind, search, page),
        Commands::Show { kind, id, original, full } => {
            commands::show::run(&ctx, kind, &id, original, full)
        }
        Commands::Edit { kind, id, set, unset, replace } => {
            commands::edit::run(&ctx, kind, &id, &commands::edit::EditArgs { set, unset, replace })
        }
        Commands::Restore { kind, id } => commands::restore::run(&ctx, kind, &id),
        Commands::Edits { kind } => commands::edits::run(&ctx, kind),
        Commands::Clear { kind, yes } => commands::clear::run(&ctx, kind, yes),
        Commands::Theme { theme } => commands::prefs::run_theme(&ctx, theme),
        Commands::History { clear } => commands::prefs::run_history(&ctx, clear),
        Commands::Config { key } => commands::config::run(&ctx, key.as_deref()),
        Commands::Completions { shell } => commands::completions::run(shell, Cli::command()),
    }
}
