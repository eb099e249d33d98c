mod commands;
mod config;
mod diagnostics;
mod error;
mod gitmodules;
mod info;
mod instance;
mod resolver;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use env_logger::Env;

use crate::config::Overrides;

#[derive(Parser)]
#[command(name = "subref", version, about = "Resolve browsable links for git submodule URLs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[command(flatten)]
    context: ContextArgs,
}

/// Settings that override `.subref.toml`.
#[derive(Args)]
struct ContextArgs {
    /// Base URL of the hosting instance
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Namespace of the viewed project
    #[arg(long, global = true)]
    namespace: Option<String>,
    /// Path of the viewed project
    #[arg(long, global = true)]
    project: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show usage, URL shapes, and current configuration
    Info {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Resolve every submodule in .gitmodules
    Links {
        /// Path to the .gitmodules file
        #[arg(long)]
        gitmodules: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Pinned commit for a submodule, as PATH=ID (repeatable)
        #[arg(long = "pin", value_name = "PATH=ID")]
        pins: Vec<String>,
    },
    /// Resolve links for a single submodule URL
    Resolve {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Raw submodule URL as stored in .gitmodules
        url: String,
        /// Commit SHA or ref the parent pins
        pinned_id: String,
    },
}

impl From<ContextArgs> for Overrides {
    fn from(args: ContextArgs) -> Self {
        return Self {
            base_url: args.base_url,
            namespace: args.namespace,
            project: args.project,
        };
    }
}

fn main() -> ExitCode {
    // Default level comes from RUST_LOG; silent otherwise.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("off"))
        .format_timestamp(None)
        .try_init();
    let cli = Cli::parse();
    let overrides = Overrides::from(cli.context);

    let result = match cli.command {
        Commands::Info { json } => {
            info::run(overrides, json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Links { gitmodules, json, pins } => {
            commands::links(gitmodules.as_deref(), &pins, overrides, json)
        },
        Commands::Resolve { json, pinned_id, url } => commands::resolve(&url, &pinned_id, overrides, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    }
}
