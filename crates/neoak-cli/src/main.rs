//! NeOak command-line tool
//!
//! Runs, checks, and emits NeOak projects, and executes emitted IR
//! artifacts. Exit status follows the program: 0 on success, 1 on an
//! uncaught exception, `n` after `System.exit(n)`, 2 for discovery and
//! artifact failures, 3 for compile failures.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use output::{ColorMode, StyledOutput};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "neoak")]
#[command(about = "NeOak: run Java-subset programs", long_about = None)]
#[command(version)]
struct Cli {
    /// When to color diagnostics
    #[arg(long, value_enum, global = true, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Log pipeline stages at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and run a project or a single entry file
    Run {
        /// Project directory or entry file
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Arguments passed to `main`
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Parse and check without running
    Check {
        /// Project directory or entry file
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Write the lowered program as a JSON artifact
    Emit {
        /// Project directory or entry file
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run an artifact written by `emit`
    Exec {
        /// Artifact file
        file: PathBuf,
        /// Arguments passed to `main`
        #[arg(last = true)]
        args: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut out = StyledOutput::new(cli.color.choice());

    let result = match cli.command {
        Commands::Run { path, args } => commands::run::execute(&path, args),
        Commands::Check { path } => commands::check::execute(&path, &mut out),
        Commands::Emit { path, output } => commands::emit::execute(&path, output.as_deref(), &mut out),
        Commands::Exec { file, args } => commands::exec::execute(&file, args),
    };

    let code = match result {
        Ok(code) => code,
        Err(err) => out.report(&err),
    };
    log::debug!("exit status {}", code);
    std::process::exit(code);
}
