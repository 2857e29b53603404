//! probeconf CLI - C feature detection

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use probeconf::core::error::ProbeError;
use probeconf::util::diagnostic;
use probeconf::util::shell::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    match run(cli, &shell) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<ProbeError>() {
                Some(probe_err) => diagnostic::emit(&probe_err.to_diagnostic(), shell.use_color()),
                None => shell.error(format!("{:#}", e)),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<ExitCode> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("probeconf=debug")
    } else if cli.quiet {
        EnvFilter::new("probeconf=error")
    } else {
        EnvFilter::new("probeconf=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, shell).map(|_| ExitCode::SUCCESS),
        Commands::Check(args) => commands::check::execute(args, shell),
        Commands::MacroName(args) => commands::macro_name::execute(args).map(|_| ExitCode::SUCCESS),
        Commands::Completions(args) => commands::completions::execute(args).map(|_| ExitCode::SUCCESS),
    }
}
