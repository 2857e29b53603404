//! `probeconf run` command

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::cli::RunArgs;
use probeconf::ops::configure::{self, Summary};
use probeconf::util::config::{global_config_path, load_config, DEFAULT_CONFIG_FILE};
use probeconf::util::diagnostic::suggestions;
use probeconf::util::fs::ensure_parent_dir;
use probeconf::util::process::compiler_version;
use probeconf::util::shell::{Shell, Status};
use probeconf::Session;

/// Machine-readable result of `run --json`.
#[derive(Serialize)]
struct RunReport<'a> {
    output: &'a PathBuf,
    compiler: &'a str,
    summary: Summary,
    features: Vec<&'a str>,
    results: Vec<&'a str>,
}

pub fn execute(args: RunArgs, shell: &Shell) -> Result<()> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if !config_path.exists() {
        bail!(
            "config file `{}` not found\n{}",
            config_path.display(),
            suggestions::NO_CONFIG
        );
    }

    let user_path = if args.no_user_config {
        None
    } else {
        global_config_path()
    };
    let config = load_config(&config_path, user_path.as_deref())?;

    let compiler = args.cc.or_else(|| config.compiler.clone());
    let mut session = Session::new(compiler.as_deref())?;

    if shell.is_verbose() {
        let cc = session.compiler();
        let version = compiler_version(cc.program(), cc.leading_args())
            .unwrap_or_else(|| "unknown version".to_string());
        shell.status(Status::Using, format!("{} ({})", cc.command(), version));
    }

    let show_diagnostics =
        args.show_diagnostics || shell.is_verbose() || config.show_diagnostics.unwrap_or(false);
    session.enable_status_output(!shell.is_quiet() && !args.json);
    session.set_status_sink(Box::new(io::stderr()));
    session.show_diagnostics(show_diagnostics);

    let probes: usize = config.checks.iter().map(|c| c.probe_count()).sum();
    if probes == 0 && !args.json {
        shell.warn(format!(
            "{} has no [[check]] entries; only feature macros will be written",
            config_path.display()
        ));
    }
    if !args.json {
        shell.status(
            Status::Checking,
            format!("{} ({} probes)", config_path.display(), probes),
        );
    }

    let summary = configure::run(&mut session, &config)?;

    let output = args
        .output
        .unwrap_or_else(|| config.output_path(&config_path));
    ensure_parent_dir(&output)?;
    session.flush(&output)?;

    if args.json {
        let report = RunReport {
            output: &output,
            compiler: session.compiler().command(),
            summary,
            features: session.features().values().collect(),
            results: session.results().values().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mut msg = format!(
            "{} ({} found, {} missing",
            output.display(),
            summary.found,
            summary.missing
        );
        if summary.skipped > 0 {
            msg.push_str(&format!(", {} skipped", summary.skipped));
        }
        msg.push(')');
        shell.status(Status::Finished, msg);
    }

    session
        .close()
        .context("failed to remove probe workspace")?;
    Ok(())
}
