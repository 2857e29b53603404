//! `probeconf check` command

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::cli::{CheckArgs, ProbeCommand};
use probeconf::util::diagnostic::suggestions;
use probeconf::util::shell::Shell;
use probeconf::{Headers, Session};

pub fn execute(args: CheckArgs, shell: &Shell) -> Result<ExitCode> {
    let mut session = Session::new(args.cc.as_deref())?;

    for flag in &args.cppflags {
        session.add_cppflag(flag);
    }
    for define in &args.defines {
        let (name, value) = match define.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (define.as_str(), None),
        };
        session.set_feature(name, value)?;
    }

    session.enable_status_output(!shell.is_quiet());
    session.set_status_sink(Box::new(io::stderr()));
    session.show_diagnostics(args.show_diagnostics);

    let result = match args.probe {
        ProbeCommand::Header { headers } => session.check_header(headers)?,
        ProbeCommand::Func { name, headers } => session.check_func(Headers::from(headers), &name)?,
        ProbeCommand::Type { name, headers } => session.check_type(Headers::from(headers), &name)?,
        ProbeCommand::Decl { name, headers } => session.check_decl(Headers::from(headers), &name)?,
        ProbeCommand::Member { ty, member, headers } => {
            session.check_member(Headers::from(headers), &ty, &member)?
        }
    };

    if let Some(line) = session.results().values().last() {
        println!("{}", line);
    }
    if !result.ok && !args.show_diagnostics && !shell.is_quiet() {
        eprintln!("{}", suggestions::SHOW_DIAGNOSTICS);
    }

    session
        .close()
        .context("failed to remove probe workspace")?;

    Ok(if result.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
