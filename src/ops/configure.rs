//! Running a checks file against a session.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::headers::Headers;
use crate::ops::session::Session;
use crate::util::config::{CheckEntry, FeatureSetting, ProbeConfig};

/// Counts from one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub found: usize,
    pub missing: usize,
    /// Probes not run because their header was missing
    pub skipped: usize,
}

impl Summary {
    fn record(&mut self, ok: bool) {
        if ok {
            self.found += 1;
        } else {
            self.missing += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.found + self.missing + self.skipped
    }
}

/// Apply the config's cppflags and features, then run every check.
///
/// Within a `[[check]]` the header goes first; if it is missing the rest
/// of that entry is skipped. Otherwise funcs, types, decls and members run
/// in that order against the same headers. The caller flushes.
pub fn run(session: &mut Session, config: &ProbeConfig) -> Result<Summary> {
    for flag in &config.cppflags {
        session.add_cppflag(flag);
    }

    for (name, setting) in config.feature_settings()? {
        match setting {
            FeatureSetting::Define(value) => session.set_feature(&name, value.as_deref())?,
            FeatureSetting::Unset => {
                session.unset_feature(&name);
            }
        }
    }

    let mut summary = Summary::default();
    for (i, check) in config.checks.iter().enumerate() {
        run_entry(session, check, &mut summary)
            .with_context(|| format!("check #{} failed to run", i + 1))?;
    }

    tracing::debug!(
        "{} found, {} missing, {} skipped",
        summary.found,
        summary.missing,
        summary.skipped
    );
    Ok(summary)
}

fn run_entry(session: &mut Session, check: &CheckEntry, summary: &mut Summary) -> Result<()> {
    let headers = check.header.clone().unwrap_or_default();

    if !headers.is_empty() {
        let result = session.check_header(headers.clone())?;
        summary.record(result.ok);
        if !result.ok {
            let skipped = check.probe_count() - 1;
            if skipped > 0 {
                tracing::debug!("skipping {} checks: {} not found", skipped, headers.display());
            }
            summary.skipped += skipped;
            return Ok(());
        }
    }

    run_probes(session, &headers, check, summary)
}

fn run_probes(
    session: &mut Session,
    headers: &Headers,
    check: &CheckEntry,
    summary: &mut Summary,
) -> Result<()> {
    for func in &check.funcs {
        summary.record(session.check_func(headers.clone(), func)?.ok);
    }
    for ty in &check.types {
        summary.record(session.check_type(headers.clone(), ty)?.ok);
    }
    for decl in &check.decls {
        summary.record(session.check_decl(headers.clone(), decl)?.ok);
    }
    for m in &check.members {
        summary.record(session.check_member(headers.clone(), &m.ty, &m.member)?.ok);
    }
    Ok(())
}
