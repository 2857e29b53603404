//! Errors raised by probe sessions.
//!
//! A missing header or function is NOT an error: it comes back as a normal
//! [`ProbeResult`](crate::builder::compiler::ProbeResult) with `ok == false`.
//! These variants cover misuse and environment failures only.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;
use crate::util::process::find_c_compiler;

/// Error from a probe session.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no C compiler specified")]
    NoCompiler { env_var: &'static str },

    #[error("invalid {what}: {reason}")]
    InvalidArgument { what: &'static str, reason: String },

    #[error("failed to create probe workspace")]
    Workspace(#[source] io::Error),

    #[error("failed to write probe source `{}`", path.display())]
    WriteSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run compiler `{compiler}`")]
    Spawn {
        compiler: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read compiler diagnostics")]
    Scratch(#[source] io::Error),
}

impl ProbeError {
    pub(crate) fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        ProbeError::InvalidArgument {
            what,
            reason: reason.into(),
        }
    }

    /// Whether this is caller misuse rather than an environment failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ProbeError::InvalidArgument { .. })
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ProbeError::NoCompiler { env_var } => {
                let mut diag = Diagnostic::error("no C compiler specified")
                    .with_context(format!("`{}` is not set in the environment", env_var));
                diag = match find_c_compiler() {
                    Some(found) => diag.with_suggestion(format!(
                        "`{}` is on PATH: pass `--cc {}`",
                        found.display(),
                        found.display()
                    )),
                    None => diag.with_suggestion("Pass `--cc <compiler>` on the command line"),
                };
                diag.with_suggestion(format!(
                    "Set `compiler = \"cc\"` in the config file, or export {}",
                    env_var
                ))
            }

            ProbeError::InvalidArgument { what, reason } => {
                Diagnostic::error(format!("invalid {}", what)).with_context(reason.clone())
            }

            ProbeError::Spawn { compiler, source } => {
                let mut diag = Diagnostic::error(format!("failed to run compiler `{}`", compiler))
                    .with_context(source.to_string());
                if source.kind() == io::ErrorKind::NotFound {
                    diag = diag.with_suggestion("Check that the compiler is installed and on PATH");
                }
                diag
            }

            ProbeError::WriteSource { path, source } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(source.to_string()),

            ProbeError::Workspace(source) | ProbeError::Scratch(source) => {
                Diagnostic::error(self.to_string()).with_context(source.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_compiler_diagnostic() {
        let diag = ProbeError::NoCompiler { env_var: "CC" }.to_diagnostic();
        let output = diag.format(false);
        assert!(output.contains("error: no C compiler specified"));
        assert!(output.contains("`CC` is not set"));
        assert!(output.contains("compiler = \"cc\""));
    }

    #[test]
    fn test_contract_violation() {
        assert!(ProbeError::invalid("function name", "empty").is_contract_violation());
        assert!(!ProbeError::Scratch(io::Error::other("x")).is_contract_violation());
    }
}
