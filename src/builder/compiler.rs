//! Compiler invocation for probes.
//!
//! A probe is compiled and linked with
//! `<compiler> <cppflags...> -o <object> <source>`, stderr redirected into a
//! per-session scratch file. Any unsuccessful exit means "not available";
//! the scratch contents become the diagnostic.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::core::error::ProbeError;
use crate::core::ordered_set::OrderedSet;
use crate::util::process::ProcessBuilder;

/// Outcome of one probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub ok: bool,
    /// Compiler stderr for failed probes; empty on success.
    pub diagnostic: String,
}

impl ProbeResult {
    pub fn found() -> Self {
        ProbeResult {
            ok: true,
            diagnostic: String::new(),
        }
    }

    pub fn missing(diagnostic: impl Into<String>) -> Self {
        ProbeResult {
            ok: false,
            diagnostic: diagnostic.into(),
        }
    }

    /// `Some(diagnostic)` for failed probes.
    pub fn diagnostic(&self) -> Option<&str> {
        (!self.ok).then_some(self.diagnostic.as_str())
    }
}

/// Captures compiler stderr across probes.
///
/// The file is truncated after every probe and reused; it is removed when
/// the guard is dropped.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Create the scratch file inside `dir`.
    pub fn new_in(dir: &Path) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("probe-stderr")
            .suffix(".txt")
            .tempfile_in(dir)?;
        Ok(ScratchFile { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// A handle to give the child process as its stderr.
    fn writer(&self) -> io::Result<File> {
        self.file.as_file().try_clone()
    }

    /// Read everything captured so far, then empty the file and rewind.
    pub fn take(&mut self) -> io::Result<String> {
        let file = self.file.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Delete the scratch file now, reporting failures.
    pub fn close(self) -> io::Result<()> {
        self.file.close()
    }
}

/// A C compiler command.
///
/// The command may carry leading arguments, e.g. `ccache gcc` or
/// `gcc -m32`: the first word is the program, the rest go before cppflags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    command: String,
    program: String,
    leading_args: Vec<String>,
}

impl Compiler {
    pub fn new(command: impl Into<String>) -> Result<Self, ProbeError> {
        let command = command.into();
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| ProbeError::invalid("compiler", "compiler command is empty"))?;
        let leading_args = words.collect();
        Ok(Compiler {
            command,
            program,
            leading_args,
        })
    }

    /// The command as given.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn leading_args(&self) -> &[String] {
        &self.leading_args
    }

    /// Build the probe compile command.
    pub fn probe_command(&self, cppflags: &OrderedSet, object: &Path, source: &Path) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .args(&self.leading_args)
            .args(cppflags.values())
            .arg("-o")
            .arg(object)
            .arg(source)
    }

    /// Compile `source` into `object`, consuming and deleting the source.
    ///
    /// The object is removed after the run whether or not it was produced.
    pub fn compile(
        &self,
        source: NamedTempFile,
        object: &Path,
        cppflags: &OrderedSet,
        scratch: &mut ScratchFile,
    ) -> Result<ProbeResult, ProbeError> {
        let cmd = self.probe_command(cppflags, object, source.path());
        tracing::debug!("running `{}`", cmd.display_command());

        let stderr = scratch.writer().map_err(ProbeError::Scratch)?;
        let status = cmd.status_with_stderr(stderr);

        let source_path = source.path().to_path_buf();
        if let Err(e) = source.close() {
            tracing::warn!("failed to remove probe source {}: {}", source_path.display(), e);
        }
        remove_artifact(object);

        let status = status.map_err(|source| ProbeError::Spawn {
            compiler: self.command.clone(),
            source,
        })?;

        let output = scratch.take().map_err(ProbeError::Scratch)?;
        if status.success() {
            if !output.is_empty() {
                tracing::trace!("compiler warnings:\n{}", output);
            }
            Ok(ProbeResult::found())
        } else {
            tracing::debug!("compiler exited with {}", status);
            Ok(ProbeResult::missing(output))
        }
    }
}

fn remove_artifact(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("failed to remove {}: {}", path.display(), e),
    }
}

/// The fixed object name inside a session's work directory.
pub fn object_path(workdir: &Path) -> PathBuf {
    workdir.join("a.out")
}
