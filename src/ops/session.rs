//! Probe sessions.
//!
//! A [`Session`] owns the compiler command, the accumulated cppflags and
//! feature macros, the recorded result lines, and a private work directory
//! holding the scratch file and probe artifacts. Everything in the work
//! directory is removed when the session is dropped.
//!
//! ```no_run
//! use probeconf::Session;
//!
//! let mut session = Session::new(Some("cc"))?;
//! session.set_feature("_GNU_SOURCE", None)?;
//! let stdio = session.check_header("stdio.h")?;
//! if stdio.ok {
//!     session.check_func("stdio.h", "fmemopen")?;
//! }
//! session.flush("config.h".as_ref())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{self, Write};
use std::path::Path;

use tempfile::{NamedTempFile, TempDir};

use crate::builder::compiler::{object_path, Compiler, ProbeResult, ScratchFile};
use crate::builder::probe::{synthesize, ProbeKind};
use crate::core::error::ProbeError;
use crate::core::headers::Headers;
use crate::core::identifier::is_c_identifier;
use crate::core::macros::{FeatureMacro, MacroLine};
use crate::core::ordered_set::OrderedSet;
use crate::ops::flush::{write_header, FlushError};

/// Environment variable naming the compiler when none is given.
pub const COMPILER_ENV: &str = "CC";

/// Environment variable holding initial preprocessor flags.
pub const CPPFLAGS_ENV: &str = "CPPFLAGS";

/// Where progress lines go.
struct StatusOutput {
    enabled: bool,
    diagnostics: bool,
    sink: Box<dyn Write + Send>,
}

impl StatusOutput {
    fn report(&mut self, kind: &ProbeKind, subject: &str, result: &ProbeResult) {
        if !self.enabled {
            return;
        }
        let verdict = if result.ok { "found" } else { "not found" };
        let mut line = format!("check {}: {} ... {}\n", kind.label(), subject, verdict);
        if self.diagnostics && !result.ok {
            for diag_line in result.diagnostic.lines() {
                line.push_str("    ");
                line.push_str(diag_line);
                line.push('\n');
            }
        }
        if let Err(e) = self.sink.write_all(line.as_bytes()).and_then(|_| self.sink.flush()) {
            tracing::warn!("failed to write status output: {}", e);
        }
    }
}

/// A feature-detection session bound to one compiler.
pub struct Session {
    compiler: Compiler,
    cppflags: OrderedSet,
    /// Feature macro name -> rendered `#define` line
    features: OrderedSet,
    results: OrderedSet,
    status: StatusOutput,
    // Field order matters: the scratch file lives in `workdir` and is
    // dropped first.
    scratch: ScratchFile,
    workdir: TempDir,
}

impl Session {
    /// Start a session with `compiler`, falling back to `$CC`.
    ///
    /// `$CPPFLAGS` is split on whitespace into the initial cppflags.
    pub fn new(compiler: Option<&str>) -> Result<Self, ProbeError> {
        Self::with_env(compiler, |key| std::env::var(key).ok())
    }

    /// Like [`Session::new`], reading the environment through `env`.
    pub fn with_env<F>(compiler: Option<&str>, env: F) -> Result<Self, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let command = match compiler {
            Some(cc) => cc.to_string(),
            None => env(COMPILER_ENV)
                .filter(|cc| !cc.trim().is_empty())
                .ok_or(ProbeError::NoCompiler { env_var: COMPILER_ENV })?,
        };
        let compiler = Compiler::new(command)?;

        let workdir = tempfile::Builder::new()
            .prefix("probeconf-")
            .tempdir()
            .map_err(ProbeError::Workspace)?;
        let scratch = ScratchFile::new_in(workdir.path()).map_err(ProbeError::Workspace)?;

        tracing::debug!(
            "probe session for `{}` in {}",
            compiler.command(),
            workdir.path().display()
        );

        let mut session = Session {
            compiler,
            cppflags: OrderedSet::new(),
            features: OrderedSet::new(),
            results: OrderedSet::new(),
            status: StatusOutput {
                enabled: false,
                diagnostics: false,
                sink: Box::new(io::stdout()),
            },
            scratch,
            workdir,
        };

        if let Some(flags) = env(CPPFLAGS_ENV) {
            for flag in flags.split_whitespace() {
                session.add_cppflag(flag);
            }
        }

        Ok(session)
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn cppflags(&self) -> &OrderedSet {
        &self.cppflags
    }

    /// Rendered feature lines, keyed by macro name.
    pub fn features(&self) -> &OrderedSet {
        &self.features
    }

    /// Recorded result lines in call order.
    pub fn results(&self) -> &OrderedSet {
        &self.results
    }

    /// Turn progress lines on or off. Off by default.
    pub fn enable_status_output(&mut self, enabled: bool) {
        self.status.enabled = enabled;
    }

    /// Send progress lines to `sink` instead of stdout.
    pub fn set_status_sink(&mut self, sink: Box<dyn Write + Send>) {
        self.status.sink = sink;
    }

    /// Print the compiler output under each failed check.
    pub fn show_diagnostics(&mut self, enabled: bool) {
        self.status.diagnostics = enabled;
    }

    /// Add a preprocessor flag. Returns `false` if it was already present.
    pub fn add_cppflag(&mut self, flag: &str) -> bool {
        self.cppflags.add(flag)
    }

    /// Remove a preprocessor flag. Returns `false` if it was absent.
    pub fn remove_cppflag(&mut self, flag: &str) -> bool {
        self.cppflags.remove(flag)
    }

    /// Define a feature macro, replacing an earlier definition in place.
    pub fn set_feature(&mut self, name: &str, value: Option<&str>) -> Result<(), ProbeError> {
        if !is_c_identifier(name) {
            return Err(ProbeError::invalid(
                "feature name",
                format!("`{}` is not a C identifier", name.escape_debug()),
            ));
        }
        if let Some(value) = value {
            if value.contains(['\n', '\r', '\0']) {
                return Err(ProbeError::invalid(
                    "feature value",
                    format!("value of `{}` spans multiple lines", name),
                ));
            }
        }
        let feature = FeatureMacro::new(name, value.map(str::to_string));
        self.features.insert(name, feature.render());
        Ok(())
    }

    /// Drop a feature macro entirely. Returns `false` if it was not set.
    pub fn unset_feature(&mut self, name: &str) -> bool {
        self.features.remove(name)
    }

    /// Check that `headers` can be included.
    pub fn check_header(&mut self, headers: impl Into<Headers>) -> Result<ProbeResult, ProbeError> {
        let headers = headers.into();
        if headers.is_empty() {
            return Err(ProbeError::invalid("header", "no header given"));
        }
        self.probe(headers, ProbeKind::Header)
    }

    /// Check that `func` is declared by `headers` and links.
    pub fn check_func(&mut self, headers: impl Into<Headers>, func: &str) -> Result<ProbeResult, ProbeError> {
        self.probe(headers.into(), ProbeKind::Func(func.to_string()))
    }

    /// Check that `ty` names a complete type after including `headers`.
    pub fn check_type(&mut self, headers: impl Into<Headers>, ty: &str) -> Result<ProbeResult, ProbeError> {
        self.probe(headers.into(), ProbeKind::Type(ty.to_string()))
    }

    /// Check that `name` is declared after including `headers`.
    pub fn check_decl(&mut self, headers: impl Into<Headers>, name: &str) -> Result<ProbeResult, ProbeError> {
        self.probe(headers.into(), ProbeKind::Decl(name.to_string()))
    }

    /// Check that `ty` has a member named `member`.
    pub fn check_member(
        &mut self,
        headers: impl Into<Headers>,
        ty: &str,
        member: &str,
    ) -> Result<ProbeResult, ProbeError> {
        self.probe(
            headers.into(),
            ProbeKind::Member {
                ty: ty.to_string(),
                member: member.to_string(),
            },
        )
    }

    fn probe(&mut self, headers: Headers, kind: ProbeKind) -> Result<ProbeResult, ProbeError> {
        headers.validate()?;
        kind.validate()?;

        let text = synthesize(self.features.values(), &headers, kind.fragment().as_deref());
        tracing::trace!("probe source for {}:\n{}", kind, text);
        let source = self.write_source(&text)?;

        let result = self.compiler.compile(
            source,
            &object_path(self.workdir.path()),
            &self.cppflags,
            &mut self.scratch,
        )?;

        let name = kind.macro_for(&headers);
        tracing::debug!("{} -> {}", name, if result.ok { "yes" } else { "no" });
        self.results.add(MacroLine::from_outcome(name, result.ok).render());

        let subject = match &kind {
            ProbeKind::Header => headers.display(),
            ProbeKind::Func(name) | ProbeKind::Type(name) | ProbeKind::Decl(name) => name.clone(),
            ProbeKind::Member { ty, member } => format!("{}.{}", ty, member),
        };
        self.status.report(&kind, &subject, &result);

        Ok(result)
    }

    fn write_source(&self, text: &str) -> Result<NamedTempFile, ProbeError> {
        let mut source = tempfile::Builder::new()
            .prefix("probe")
            .suffix(".c")
            .tempfile_in(self.workdir.path())
            .map_err(ProbeError::Workspace)?;
        source
            .write_all(text.as_bytes())
            .and_then(|_| source.flush())
            .map_err(|e| ProbeError::WriteSource {
                path: source.path().to_path_buf(),
                source: e,
            })?;
        Ok(source)
    }

    /// Write feature lines and result lines to `path`.
    pub fn flush(&self, path: &Path) -> Result<(), FlushError> {
        write_header(path, &self.features, &self.results)
    }

    /// Remove the work directory now, reporting failures.
    ///
    /// Dropping the session does the same, silently.
    pub fn close(self) -> io::Result<()> {
        self.scratch.close()?;
        self.workdir.close()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::util::process::find_c_compiler;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn session() -> Session {
        Session::with_env(Some("cc"), no_env).unwrap()
    }

    /// A session using whatever C compiler is installed.
    fn real_session() -> Option<Session> {
        let cc = find_c_compiler()?;
        Some(Session::with_env(Some(&*cc.to_string_lossy()), no_env).unwrap())
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_compiler_from_env() {
        let session = Session::with_env(None, |key| (key == "CC").then(|| "clang".to_string())).unwrap();
        assert_eq!(session.compiler().command(), "clang");
    }

    #[test]
    fn test_explicit_compiler_wins() {
        let session = Session::with_env(Some("gcc"), |_| Some("clang".to_string())).unwrap();
        assert_eq!(session.compiler().command(), "gcc");
    }

    #[test]
    fn test_no_compiler_is_fatal() {
        let err = Session::with_env(None, no_env).err().unwrap();
        assert!(matches!(err, ProbeError::NoCompiler { env_var: "CC" }));
    }

    #[test]
    fn test_cppflags_from_env() {
        let session = Session::with_env(Some("cc"), |key| {
            (key == CPPFLAGS_ENV).then(|| "  -I/a\t-DX  -I/a ".to_string())
        })
        .unwrap();
        assert_eq!(session.cppflags().values().collect::<Vec<_>>(), ["-I/a", "-DX"]);
    }

    #[test]
    fn test_add_cppflag_idempotent() {
        let mut session = session();
        assert!(session.add_cppflag("-I/usr/include"));
        assert!(session.add_cppflag("-Wall"));
        assert!(!session.add_cppflag("-I/usr/include"));
        assert_eq!(session.cppflags().len(), 2);
        assert_eq!(session.cppflags().position_of("-I/usr/include"), Some(1));
    }

    #[test]
    fn test_remove_absent_cppflag() {
        let mut session = session();
        session.add_cppflag("-Wall");
        assert!(!session.remove_cppflag("-Werror"));
        assert_eq!(session.cppflags().len(), 1);
    }

    #[test]
    fn test_set_feature_overwrites_in_place() {
        let mut session = session();
        session.set_feature("A", Some("1")).unwrap();
        session.set_feature("B", None).unwrap();
        session.set_feature("A", Some("2")).unwrap();

        assert_eq!(
            session.features().values().collect::<Vec<_>>(),
            ["#define A 2", "#define B"]
        );
    }

    #[test]
    fn test_unset_feature_leaves_no_trace() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.h");

        let mut session = session();
        session.set_feature("_GNU_SOURCE", None).unwrap();
        session.set_feature("NDEBUG", Some("1")).unwrap();
        assert!(session.unset_feature("NDEBUG"));
        assert!(!session.unset_feature("NDEBUG"));
        session.flush(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("#define _GNU_SOURCE\n"));
        assert!(!text.contains("NDEBUG"));
    }

    #[test]
    fn test_feature_contract_violations() {
        let mut session = session();
        assert!(session.set_feature("not valid", None).unwrap_err().is_contract_violation());
        assert!(session.set_feature("X", Some("1\n#define Y")).is_err());
    }

    #[test]
    fn test_probe_contract_violations() {
        let mut session = session();
        assert!(session.check_header(Headers::none()).unwrap_err().is_contract_violation());
        assert!(session.check_func("stdio.h", "").unwrap_err().is_contract_violation());
        assert!(session.check_member("time.h", "struct tm", "").is_err());
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_close_removes_workdir() {
        let session = session();
        let dir = session.workdir.path().to_path_buf();
        let scratch = session.scratch.path().to_path_buf();
        assert!(scratch.exists());
        session.close().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_drop_removes_workdir() {
        let session = session();
        let dir = session.workdir.path().to_path_buf();
        drop(session);
        assert!(!dir.exists());
    }

    #[test]
    fn test_sessions_do_not_share_scratch() {
        let a = session();
        let b = session();
        assert_ne!(a.scratch.path(), b.scratch.path());
        assert_ne!(a.workdir.path(), b.workdir.path());
    }

    #[test]
    fn test_check_header_found() {
        let Some(mut session) = real_session() else {
            return;
        };
        let result = session.check_header("stdio.h").unwrap();
        assert!(result.ok);
        assert_eq!(result.diagnostic, "");
        assert_eq!(
            session.results().values().collect::<Vec<_>>(),
            ["#define HAVE_STDIO_H 1"]
        );
    }

    #[test]
    fn test_check_header_missing() {
        let Some(mut session) = real_session() else {
            return;
        };
        let result = session.check_header("no_such_header_xyz.h").unwrap();
        assert!(!result.ok);
        assert!(!result.diagnostic.is_empty());
        assert!(session.results().contains("/* #undef HAVE_NO_SUCH_HEADER_XYZ_H */"));
    }

    #[test]
    fn test_diagnostics_do_not_leak_between_probes() {
        let Some(mut session) = real_session() else {
            return;
        };
        let first = session.check_header("no_such_header_aaa.h").unwrap();
        let second = session.check_header("no_such_header_bbb.h").unwrap();
        assert!(first.diagnostic.contains("no_such_header_aaa.h"));
        assert!(!second.diagnostic.contains("no_such_header_aaa.h"));
    }

    #[test]
    fn test_func_type_member_checks() {
        let Some(mut session) = real_session() else {
            return;
        };
        assert!(session.check_func("stdio.h", "printf").unwrap().ok);
        assert!(session.check_type("stddef.h", "size_t").unwrap().ok);
        assert!(session.check_decl("stdio.h", "EOF").unwrap().ok);
        assert!(session.check_member("time.h", "struct tm", "tm_year").unwrap().ok);
        assert!(!session.check_member("time.h", "struct tm", "no_such_member").unwrap().ok);
        assert!(!session.check_type("stddef.h", "no_such_type_t").unwrap().ok);

        let results: Vec<&str> = session.results().values().collect();
        assert_eq!(
            results,
            [
                "#define HAVE_PRINTF 1",
                "#define HAVE_SIZE_T 1",
                "#define HAVE_EOF 1",
                "#define HAVE_STRUCT_TM_TM_YEAR 1",
                "/* #undef HAVE_STRUCT_TM_NO_SUCH_MEMBER */",
                "/* #undef HAVE_NO_SUCH_TYPE_T */",
            ]
        );
    }

    #[test]
    fn test_func_without_header_is_missing() {
        let Some(mut session) = real_session() else {
            return;
        };
        let result = session.check_func(Headers::none(), "printf").unwrap();
        assert!(!result.ok);
        assert!(result.diagnostic.contains("printf"));
    }

    #[test]
    fn test_repeated_check_keeps_one_line_per_outcome() {
        let Some(mut session) = real_session() else {
            return;
        };
        session.check_header("stdio.h").unwrap();
        session.check_header("stdio.h").unwrap();
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn test_probe_artifacts_are_removed() {
        let Some(mut session) = real_session() else {
            return;
        };
        session.check_header("stdio.h").unwrap();
        session.check_header("no_such_header_xyz.h").unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(session.workdir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p != session.scratch.path())
            .collect();
        assert!(leftovers.is_empty(), "leftover files: {:?}", leftovers);
    }

    #[test]
    fn test_status_lines() {
        let Some(mut session) = real_session() else {
            return;
        };
        let buf = SharedBuf::default();
        session.set_status_sink(Box::new(buf.clone()));

        session.check_header("stdio.h").unwrap();
        assert_eq!(buf.contents(), "");

        session.enable_status_output(true);
        session.show_diagnostics(true);
        session.check_header("stdio.h").unwrap();
        session.check_header("no_such_header_xyz.h").unwrap();

        let out = buf.contents();
        assert!(out.starts_with("check header: stdio.h ... found\n"));
        assert!(out.contains("check header: no_such_header_xyz.h ... not found\n    "));
    }

    #[test]
    fn test_feature_macros_reach_probe() {
        let Some(mut session) = real_session() else {
            return;
        };
        session.set_feature("PROBECONF_TEST_MARKER", Some("1")).unwrap();
        assert!(session.check_decl(Headers::none(), "PROBECONF_TEST_MARKER").unwrap().ok);
        session.unset_feature("PROBECONF_TEST_MARKER");
        assert!(!session.check_decl(Headers::none(), "PROBECONF_TEST_MARKER").unwrap().ok);
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_classified_by_exit_status() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let fake = tmp.path().join("fake-cc");
        std::fs::write(&fake, "#!/bin/sh\necho \"fake: missing thing\" >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut session = Session::with_env(Some(&*fake.to_string_lossy()), no_env).unwrap();
        let result = session.check_header("stdio.h").unwrap();
        assert!(!result.ok);
        assert_eq!(result.diagnostic, "fake: missing thing\n");
        assert!(session.results().contains("/* #undef HAVE_STDIO_H */"));
    }

    #[cfg(unix)]
    #[test]
    fn test_warnings_on_success_are_discarded() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let fake = tmp.path().join("warn-cc");
        std::fs::write(&fake, "#!/bin/sh\necho \"warning: noise\" >&2\nexit 0\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut session = Session::with_env(Some(&*fake.to_string_lossy()), no_env).unwrap();
        let result = session.check_func("stdio.h", "printf").unwrap();
        assert_eq!(result, ProbeResult::found());
        assert_eq!(std::fs::metadata(session.scratch.path()).unwrap().len(), 0);
    }
}
