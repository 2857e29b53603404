//! Configuration files.
//!
//! Two files are read:
//! - Checks: `probeconf.toml` (or the path given on the command line) -
//!   the feature macros, cppflags, and the list of checks to run.
//! - User defaults: `~/.probeconf/config.toml` - compiler and flags used
//!   when the checks file does not name them.
//!
//! Values in the checks file take precedence over user defaults.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::headers::Headers;
use crate::core::identifier::is_c_identifier;

/// Default checks file name.
pub const DEFAULT_CONFIG_FILE: &str = "probeconf.toml";

/// Default generated header name.
pub const DEFAULT_OUTPUT: &str = "config.h";

/// A checks file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Generated header path, relative to the checks file
    pub output: Option<PathBuf>,

    /// Compiler command (e.g. `cc`, `clang`, `ccache gcc`)
    pub compiler: Option<String>,

    /// Extra preprocessor flags, in order
    pub cppflags: Vec<String>,

    /// Print compiler output under failed checks
    pub show_diagnostics: Option<bool>,

    /// Feature macros, in file order
    pub features: toml::Table,

    /// Checks, run in file order
    #[serde(rename = "check")]
    pub checks: Vec<CheckEntry>,
}

/// One `[[check]]` block.
///
/// If `header` is given it is checked first, and the remaining probes run
/// only when it is found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckEntry {
    pub header: Option<Headers>,
    pub funcs: Vec<String>,
    pub types: Vec<String>,
    pub decls: Vec<String>,
    pub members: Vec<MemberCheck>,
}

/// `{ type = "struct stat", member = "st_mtim" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberCheck {
    #[serde(rename = "type")]
    pub ty: String,
    pub member: String,
}

/// How a `[features]` entry is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureSetting {
    /// `#define NAME[ VALUE]`
    Define(Option<String>),
    /// Removed from the feature set
    Unset,
}

impl CheckEntry {
    /// Number of probes in this entry, the header included.
    pub fn probe_count(&self) -> usize {
        usize::from(self.header.is_some())
            + self.funcs.len()
            + self.types.len()
            + self.decls.len()
            + self.members.len()
    }

    /// Short description for error messages.
    fn describe(&self, index: usize) -> String {
        match &self.header {
            Some(h) => format!("check #{} ({})", index + 1, h.display()),
            None => format!("check #{}", index + 1),
        }
    }
}

impl ProbeConfig {
    /// Load and validate a checks file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config = Self::parse(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate checks file contents.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: ProbeConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check names and shapes that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.feature_settings()?;

        for flag in &self.cppflags {
            if flag.trim().is_empty() {
                bail!("cppflags: empty flag");
            }
        }

        for (i, check) in self.checks.iter().enumerate() {
            let what = check.describe(i);
            if check.probe_count() == 0 {
                bail!("{}: nothing to check", what);
            }
            if let Some(ref headers) = check.header {
                if headers.is_empty() {
                    bail!("{}: `header` list is empty", what);
                }
                headers.validate().with_context(|| what.clone())?;
            }
            let names = check
                .funcs
                .iter()
                .chain(&check.types)
                .chain(&check.decls)
                .chain(check.members.iter().flat_map(|m| [&m.ty, &m.member]));
            for name in names {
                if name.trim().is_empty() {
                    bail!("{}: empty name", what);
                }
            }
        }

        Ok(())
    }

    /// Feature macros in file order.
    ///
    /// `true` defines without a value, `false` unsets, and strings, integers
    /// and floats become the macro value.
    pub fn feature_settings(&self) -> Result<Vec<(String, FeatureSetting)>> {
        let mut settings = Vec::with_capacity(self.features.len());
        for (name, value) in &self.features {
            if !is_c_identifier(name) {
                bail!("features: `{}` is not a valid macro name", name);
            }
            let setting = match value {
                toml::Value::Boolean(true) => FeatureSetting::Define(None),
                toml::Value::Boolean(false) => FeatureSetting::Unset,
                toml::Value::Integer(n) => FeatureSetting::Define(Some(n.to_string())),
                toml::Value::Float(f) => FeatureSetting::Define(Some(f.to_string())),
                toml::Value::String(s) if s.contains(['\n', '\r']) => {
                    bail!("features: value of `{}` spans multiple lines", name)
                }
                toml::Value::String(s) => FeatureSetting::Define(Some(s.clone())),
                other => bail!(
                    "features: `{}` must be a boolean, number or string, found {}",
                    name,
                    other.type_str()
                ),
            };
            settings.push((name.clone(), setting));
        }
        Ok(settings)
    }

    /// Fill unset values from user defaults.
    ///
    /// Default cppflags come before the file's own.
    pub fn apply_defaults(&mut self, defaults: &Defaults) {
        if self.compiler.is_none() {
            self.compiler = defaults.compiler.clone();
        }
        if self.show_diagnostics.is_none() {
            self.show_diagnostics = defaults.show_diagnostics;
        }
        if !defaults.cppflags.is_empty() {
            let mut flags = defaults.cppflags.clone();
            flags.append(&mut self.cppflags);
            self.cppflags = flags;
        }
    }

    /// Output path, resolved against the checks file's directory.
    pub fn output_path(&self, config_path: &Path) -> PathBuf {
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        match config_path.parent() {
            Some(dir) if output.is_relative() => dir.join(output),
            _ => output,
        }
    }
}

/// User-wide settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub defaults: Defaults,
}

/// `[defaults]` in the user config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub compiler: Option<String>,
    pub cppflags: Vec<String>,
    pub show_diagnostics: Option<bool>,
}

impl UserConfig {
    /// Load user configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load user configuration, falling back to defaults if missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}

/// Get the user config directory (~/.probeconf).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".probeconf"))
}

/// Get the user config path (~/.probeconf/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load the checks file and merge user defaults beneath it.
pub fn load_config(config_path: &Path, user_path: Option<&Path>) -> Result<ProbeConfig> {
    let mut config = ProbeConfig::load(config_path)?;
    if let Some(user_path) = user_path {
        let user = UserConfig::load_or_default(user_path);
        config.apply_defaults(&user.defaults);
    }
    Ok(config)
}
