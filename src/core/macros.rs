//! Macro lines written to the generated header.

use std::fmt;

/// A user-declared `#define` included in every probe and in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureMacro {
    pub name: String,
    pub value: Option<String>,
}

impl FeatureMacro {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        FeatureMacro {
            name: name.into(),
            value,
        }
    }

    /// Render as `#define NAME[ VALUE]`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FeatureMacro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "#define {} {}", self.name, value),
            None => write!(f, "#define {}", self.name),
        }
    }
}

/// The recorded outcome of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroLine {
    /// `#define NAME 1`
    Defined(String),
    /// `/* #undef NAME */`
    Undefined(String),
}

impl MacroLine {
    pub fn from_outcome(name: impl Into<String>, ok: bool) -> Self {
        if ok {
            MacroLine::Defined(name.into())
        } else {
            MacroLine::Undefined(name.into())
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MacroLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroLine::Defined(name) => write!(f, "#define {} 1", name),
            MacroLine::Undefined(name) => write!(f, "/* #undef {} */", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_render() {
        assert_eq!(
            FeatureMacro::new("_GNU_SOURCE", None).render(),
            "#define _GNU_SOURCE"
        );
        assert_eq!(
            FeatureMacro::new("_FILE_OFFSET_BITS", Some("64".into())).render(),
            "#define _FILE_OFFSET_BITS 64"
        );
    }

    #[test]
    fn test_macro_line_render() {
        assert_eq!(
            MacroLine::from_outcome("HAVE_STDIO_H", true).render(),
            "#define HAVE_STDIO_H 1"
        );
        assert_eq!(
            MacroLine::from_outcome("HAVE_XYZ_H", false).render(),
            "/* #undef HAVE_XYZ_H */"
        );
    }
}
