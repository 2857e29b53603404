//! Probe translation units.
//!
//! Every probe is a complete C program: the feature macros, the headers
//! under test, and a `main` whose body references the symbol being probed.
//! The program compiles only when the symbol is visible.

use std::fmt;

use crate::core::error::ProbeError;
use crate::core::headers::Headers;
use crate::core::identifier::have_macro;

/// What a probe tests for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeKind {
    /// The headers themselves can be included.
    Header,
    /// A function can be referenced and linked.
    Func(String),
    /// A type can be used to declare a variable.
    Type(String),
    /// An identifier (macro, enum constant, variable or function) is declared.
    Decl(String),
    /// A struct/union type has the named member.
    Member { ty: String, member: String },
}

impl ProbeKind {
    /// Short label used in status lines.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeKind::Header => "header",
            ProbeKind::Func(_) => "func",
            ProbeKind::Type(_) => "type",
            ProbeKind::Decl(_) => "decl",
            ProbeKind::Member { .. } => "member",
        }
    }

    /// The statement placed in `main`, without the trailing `;`.
    pub fn fragment(&self) -> Option<String> {
        match self {
            ProbeKind::Header => None,
            ProbeKind::Func(func) => Some(format!(
                "void (*function_pointer)(void) = (void (*)(void)){}",
                func
            )),
            ProbeKind::Type(ty) => Some(format!("{} x", ty)),
            ProbeKind::Decl(name) => Some(format!("(void){}", name)),
            ProbeKind::Member { ty, member } => Some(format!("{} x; (void)x.{}", ty, member)),
        }
    }

    /// The `HAVE_` macro recording this probe's outcome.
    pub fn macro_for(&self, headers: &Headers) -> String {
        match self {
            ProbeKind::Header => {
                let parts: Vec<&str> = headers.iter().collect();
                have_macro(&parts)
            }
            ProbeKind::Func(name) | ProbeKind::Type(name) | ProbeKind::Decl(name) => {
                have_macro(&[name])
            }
            ProbeKind::Member { ty, member } => have_macro(&[ty, member]),
        }
    }

    /// Reject identifiers that would not form a single C expression.
    pub fn validate(&self) -> Result<(), ProbeError> {
        match self {
            ProbeKind::Header => Ok(()),
            ProbeKind::Func(name) => check_identifier("function name", name),
            ProbeKind::Type(name) => check_identifier("type name", name),
            ProbeKind::Decl(name) => check_identifier("declaration name", name),
            ProbeKind::Member { ty, member } => {
                check_identifier("type name", ty)?;
                check_identifier("member name", member)
            }
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::Header => write!(f, "header"),
            ProbeKind::Func(name) => write!(f, "func {}", name),
            ProbeKind::Type(name) => write!(f, "type {}", name),
            ProbeKind::Decl(name) => write!(f, "decl {}", name),
            ProbeKind::Member { ty, member } => write!(f, "member {}.{}", ty, member),
        }
    }
}

fn check_identifier(what: &'static str, name: &str) -> Result<(), ProbeError> {
    if name.trim().is_empty() {
        return Err(ProbeError::invalid(what, "name is empty"));
    }
    if name.contains(['\n', '\r', '\0', ';', '{', '}']) {
        return Err(ProbeError::invalid(
            what,
            format!("`{}` is not a C identifier", name.escape_debug()),
        ));
    }
    Ok(())
}

/// Build the probe source.
///
/// ```text
/// <feature lines>
///
/// #include <H1>
/// #include <H2>
///
/// int main() {
///     <fragment>;
///     return 0;
/// }
/// ```
pub fn synthesize<'a>(
    feature_lines: impl IntoIterator<Item = &'a str>,
    headers: &Headers,
    fragment: Option<&str>,
) -> String {
    let features: Vec<&str> = feature_lines.into_iter().collect();
    let includes: Vec<String> = headers.iter().map(|h| format!("#include <{}>", h)).collect();

    format!(
        "{}\n\n{}\n\nint main() {{\n    {};\n    return 0;\n}}\n",
        features.join("\n"),
        includes.join("\n"),
        fragment.unwrap_or_default()
    )
}
