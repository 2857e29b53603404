//! Mapping of C identifiers and header paths to macro names.

/// Join `parts` with `_`, uppercase, and replace anything outside
/// `[A-Za-z0-9_]` with `_`.
///
/// No collision handling: `sys/types.h` and `sys_types.h` both map to
/// `SYS_TYPES_H`.
pub fn macro_name<S: AsRef<str>>(parts: &[S]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push('_');
        }
        out.extend(part.as_ref().chars().map(normalize_char));
    }
    out
}

fn normalize_char(c: char) -> char {
    if c.is_ascii_alphanumeric() || c == '_' {
        c.to_ascii_uppercase()
    } else {
        '_'
    }
}

/// The `HAVE_` macro recorded for a probe of `parts`.
pub fn have_macro<S: AsRef<str>>(parts: &[S]) -> String {
    format!("HAVE_{}", macro_name(parts))
}

/// Whether `name` is usable as a C identifier (and thus a macro name).
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names() {
        assert_eq!(macro_name(&["sys/types.h"]), "SYS_TYPES_H");
        assert_eq!(macro_name(&["stdio.h"]), "STDIO_H");
        assert_eq!(macro_name(&["linux/if-tun.h"]), "LINUX_IF_TUN_H");
    }

    #[test]
    fn test_type_and_member() {
        assert_eq!(macro_name(&["struct sockaddr"]), "STRUCT_SOCKADDR");
        assert_eq!(
            macro_name(&["struct sockaddr", "sa_family"]),
            "STRUCT_SOCKADDR_SA_FAMILY"
        );
    }

    #[test]
    fn test_non_ascii_is_replaced() {
        assert_eq!(macro_name(&["café.h"]), "CAF__H");
    }

    #[test]
    fn test_collisions_are_not_resolved() {
        assert_eq!(macro_name(&["sys/types.h"]), macro_name(&["sys_types.h"]));
    }

    #[test]
    fn test_have_macro() {
        assert_eq!(have_macro(&["no_such_header_xyz.h"]), "HAVE_NO_SUCH_HEADER_XYZ_H");
    }

    #[test]
    fn test_is_c_identifier() {
        assert!(is_c_identifier("_GNU_SOURCE"));
        assert!(is_c_identifier("x1"));
        assert!(!is_c_identifier("1x"));
        assert!(!is_c_identifier(""));
        assert!(!is_c_identifier("A B"));
    }
}
