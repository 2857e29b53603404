//! The header list a probe includes.

use serde::{Deserialize, Serialize};

use super::error::ProbeError;

/// Headers to `#include` in a probe, in order.
///
/// A lone header converts into a one-element list, so call sites can pass
/// `"stdio.h"`, `["sys/types.h", "sys/socket.h"]`, or `Headers::none()`.
/// In config files the same shapes are accepted: a string or a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HeaderSpec", into = "Vec<String>")]
pub struct Headers(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum HeaderSpec {
    One(String),
    Many(Vec<String>),
}

impl From<HeaderSpec> for Headers {
    fn from(spec: HeaderSpec) -> Self {
        match spec {
            HeaderSpec::One(h) => Headers(vec![h]),
            HeaderSpec::Many(hs) => Headers(hs),
        }
    }
}

impl From<Headers> for Vec<String> {
    fn from(headers: Headers) -> Self {
        headers.0
    }
}

impl Headers {
    /// No headers.
    pub fn none() -> Self {
        Headers(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable form for status lines: `a.h, b.h`.
    pub fn display(&self) -> String {
        self.0.join(", ")
    }

    /// Reject header names that cannot appear inside `#include <...>`.
    pub fn validate(&self) -> Result<(), ProbeError> {
        for header in &self.0 {
            if header.trim().is_empty() {
                return Err(ProbeError::invalid("header", "header name is empty"));
            }
            if header.contains(['\n', '\r', '\0', '<', '>']) {
                return Err(ProbeError::invalid(
                    "header",
                    format!("`{}` contains characters not allowed in #include", header.escape_debug()),
                ));
            }
        }
        Ok(())
    }
}

impl From<&str> for Headers {
    fn from(header: &str) -> Self {
        Headers(vec![header.to_string()])
    }
}

impl From<String> for Headers {
    fn from(header: String) -> Self {
        Headers(vec![header])
    }
}

impl From<Vec<String>> for Headers {
    fn from(headers: Vec<String>) -> Self {
        Headers(headers)
    }
}

impl From<&[&str]> for Headers {
    fn from(headers: &[&str]) -> Self {
        Headers(headers.iter().map(|h| h.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Headers {
    fn from(headers: [&str; N]) -> Self {
        Headers(headers.iter().map(|h| h.to_string()).collect())
    }
}

impl<T: Into<Headers>> From<Option<T>> for Headers {
    fn from(headers: Option<T>) -> Self {
        headers.map(Into::into).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_header_is_one_element_list() {
        let headers = Headers::from("stdio.h");
        assert_eq!(headers.iter().collect::<Vec<_>>(), ["stdio.h"]);
    }

    #[test]
    fn test_none() {
        let headers: Headers = None::<&str>.into();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_deserialize_string_or_list() {
        #[derive(Deserialize)]
        struct Doc {
            a: Headers,
            b: Headers,
        }
        let doc: Doc = toml::from_str("a = \"stdio.h\"\nb = [\"sys/types.h\", \"unistd.h\"]").unwrap();
        assert_eq!(doc.a, Headers::from("stdio.h"));
        assert_eq!(doc.b, Headers::from(["sys/types.h", "unistd.h"]));
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        assert!(Headers::from("").validate().is_err());
        assert!(Headers::from("a.h>\n#include <b.h").validate().is_err());
        assert!(Headers::from(["ok.h", "  "]).validate().is_err());
        assert!(Headers::from("sys/types.h").validate().is_ok());
    }
}
