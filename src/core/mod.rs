//! Core data types: ordered sets, macro naming, header lists, errors.

pub mod error;
pub mod headers;
pub mod identifier;
pub mod macros;
pub mod ordered_set;

pub use error::ProbeError;
pub use headers::Headers;
pub use macros::{FeatureMacro, MacroLine};
pub use ordered_set::OrderedSet;
