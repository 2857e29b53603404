//! probeconf - feature detection for C toolchains
//!
//! This crate probes a C compiler for headers, functions, types,
//! declarations and struct members by compiling small test programs, and
//! records the outcomes as `#define HAVE_...` lines in a generated header.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use crate::builder::compiler::{Compiler, ProbeResult};
pub use crate::core::{
    error::ProbeError, headers::Headers, identifier::macro_name, ordered_set::OrderedSet,
};
pub use crate::ops::flush::FlushError;
pub use crate::ops::session::Session;
