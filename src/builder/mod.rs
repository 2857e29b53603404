//! Probe construction and compilation.

pub mod compiler;
pub mod probe;

pub use compiler::{Compiler, ProbeResult, ScratchFile};
pub use probe::{synthesize, ProbeKind};
