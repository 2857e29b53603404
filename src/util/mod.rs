//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod process;
pub mod shell;

pub use config::ProbeConfig;
pub use diagnostic::Diagnostic;
