//! Command implementations

pub mod check;
pub mod completions;
pub mod macro_name;
pub mod run;
