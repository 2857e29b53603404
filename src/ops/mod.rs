//! High-level operations: sessions, config runs, header output.

pub mod configure;
pub mod flush;
pub mod session;

pub use configure::Summary;
pub use session::Session;
