//! System utilities
//!
//! Process-level concerns shared by every execution mode.

pub mod logging;

pub use logging::init_logging;
