//! Application lifecycle and execution modes

pub mod modes;
