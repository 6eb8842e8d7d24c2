//! Worker thread that owns the async runtime and executes operation jobs.

pub mod commands;
pub mod runtime;
