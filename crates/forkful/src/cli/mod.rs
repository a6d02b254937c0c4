//! Command handlers for the `forkful` binary.

pub mod analyze;
pub mod config;
pub mod interactive;
