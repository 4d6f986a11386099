//! CLI module for retouch.
//!
//! Provides command-line interface parsing and command dispatch. Every
//! command is a thin client of the library: it touches the sentinel or runs
//! a coordinator.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
