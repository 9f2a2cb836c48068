//! CLI argument parsing and command dispatch.

pub mod args;
pub mod collect;
pub mod stats;

pub use args::{Cli, Commands};
