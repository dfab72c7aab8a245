//! Subcommand implementations.

pub mod migrate;
