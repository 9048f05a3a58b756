//! CLI subcommands.

pub mod export;
