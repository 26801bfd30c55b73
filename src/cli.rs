//! Command line interface for the `tessera` binary.
//!
//! Every command goes through the public [`Index`](crate::index::Index)
//! API; nothing here touches the storage layer directly.

pub mod args;
pub mod commands;
pub mod demo;
pub mod output;

pub use args::{Command, OutputFormat, TesseraArgs};
pub use commands::execute_command;
