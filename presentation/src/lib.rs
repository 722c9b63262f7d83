//! Presentation layer for clinichat
//!
//! This crate contains the CLI definition, the console formatter,
//! and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, PolicyChoice, ResponderChoice};
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
