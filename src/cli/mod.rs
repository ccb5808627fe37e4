//! CLI module - Command-line interface for YaMDb
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// YaMDb - reviews of books, films and music
#[derive(Parser)]
#[command(name = "yamdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP API server (default)
    Serve,

    /// Create an admin account, or promote an existing one, and print its
    /// confirmation code
    CreateAdmin {
        /// Username of the account
        username: String,
        /// Email address of the account
        email: String,
    },

    /// Create default config file
    #[command(alias = "init")]
    InitConfig,
}

pub use commands::*;
