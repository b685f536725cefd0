//! CLI module - Command-line interface for Rotarr
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Rotarr - password rotation for Solace broker CLI accounts
#[derive(Parser)]
#[command(name = "rotarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as background daemon with scheduler and optional API server
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,

    /// Run a single sweep, rotating every due account
    ///
    /// Do not run while `rotarr daemon` is using the same database: the
    /// rotation lock only covers a single process.
    Tick,

    /// Rotate an account's password now
    ///
    /// Do not run while `rotarr daemon` is using the same database: the
    /// rotation lock only covers a single process.
    /// Use `POST /api/rotate/{name}` against a running daemon instead.
    Rotate {
        /// Account name
        name: String,
    },

    /// Print the current credentials of an account
    Creds {
        /// Account name
        name: String,
    },

    /// Manage broker targets
    ///
    /// Do not run while `rotarr daemon` is using the same database: the
    /// rotation lock only covers a single process.
    Target {
        #[command(subcommand)]
        command: TargetCommands,
    },

    /// Manage rotated accounts
    ///
    /// Do not run while `rotarr daemon` is using the same database: the
    /// rotation lock only covers a single process.
    /// Use the `/api/accounts` endpoints against a running daemon instead.
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

#[derive(Subcommand)]
pub enum TargetCommands {
    /// Create or update a target
    Set {
        /// Target name
        name: String,
        /// Base URL of the SEMP interface, e.g. https://broker:943
        #[arg(long)]
        url: Option<String>,
        /// Admin username
        #[arg(long)]
        username: Option<String>,
        /// Admin password
        #[arg(long)]
        password: Option<String>,
        /// SEMP version tag; pass an empty string to clear it
        #[arg(long)]
        semp_version: Option<String>,
        /// Skip TLS certificate verification
        #[arg(long)]
        tls_skip_verify: Option<bool>,
    },
    /// Show a target
    Get {
        /// Target name
        name: String,
    },
    /// List targets
    #[command(alias = "ls")]
    List,
    /// Delete a target
    #[command(alias = "rm")]
    Delete {
        /// Target name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create or update an account
    Set {
        /// Account name
        name: String,
        /// Name of the target the account lives on
        #[arg(long)]
        target: Option<String>,
        /// Username on the broker
        #[arg(long)]
        username: Option<String>,
        /// Seconds between automatic rotations; 0 disables them
        #[arg(long)]
        rotation_period: Option<u64>,
        /// Generated password length (16-128)
        #[arg(long)]
        password_length: Option<usize>,
    },
    /// Show an account
    Get {
        /// Account name
        name: String,
    },
    /// List accounts
    #[command(alias = "ls")]
    List,
    /// Delete an account
    #[command(alias = "rm")]
    Delete {
        /// Account name
        name: String,
    },
}

pub use commands::*;
