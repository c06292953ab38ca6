//! Command-line argument parsing for the advisory client
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;

/// agri - Ask a farming advisor from the terminal
#[derive(Parser, Debug)]
#[command(name = "agri")]
#[command(version)]
#[command(about = "Stream practical farming advice for your question and location", long_about = None)]
pub struct Args {
    /// Question for the advisor
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Location the advice should fit (defaults to the configured location)
    #[arg(short, long)]
    pub location: Option<String>,

    /// Crop the question is about
    #[arg(long)]
    pub crop: Option<String>,

    /// Advisory API base URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Key-value store file holding the session id and theme
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (print only the reply)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start interactive mode
    Start,

    /// Clear the conversation history kept by the server
    Clear {
        /// Also forget the local session id
        #[arg(long)]
        forget: bool,
    },

    /// Show the session id (created on first use)
    Session,

    /// Show or change the display theme
    Theme {
        #[arg(value_enum)]
        choice: Option<ThemeChoice>,
    },

    /// Display current configuration
    Config,

    /// Check that the advisory API is reachable
    Doctor,
}

/// Theme argument values
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    Dark,
    Light,
    Toggle,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Check that a question and a subcommand are not combined
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_some() && self.question.is_some() {
            return Err("Cannot specify a question with a subcommand.".to_string());
        }

        Ok(())
    }

    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(base) = &self.api_base {
            config.set_base_url(base.clone());
        }
        if let Some(location) = &self.location {
            config.set_default_location(location.clone());
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show the thinking spinner
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show the per-request summary
    pub fn show_summary(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
