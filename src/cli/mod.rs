//! CLI module for the advisory client
//! 
//! Handles command-line argument parsing.

pub mod args;

pub use args::{Args, Commands, ThemeChoice, Verbosity};
