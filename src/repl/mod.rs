//! Interactive mode
//!
//! Reads questions line by line, streams each reply, and handles slash
//! commands for location, theme and session management.

pub mod commands;
pub mod display;
pub mod input;

use anyhow::Result;
use std::path::PathBuf;

use crate::execution::Advisor;
use crate::repl::commands::{is_command, Command};
use crate::repl::input::{InputHandler, InputLine};

/// Default history file: ~/.agri_advisor/history
pub fn default_history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".agri_advisor")
        .join("history")
}

/// Interactive session coordinator
pub struct ReplSession<'a> {
    advisor: &'a mut Advisor,
    input: InputHandler,
}

impl<'a> ReplSession<'a> {
    pub fn new(advisor: &'a mut Advisor, history_path: PathBuf) -> Result<Self> {
        Ok(Self {
            advisor,
            input: InputHandler::with_history(history_path)?,
        })
    }

    /// Run until /exit or Ctrl-D
    pub async fn run(&mut self) -> Result<()> {
        display::show_banner(env!("CARGO_PKG_VERSION"), self.advisor.location(), self.advisor.theme());

        loop {
            let line = match self.input.read_line()? {
                InputLine::Line(line) => line,
                InputLine::Interrupted => {
                    println!("Use /exit to quit");
                    continue;
                }
                InputLine::Eof => break,
            };

            if line.is_empty() {
                continue;
            }

            if is_command(&line) {
                if !self.handle_command(commands::parse(&line)).await? {
                    break;
                }
                continue;
            }

            // Failures were already rendered; keep the session going
            if let Err(e) = self.advisor.ask(&line, None).await {
                tracing::debug!(error = %e, "Question failed");
            }
        }

        self.input.save_history()?;
        Ok(())
    }

    /// Execute a command
    ///
    /// Returns true if the session should continue, false if it should exit
    pub async fn handle_command(&mut self, command: Command) -> Result<bool> {
        let theme = self.advisor.theme();

        match command {
            Command::Help => println!("{}", commands::help_text()),
            Command::Exit => return Ok(false),
            Command::Location { value: None } => {
                display::show_info(&format!("Location: {}", self.advisor.location()), theme);
            }
            Command::Location { value: Some(location) } => {
                self.advisor.set_location(location);
                display::show_info(&format!("Location set to {}", self.advisor.location()), theme);
            }
            Command::Theme { value } => {
                let next = value.unwrap_or_else(|| theme.toggled());
                self.advisor.set_theme(next)?;
                display::show_info(&format!("Theme: {}", next), next);
            }
            Command::Clear => match self.advisor.clear_history(false).await {
                Ok(Some(_)) => display::show_info("Conversation history cleared", theme),
                Ok(None) => display::show_info("No conversation yet", theme),
                Err(e) => display::show_error(&format!("{:#}", e)),
            },
            Command::Session => {
                display::show_info(&format!("Session: {}", self.advisor.session_id()?), theme);
            }
            Command::Unknown { input } => {
                display::show_error(&format!("Unknown command: {} (try /help)", input));
            }
        }

        Ok(true)
    }
}
