//! Built-in slash commands for interactive mode

use crate::session::Theme;

/// Interactive command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    /// Show the current location, or set a new one
    Location { value: Option<String> },
    /// Toggle, or set an explicit theme
    Theme { value: Option<Theme> },
    /// Clear server-side history for the session
    Clear,
    Session,
    Unknown { input: String },
}

/// Check if input is a command (starts with /)
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

/// Parse input string into a command
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();

    let Some(body) = trimmed.strip_prefix('/') else {
        return Command::Unknown { input: input.to_string() };
    };

    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    match name.to_lowercase().as_str() {
        "help" | "h" => Command::Help,
        "exit" | "quit" | "q" => Command::Exit,
        "location" | "loc" => Command::Location { value: argument },
        "theme" => match argument {
            None => Command::Theme { value: None },
            Some(value) => match value.parse() {
                Ok(theme) => Command::Theme { value: Some(theme) },
                Err(_) => Command::Unknown { input: input.to_string() },
            },
        },
        "clear" => Command::Clear,
        "session" => Command::Session,
        _ => Command::Unknown { input: input.to_string() },
    }
}

/// Help text listing every command
pub fn help_text() -> &'static str {
    "\
  /help               Show this help
  /location [PLACE]   Show or set the location sent with questions
  /theme [dark|light] Toggle or set the display theme
  /clear              Clear the advisor's memory of this conversation
  /session            Show the session id
  /exit               Quit"
}
