//! Terminal rendering of streamed replies
//!
//! Shows a "Thinking..." spinner until the first token arrives, then writes
//! each token to stdout as it streams in. The reply is markdown and is
//! printed verbatim; colors for the surrounding chrome follow the theme.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::query::{QueryEvent, ReplyObserver};
use crate::session::Theme;
use crate::types::Reply;

/// Shared, switchable theme
pub type ThemeHandle = Arc<Mutex<Theme>>;

/// Create a theme handle
pub fn theme_handle(theme: Theme) -> ThemeHandle {
    Arc::new(Mutex::new(theme))
}

fn current_theme(handle: &ThemeHandle) -> Theme {
    handle.lock().map(|theme| *theme).unwrap_or_default()
}

/// Color a chrome string for the theme
///
/// Dark terminals get bright accents, light terminals darker ones.
pub fn accent(text: &str, theme: Theme) -> ColoredString {
    if theme.is_dark() {
        text.bright_green()
    } else {
        text.green()
    }
}

/// Color a secondary string for the theme
pub fn muted(text: &str, theme: Theme) -> ColoredString {
    if theme.is_dark() {
        text.bright_black()
    } else {
        text.dimmed()
    }
}

/// Renders reply events to the terminal
pub struct ReplyRenderer {
    theme: ThemeHandle,
    show_progress: bool,
    spinner: Option<ProgressBar>,
    wrote_tokens: bool,
}

impl ReplyRenderer {
    /// Create renderer
    ///
    /// `show_progress` false suppresses the spinner (quiet mode).
    pub fn new(theme: ThemeHandle, show_progress: bool) -> Self {
        Self {
            theme,
            show_progress,
            spinner: None,
            wrote_tokens: false,
        }
    }

    fn start_spinner(&mut self) {
        self.finish_spinner();
        if !self.show_progress {
            return;
        }

        let pb = ProgressBar::new_spinner();
        let template = if current_theme(&self.theme).is_dark() {
            "{spinner:.green} {msg}"
        } else {
            "{spinner:.blue} {msg}"
        };
        if let Ok(style) = ProgressStyle::default_spinner().template(template) {
            pb.set_style(style);
        }
        pb.set_message("Thinking...");
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    fn finish_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Display streaming tokens
    fn stream_token(&mut self, token: &str) {
        self.finish_spinner();
        print!("{}", token);
        let _ = io::stdout().flush();
        self.wrote_tokens = true;
    }
}

impl ReplyObserver for ReplyRenderer {
    fn on_event(&mut self, event: &QueryEvent) {
        let theme = current_theme(&self.theme);

        match event {
            QueryEvent::Started { .. } => {
                self.wrote_tokens = false;
                self.start_spinner();
            }
            QueryEvent::Token { token, .. } => self.stream_token(token),
            QueryEvent::ServerError { message } => {
                self.finish_spinner();
                eprintln!("\n{} {}", "Advisor error:".yellow().bold(), message.yellow());
            }
            QueryEvent::Finished { .. } => {
                self.finish_spinner();
                if self.wrote_tokens {
                    println!();
                } else {
                    println!("{}", muted("No advice was returned.", theme));
                }
            }
            QueryEvent::Failed { error, reply } => {
                self.finish_spinner();
                if !reply.is_empty() {
                    println!();
                }
                eprintln!("{} {}", "✗".red(), error.red());
            }
        }
    }
}

impl Drop for ReplyRenderer {
    fn drop(&mut self) {
        self.finish_spinner();
    }
}

/// Show the one-line request summary
pub fn show_summary(reply: &Reply, theme: Theme) {
    println!("{} {}", accent("✓", theme), muted(&reply.summary(), theme));
}

/// Show welcome banner
pub fn show_banner(version: &str, location: &str, theme: Theme) {
    let width = 64;
    let rule = "=".repeat(width);

    println!("\n{}", accent(&rule, theme));
    println!("{}", accent(&format!("  Agri Advisor {}", version), theme).bold());
    println!("{}", muted(&format!("  Location: {} | Theme: {}", location, theme), theme));
    println!("{}\n", accent(&rule, theme));
    println!(
        "Ask a question (or {} for commands, {} to quit)\n",
        accent("/help", theme),
        accent("/exit", theme)
    );
}

/// Display info message
pub fn show_info(info: &str, theme: Theme) {
    println!("{} {}", accent("→", theme), info);
}

/// Display error message
pub fn show_error(error: &str) {
    eprintln!("{} {}", "Error:".red().bold(), error.red());
}
