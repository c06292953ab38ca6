//! Shared advisory session for CLI and interactive modes
//!
//! Wires the configured transport, the key-value store and the terminal
//! renderer into one query client, so a one-shot question and an
//! interactive session behave the same way.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::cli::Verbosity;
use crate::config::Config;
use crate::errors::AdvisorError;
use crate::query::StreamingQueryClient;
use crate::repl::display::{self, theme_handle, ReplyRenderer, ThemeHandle};
use crate::session::{SessionIdentity, Theme};
use crate::store::KeyValueStore;
use crate::streaming::AdvisorHttpClient;
use crate::types::{Query, Reply, Submission};

/// Advisory session state shared by the one-shot and interactive modes
pub struct Advisor {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    http: AdvisorHttpClient,
    client: StreamingQueryClient,
    theme: ThemeHandle,
    verbosity: Verbosity,
}

impl Advisor {
    /// Build the advisor from configuration and a store
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>, verbosity: Verbosity) -> Result<Self> {
        config.validate()?;

        let http = AdvisorHttpClient::with_config(&config.api.base_url, config.connect_timeout())
            .context("Failed to create HTTP client")?;

        let theme = theme_handle(Theme::load(store.as_ref())?);
        let renderer = ReplyRenderer::new(theme.clone(), verbosity.show_progress());

        let client = StreamingQueryClient::new(Arc::new(http.clone()), Arc::clone(&store))
            .with_observer(renderer);

        Ok(Self {
            config,
            store,
            http,
            client,
            theme,
            verbosity,
        })
    }

    /// Ask a question for the current location
    ///
    /// The reply is rendered while it streams. Returns `Ok(None)` when the
    /// question was blank and nothing was sent.
    pub async fn ask(&mut self, question: &str, crop: Option<&str>) -> std::result::Result<Option<Reply>, AdvisorError> {
        let mut query = Query::new(question, self.config.defaults.location.as_str());
        if let Some(crop) = crop {
            query = query.with_crop(crop);
        }

        match self.client.submit_query(query).await? {
            Submission::Skipped => Ok(None),
            Submission::Completed(reply) => {
                if self.verbosity.show_summary() {
                    display::show_summary(&reply, self.theme());
                }
                Ok(Some(reply))
            }
        }
    }

    /// Location sent with each question
    pub fn location(&self) -> &str {
        &self.config.defaults.location
    }

    pub fn set_location(&mut self, location: String) {
        self.config.set_default_location(location);
    }

    /// Current display theme
    pub fn theme(&self) -> Theme {
        self.theme.lock().map(|theme| *theme).unwrap_or_default()
    }

    /// Switch and persist the display theme
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        theme.save(self.store.as_ref())?;
        if let Ok(mut current) = self.theme.lock() {
            *current = theme;
        }
        Ok(())
    }

    /// Session identifier, created on first use
    pub fn session_id(&self) -> Result<String> {
        Ok(SessionIdentity::resolve(self.store.as_ref())?)
    }

    /// Clear the server-side conversation for this session
    ///
    /// Returns the cleared session id, or `None` when no session exists yet.
    /// With `forget`, the local session id is dropped as well.
    pub async fn clear_history(&self, forget: bool) -> Result<Option<String>> {
        let Some(session_id) = SessionIdentity::current(self.store.as_ref())? else {
            return Ok(None);
        };

        self.http
            .clear_history(&session_id)
            .await
            .context("Failed to clear server history")?;

        if forget {
            SessionIdentity::forget(self.store.as_ref())?;
        }

        Ok(Some(session_id))
    }

    /// Check that the advisory API answers
    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.http.health_check().await?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Status of the underlying query client
    pub fn client(&self) -> &StreamingQueryClient {
        &self.client
    }
}
