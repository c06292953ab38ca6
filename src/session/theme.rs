// Display theme preference
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AdvisorError, Result};
use crate::store::{KeyValueStore, THEME_KEY};

/// Terminal color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Load the stored preference; missing or unknown values fall back to dark
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let theme = store
            .get(THEME_KEY)?
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        Ok(theme)
    }

    /// Persist this preference
    pub fn save(self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(THEME_KEY, self.as_str())
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(AdvisorError::Config(format!(
                "Unknown theme '{}': expected 'dark' or 'light'",
                other
            ))),
        }
    }
}
