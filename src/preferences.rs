//! Display preferences: colour theme and gender mode

use crate::error::FitbotError;
use crate::state::Persisted;
use crate::storage::{keys, KeyValueStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Which exercise media variant to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderMode {
    #[default]
    Boys,
    Girls,
}

impl fmt::Display for GenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenderMode::Boys => write!(f, "boys"),
            GenderMode::Girls => write!(f, "girls"),
        }
    }
}

impl FromStr for GenderMode {
    type Err = FitbotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "boys" => Ok(GenderMode::Boys),
            "girls" => Ok(GenderMode::Girls),
            other => Err(FitbotError::Config(format!(
                "Unknown gender mode '{}'. Expected boys or girls",
                other
            ))),
        }
    }
}

/// Persisted display preferences
#[derive(Debug)]
pub struct Preferences {
    theme: Persisted<Theme>,
    gender_mode: Persisted<GenderMode>,
}

impl Preferences {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            theme: Persisted::load(store.clone(), keys::THEME, Theme::default()),
            gender_mode: Persisted::load(store, keys::GENDER_MODE, GenderMode::default()),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    /// Switch between light and dark; returns the new theme
    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme().toggled();
        self.theme.set(next);
        next
    }

    pub fn gender_mode(&self) -> GenderMode {
        self.gender_mode.get()
    }

    pub fn set_gender_mode(&self, mode: GenderMode) {
        self.gender_mode.set(mode);
    }
}
