//! Configuration management for FitBot
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{FitbotError, Result};
use crate::reminder::Permission;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for FitBot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// AI provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Calorie and hydration tracker defaults
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Hydration notification settings
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Camera capture settings
    #[serde(default)]
    pub camera: CameraConfig,

    /// Motivational quote rotation settings
    #[serde(default)]
    pub quotes: QuotesConfig,

    /// Key-value storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Google Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; usually supplied through `GEMINI_API_KEY` instead of the file
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// API base URL (overridable for tests and local mocks)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Model used for assistant chat
    #[serde(default = "default_gemini_model")]
    pub text_model: String,

    /// Model used for food image analysis
    #[serde(default = "default_gemini_model")]
    pub vision_model: String,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    /// Fall back to the system keyring when no other source has a key
    #[serde(default = "default_use_keyring")]
    pub use_keyring: bool,
}

fn default_use_keyring() -> bool {
    true
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_gemini_api_base(),
            text_model: default_gemini_model(),
            vision_model: default_gemini_model(),
            timeout_seconds: default_request_timeout(),
            use_keyring: default_use_keyring(),
        }
    }
}

/// Tracker defaults applied when nothing has been persisted yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Daily calorie goal (kcal)
    #[serde(default = "default_calorie_goal")]
    pub calorie_goal: u32,

    /// Daily hydration goal (ml)
    #[serde(default = "default_hydration_goal")]
    pub hydration_goal: u32,

    /// Minutes between hydration reminders
    #[serde(default = "default_reminder_frequency")]
    pub reminder_frequency_minutes: u32,

    /// How long the goal celebration stays visible (milliseconds)
    #[serde(default = "default_celebration_millis")]
    pub celebration_millis: u64,
}

fn default_calorie_goal() -> u32 {
    2000
}

fn default_hydration_goal() -> u32 {
    2500
}

fn default_reminder_frequency() -> u32 {
    60
}

fn default_celebration_millis() -> u64 {
    3000
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            calorie_goal: default_calorie_goal(),
            hydration_goal: default_hydration_goal(),
            reminder_frequency_minutes: default_reminder_frequency(),
            celebration_millis: default_celebration_millis(),
        }
    }
}

/// Notification configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Pre-decided notification permission; `default` means ask the user
    #[serde(default)]
    pub permission: Permission,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Captured frames larger than this (pixels, either side) are downscaled
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_max_dimension() -> u32 {
    1024
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
        }
    }
}

/// Motivational quote configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotesConfig {
    /// Seconds between quote rotations
    #[serde(default = "default_rotation_seconds")]
    pub rotation_seconds: u64,
}

fn default_rotation_seconds() -> u64 {
    15
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            rotation_seconds: default_rotation_seconds(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database directory; the platform data directory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Seconds between store re-reads in long-running commands
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,
}

fn default_refresh_seconds() -> u64 {
    10
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            refresh_seconds: default_refresh_seconds(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FitbotError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| FitbotError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Credentials: the dedicated variable wins over the generic one
        if let Ok(key) = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("API_KEY")) {
            if !key.trim().is_empty() {
                self.provider.gemini.api_key = Some(key);
            }
        }

        if let Ok(api_base) = std::env::var("FITBOT_GEMINI_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(model) = std::env::var("FITBOT_TEXT_MODEL") {
            self.provider.gemini.text_model = model;
        }

        if let Ok(model) = std::env::var("FITBOT_VISION_MODEL") {
            self.provider.gemini.vision_model = model;
        }

        if let Ok(millis) = std::env::var("FITBOT_CELEBRATION_MILLIS") {
            if let Ok(value) = millis.parse() {
                self.tracker.celebration_millis = value;
            } else {
                tracing::warn!("Invalid FITBOT_CELEBRATION_MILLIS: {}", millis);
            }
        }

        if let Ok(permission) = std::env::var("FITBOT_NOTIFICATION_PERMISSION") {
            match permission.parse::<Permission>() {
                Ok(value) => {
                    self.notifications.permission = value;
                    tracing::debug!(%permission, "Env override: FITBOT_NOTIFICATION_PERMISSION");
                }
                Err(_) => {
                    tracing::warn!("Invalid FITBOT_NOTIFICATION_PERMISSION: {}", permission);
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(path) = &cli.storage_path {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `FitbotError::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        let gemini = &self.provider.gemini;

        let api_base = url::Url::parse(&gemini.api_base).map_err(|e| {
            FitbotError::Config(format!("Invalid gemini.api_base '{}': {}", gemini.api_base, e))
        })?;
        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(FitbotError::Config(format!(
                "gemini.api_base must use http or https, got {}",
                api_base.scheme()
            ))
            .into());
        }

        if gemini.text_model.trim().is_empty() || gemini.vision_model.trim().is_empty() {
            return Err(
                FitbotError::Config("Gemini model names cannot be empty".to_string()).into(),
            );
        }

        if gemini.timeout_seconds == 0 {
            return Err(
                FitbotError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.tracker.reminder_frequency_minutes == 0 {
            return Err(FitbotError::Config(
                "tracker.reminder_frequency_minutes must be greater than 0".to_string(),
            )
            .into());
        }

        if self.tracker.celebration_millis == 0 {
            return Err(FitbotError::Config(
                "tracker.celebration_millis must be greater than 0".to_string(),
            )
            .into());
        }

        if self.quotes.rotation_seconds == 0 {
            return Err(FitbotError::Config(
                "quotes.rotation_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.storage.refresh_seconds == 0 {
            return Err(FitbotError::Config(
                "storage.refresh_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.camera.max_dimension < 64 {
            return Err(FitbotError::Config(
                "camera.max_dimension must be at least 64".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
