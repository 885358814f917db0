//! Error types for FitBot
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for FitBot operations
///
/// Every failure in FitBot degrades a single feature; callers decide whether
/// to surface the error inline or convert it to a user-facing string.
#[derive(Error, Debug)]
pub enum FitbotError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, unexpected responses)
    #[error("Provider error: {0}")]
    Provider(String),

    /// No API key could be found for the AI provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Food image analysis failed (request, remote or parse failure)
    ///
    /// Distinct from a successful analysis that found no food.
    #[error("{0}")]
    FoodAnalysis(String),

    /// Camera acquisition or frame capture errors
    #[error("Camera error: {0}")]
    Camera(String),

    /// Notification permission or delivery errors
    #[error("Notification error: {0}")]
    Notification(String),

    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Exercise catalog lookup or parse errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Image decoding/encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for FitBot operations
///
/// Uses `anyhow::Error` so context can be attached while propagating;
/// typed kinds are recovered with `downcast_ref::<FitbotError>()`.
pub type Result<T> = anyhow::Result<T>;
