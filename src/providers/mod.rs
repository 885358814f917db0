//! Provider module for FitBot
//!
//! This module contains the generative AI provider abstraction and the
//! Google Gemini implementation.

pub mod base;
pub mod gemini;

pub use base::{GenerateRequest, Part, Provider};
pub use gemini::GeminiProvider;

use crate::config::ProviderConfig;
use crate::credentials;
use crate::error::{FitbotError, Result};

/// Create a provider instance based on configuration
///
/// The API key is resolved through [`credentials::resolve_api_key`].
///
/// # Errors
///
/// Returns `FitbotError::MissingCredentials` when no API key is available,
/// or a provider error if the client cannot be built
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    let api_key = credentials::resolve_api_key(&config.gemini)
        .ok_or_else(|| FitbotError::MissingCredentials("gemini".to_string()))?;

    Ok(Box::new(GeminiProvider::new(config.gemini.clone(), api_key)?))
}
