//! API key resolution and storage
//!
//! The Gemini key is looked up in order: `GEMINI_API_KEY`, `API_KEY`, the
//! configuration file, then the system keyring (written by `fitbot auth`)
//! unless `use_keyring` is off.

use crate::config::GeminiConfig;
use crate::error::{FitbotError, Result};

const KEYRING_SERVICE: &str = "fitbot";
const KEYRING_USER: &str = "gemini_api_key";

/// Environment variables consulted for the API key, highest priority first
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Resolve the Gemini API key, `None` when no source provides one
pub fn resolve_api_key(config: &GeminiConfig) -> Option<String> {
    resolve_api_key_with(config, stored_api_key)
}

fn resolve_api_key_with<F>(config: &GeminiConfig, keyring_lookup: F) -> Option<String>
where
    F: FnOnce() -> Option<String>,
{
    let non_empty = |value: String| {
        let trimmed = value.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    for var in API_KEY_ENV_VARS {
        if let Some(key) = std::env::var(var).ok().and_then(non_empty) {
            tracing::debug!("Using API key from {}", var);
            return Some(key);
        }
    }

    if let Some(key) = config.api_key.clone().and_then(non_empty) {
        tracing::debug!("Using API key from configuration");
        return Some(key);
    }

    if !config.use_keyring {
        tracing::debug!("Keyring lookup disabled by configuration");
        return None;
    }
    keyring_lookup().and_then(non_empty)
}

/// Read the API key stored in the system keyring
///
/// Keyring failures are logged at debug level and treated as absence.
pub fn stored_api_key() -> Option<String> {
    let entry = match keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::debug!("Keyring not available: {}", e);
            return None;
        }
    };

    match entry.get_password() {
        Ok(key) => Some(key),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            tracing::debug!("Failed to read API key from keyring: {}", e);
            None
        }
    }
}

/// Store the API key in the system keyring
///
/// # Errors
///
/// Returns `FitbotError::Keyring` if the keyring is unavailable or refuses
/// the write
pub fn store_api_key(key: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).map_err(FitbotError::from)?;
    entry.set_password(key.trim()).map_err(FitbotError::from)?;
    tracing::info!("Stored Gemini API key in the system keyring");
    Ok(())
}

/// Remove the API key from the system keyring (best-effort)
pub fn clear_api_key() -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).map_err(FitbotError::from)?;
    match entry.delete_password() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(FitbotError::from(e).into()),
    }
}
