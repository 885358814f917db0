//! Theme, gender mode and API key commands

use super::print_inline_error;
use crate::app::App;
use crate::cli::AuthCommand;
use crate::config::GeminiConfig;
use crate::credentials::{self, API_KEY_ENV_VARS};
use crate::error::Result;
use crate::preferences::GenderMode;
use colored::Colorize;
use rustyline::DefaultEditor;

/// Flip between light and dark
pub fn toggle_theme(app: &App) -> Result<()> {
    let theme = app.preferences.toggle_theme();
    println!("Theme set to {}", theme.to_string().bold());
    Ok(())
}

/// Show the gender mode, or set it when `mode` is given
pub fn handle_gender(app: &App, mode: Option<String>) -> Result<()> {
    match mode {
        None => println!("Gender mode: {}", app.preferences.gender_mode()),
        Some(mode) => match mode.parse::<GenderMode>() {
            Ok(mode) => {
                app.preferences.set_gender_mode(mode);
                println!("Gender mode set to {}", mode.to_string().bold());
            }
            Err(e) => print_inline_error(&e.to_string()),
        },
    }
    Ok(())
}

/// Where the active API key comes from
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeySource {
    Env(&'static str),
    Config,
    Keyring,
}

fn key_source(config: &GeminiConfig, keyring_has_key: bool) -> Option<KeySource> {
    for var in API_KEY_ENV_VARS {
        if std::env::var(var).map_or(false, |v| !v.trim().is_empty()) {
            return Some(KeySource::Env(var));
        }
    }
    if config
        .api_key
        .as_deref()
        .map_or(false, |key| !key.trim().is_empty())
    {
        return Some(KeySource::Config);
    }
    (config.use_keyring && keyring_has_key).then_some(KeySource::Keyring)
}

/// Dispatch an `auth` subcommand
pub fn handle_auth(app: &App, command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::Login { key } => {
            let key = match key {
                Some(key) => key,
                None => {
                    let mut rl = DefaultEditor::new()?;
                    rl.readline("Gemini API key: ")?
                }
            };
            if key.trim().is_empty() {
                print_inline_error("No API key entered");
                return Ok(());
            }
            credentials::store_api_key(&key)?;
            println!("{}", "API key stored in the system keyring".green());
        }
        AuthCommand::Logout => {
            credentials::clear_api_key()?;
            println!("Removed the stored API key");
        }
        AuthCommand::Status => {
            let gemini = &app.config.provider.gemini;
            let keyring_has_key = gemini.use_keyring && credentials::stored_api_key().is_some();
            match key_source(gemini, keyring_has_key) {
                // Env values are copied into the config on load, so check env first
                Some(KeySource::Env(var)) => println!("API key from environment ({})", var),
                Some(KeySource::Config) => println!("API key from configuration file"),
                Some(KeySource::Keyring) => println!("API key from system keyring"),
                None => println!("{}", "API Key is not configured.".yellow()),
            }
            println!("Text model:   {}", gemini.text_model);
            println!("Vision model: {}", gemini.vision_model);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::preferences::Theme;
    use crate::storage::MemoryStore;
    use serial_test::serial;
    use std::sync::Arc;

    fn app() -> App {
        App::with_store(Config::default(), Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_toggle_theme_and_gender() {
        let app = app();
        toggle_theme(&app).unwrap();
        assert_eq!(app.preferences.theme(), Theme::Light);

        handle_gender(&app, Some("girls".into())).unwrap();
        assert_eq!(app.preferences.gender_mode(), GenderMode::Girls);

        handle_gender(&app, Some("robots".into())).unwrap();
        assert_eq!(app.preferences.gender_mode(), GenderMode::Girls);
    }

    #[test]
    #[serial]
    fn test_key_source_order() {
        for var in API_KEY_ENV_VARS {
            std::env::remove_var(var);
        }
        let mut config = GeminiConfig::default();
        assert_eq!(key_source(&config, false), None);
        assert_eq!(key_source(&config, true), Some(KeySource::Keyring));

        config.use_keyring = false;
        assert_eq!(key_source(&config, true), None);
        config.use_keyring = true;

        config.api_key = Some("from-file".into());
        assert_eq!(key_source(&config, true), Some(KeySource::Config));

        std::env::set_var("API_KEY", "from-env");
        assert_eq!(key_source(&config, true), Some(KeySource::Env("API_KEY")));
        std::env::remove_var("API_KEY");
    }
}
