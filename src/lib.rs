//! FitBot - fitness and nutrition tracker library
//!
//! This library provides the core of FitBot: a calorie and hydration tracker
//! with goal celebration and hydration reminders, a workout catalog and
//! schedule, and an AI assistant backed by Google Gemini for chat and meal
//! photo analysis.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: Key-value persistence with JSON helpers (sled on disk)
//! - `state`: Observable persisted cells built on `tokio::sync::watch`
//! - `tracker`: Food log, water intake, goals, calculators and celebration
//! - `reminder`: Hydration reminder timer and notification sinks
//! - `providers`: AI provider abstraction and the Gemini implementation
//! - `gateway`: Chat and food-image analysis on top of a provider
//! - `camera`: Meal photo capture pipeline
//! - `catalog`: Exercises, weekly schedule, quotes and completion tracking
//! - `preferences`, `quotes`, `assistant`: Theme, quote rotation, chat log
//! - `config`, `error`, `cli`, `commands`: Ambient plumbing and the CLI
//!
//! # Example
//!
//! ```no_run
//! use fitbot::{App, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let app = App::open(config)?;
//!     app.tracker.add_item("Eggs", 150);
//!     println!("{} kcal", app.tracker.total_calories());
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod assistant;
pub mod camera;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod preferences;
pub mod providers;
pub mod quotes;
pub mod reminder;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod tracker;

// Re-export commonly used types
pub use app::App;
pub use config::Config;
pub use error::{FitbotError, Result};
pub use gateway::AiGateway;
pub use tracker::{FoodItem, Tracker};

#[cfg(test)]
pub mod test_utils;
