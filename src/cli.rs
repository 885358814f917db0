//! Command-line interface definition for FitBot
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// FitBot - workout schedule, calorie and hydration tracker with an AI coach
#[derive(Parser, Debug, Clone)]
#[command(name = "fitbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Directory of the local key-value store
    #[arg(long, env = "FITBOT_STORAGE_PATH")]
    pub storage_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for FitBot
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the weekly workout schedule
    Schedule {
        /// Only show today's plan
        #[arg(short, long)]
        today: bool,
    },

    /// Browse the exercise library
    Exercises {
        /// Case-insensitive name search
        #[arg(short, long, default_value = "")]
        search: String,

        /// Difficulty filter (all, beginner, intermediate, advanced)
        #[arg(short, long, default_value = "all")]
        difficulty: String,

        /// Show full details for one exercise
        #[arg(long)]
        id: Option<u32>,
    },

    /// Toggle an exercise as completed
    Complete {
        /// Exercise id
        id: u32,
    },

    /// Manage today's food log
    Food {
        #[command(subcommand)]
        command: FoodCommand,
    },

    /// Log water intake in ml (negative values subtract)
    Water {
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },

    /// Set daily goals
    Goal {
        #[command(subcommand)]
        command: GoalCommand,
    },

    /// Configure hydration reminders
    Reminders {
        #[command(subcommand)]
        command: ReminderCommand,
    },

    /// Analyze a meal photo and log the identified foods
    Scan {
        /// Image file standing in for the camera
        image: PathBuf,

        /// Print what would be logged without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Start an interactive chat with the AI assistant
    Chat,

    /// Ask the AI assistant a single question
    Ask {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },

    /// Show today's calorie and hydration progress
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle between light and dark theme
    Theme,

    /// Show or set the exercise media variant (boys, girls)
    Gender { mode: Option<String> },

    /// Show a motivational quote
    Quote {
        /// Keep rotating quotes until interrupted
        #[arg(short, long)]
        watch: bool,
    },

    /// Manage the stored Gemini API key
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

/// Food log subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum FoodCommand {
    /// Add a food item
    Add {
        name: String,
        #[arg(allow_hyphen_values = true)]
        calories: i64,
    },

    /// Remove a food item by id
    Remove { id: i64 },

    /// List logged food items
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Clear every item logged today
    Clear,
}

/// Goal subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum GoalCommand {
    /// Daily calorie goal in kcal
    Calories {
        #[arg(allow_hyphen_values = true)]
        value: i64,
    },

    /// Daily hydration goal in ml
    Hydration {
        #[arg(allow_hyphen_values = true)]
        value: i64,
    },
}

/// Reminder subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ReminderCommand {
    /// Enable reminders, asking for permission if needed
    On,

    /// Disable reminders
    Off,

    /// Set minutes between reminders
    Frequency { minutes: u32 },

    /// Run the reminder loop in the foreground until interrupted
    Run,
}

/// API key subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Store an API key in the system keyring
    Login {
        /// Key to store; prompted for when omitted
        key: Option<String>,
    },

    /// Remove the stored API key
    Logout,

    /// Report where the API key comes from
    Status,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            storage_path: None,
            verbose: false,
            json_logs: false,
            command: Commands::Status { json: false },
        }
    }
}
