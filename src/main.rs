//! FitBot - fitness and nutrition tracker CLI
//!
#![doc = "Main entry point for the FitBot application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fitbot::app::App;
use fitbot::cli::{Cli, Commands};
use fitbot::commands;
use fitbot::config::Config;
use fitbot::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    telemetry::init_metrics_exporter();

    let app = App::open(config)?;

    // Execute command
    match cli.command {
        Commands::Schedule { today } => commands::workouts::show_schedule(&app, today),
        Commands::Exercises {
            search,
            difficulty,
            id,
        } => commands::workouts::list_exercises(&app, &search, &difficulty, id),
        Commands::Complete { id } => commands::workouts::toggle_complete(&app, id),
        Commands::Food { command } => commands::tracking::handle_food(&app, command),
        Commands::Water { amount } => commands::tracking::handle_water(&app, amount),
        Commands::Goal { command } => commands::tracking::handle_goal(&app, command),
        Commands::Reminders { command } => {
            commands::reminders::handle_reminders(app, command).await
        }
        Commands::Scan { image, dry_run } => {
            tracing::info!("Scanning meal photo {}", image.display());
            commands::scan::handle_scan(&app, image, dry_run).await
        }
        Commands::Chat => commands::chat::run_chat(app).await,
        Commands::Ask { prompt } => commands::chat::ask(&app, &prompt).await,
        Commands::Status { json } => commands::tracking::show_status(&app, json),
        Commands::Theme => commands::settings::toggle_theme(&app),
        Commands::Gender { mode } => commands::settings::handle_gender(&app, mode),
        Commands::Quote { watch } => commands::workouts::show_quote(app, watch).await,
        Commands::Auth { command } => commands::settings::handle_auth(&app, command),
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(verbose: bool, json: bool) {
    let default_directive = if verbose { "fitbot=debug" } else { "fitbot=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
