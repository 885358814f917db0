//! Hydration reminder commands

use super::print_inline_error;
use crate::app::App;
use crate::cli::ReminderCommand;
use crate::error::Result;
use crate::reminder::{
    ConsoleNotifier, HydrationReminder, NotificationSink, Permission, SettingsRefresh,
};
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Dispatch a `reminders` subcommand
///
/// Takes the context by value so `run` can release the store while it waits.
pub async fn handle_reminders(app: App, command: ReminderCommand) -> Result<()> {
    match command {
        ReminderCommand::On => {
            let notifier = app.notifier();
            if app.tracker.enable_reminders(&notifier).await {
                println!(
                    "Hydration reminders on, every {} minutes",
                    app.tracker.reminder_frequency()
                );
            } else {
                print_inline_error(&format!(
                    "Notification permission is {}; reminders stay off",
                    notifier.permission()
                ));
            }
            Ok(())
        }
        ReminderCommand::Off => {
            app.tracker.disable_reminders();
            println!("Hydration reminders off");
            Ok(())
        }
        ReminderCommand::Frequency { minutes } => {
            if let Err(e) = app.tracker.set_reminder_frequency(minutes) {
                print_inline_error(&e.to_string());
            } else {
                println!("Reminders every {} minutes", minutes);
            }
            Ok(())
        }
        ReminderCommand::Run => run_reminders(app).await,
    }
}

/// Run the reminder timer in the foreground until Ctrl-C
///
/// The store is closed once the settings are read; water logged from
/// another terminal reaches the timer through a periodic re-read.
async fn run_reminders(app: App) -> Result<()> {
    let notifier = app.notifier();
    let settings = app.tracker.reminder_settings();

    if !settings.enabled {
        println!("Reminders are off. Enable them with `fitbot reminders on`.");
        return Ok(());
    }
    if notifier.permission() != Permission::Granted {
        print_inline_error("Notification permission has not been granted");
        return Ok(());
    }
    if !settings.goal_unmet() {
        println!("{}", "Hydration goal already reached for today.".green());
        return Ok(());
    }

    let location = app.store_location();
    let defaults = app.config.tracker.clone();
    let every = Duration::from_secs(app.config.storage.refresh_seconds);
    drop(notifier);
    drop(app);

    println!(
        "Reminding every {} minutes until the {} ml goal is met. Press Ctrl-C to stop.",
        settings.frequency_minutes, settings.goal
    );
    let (tx, rx) = watch::channel(settings);
    let sink = Arc::new(ConsoleNotifier::fixed(Permission::Granted));
    let reminder = HydrationReminder::spawn(rx, sink);
    let refresh = SettingsRefresh::spawn(location, defaults, every, tx);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Stopping hydration reminders");
    refresh.shutdown().await;
    reminder.shutdown().await;
    Ok(())
}
