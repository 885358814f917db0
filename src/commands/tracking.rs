//! Food log, water, goal and status commands

use super::{print_inline_error, progress_bar};
use crate::app::App;
use crate::cli::{FoodCommand, GoalCommand};
use crate::error::{FitbotError, Result};
use crate::tracker::{FoodItem, Tracker};
use colored::Colorize;
use prettytable::{row, Table};

const BAR_WIDTH: usize = 30;

/// Dispatch a `food` subcommand
pub fn handle_food(app: &App, command: FoodCommand) -> Result<()> {
    match command {
        FoodCommand::Add { name, calories } => {
            match app.tracker.add_item(&name, calories) {
                Some(item) => {
                    println!(
                        "Logged {} ({} kcal) as #{}",
                        item.name.bold(),
                        item.calories,
                        item.id
                    );
                    announce_celebration(&app.tracker);
                }
                None => print_inline_error("Food needs a name and a positive calorie count"),
            }
            Ok(())
        }
        FoodCommand::Remove { id } => {
            if app.tracker.remove_item(id) {
                println!("Removed item #{}", id);
            } else {
                print_inline_error(&format!("No food item with id {}", id));
            }
            Ok(())
        }
        FoodCommand::List { json } => list_food(&app.tracker, json),
        FoodCommand::Clear => {
            app.tracker.clear_day();
            println!("Cleared today's food log and water intake");
            Ok(())
        }
    }
}

fn list_food(tracker: &Tracker, json: bool) -> Result<()> {
    let items = tracker.items();
    if json {
        let output = serde_json::to_string_pretty(&items).map_err(FitbotError::Serialization)?;
        println!("{}", output);
        return Ok(());
    }

    if items.is_empty() {
        println!("No food logged today.");
        return Ok(());
    }
    print_food_table(&items);
    println!(
        "Total: {} / {} kcal",
        tracker.total_calories(),
        tracker.calorie_goal()
    );
    Ok(())
}

fn print_food_table(items: &[FoodItem]) {
    let mut table = Table::new();
    table.add_row(row!["ID", "Food", "Calories"]);
    for item in items {
        table.add_row(row![item.id, item.name, format!("{} kcal", item.calories)]);
    }
    table.printstd();
}

/// Print the goal-reached banner if the last change crossed the calorie goal
pub(crate) fn announce_celebration(tracker: &Tracker) {
    if tracker.celebration().is_active() {
        println!(
            "{}",
            "Goal reached! You hit your daily calorie goal.".green().bold()
        );
    }
}

/// Add or subtract water
pub fn handle_water(app: &App, amount: i64) -> Result<()> {
    let intake = app.tracker.add_water(amount);
    println!(
        "Water: {} / {} ml",
        intake,
        app.tracker.hydration_goal()
    );
    Ok(())
}

/// Dispatch a `goal` subcommand
pub fn handle_goal(app: &App, command: GoalCommand) -> Result<()> {
    match command {
        GoalCommand::Calories { value } => {
            let goal = app.tracker.set_calorie_goal(value);
            println!("Calorie goal set to {} kcal", goal);
        }
        GoalCommand::Hydration { value } => {
            let goal = app.tracker.set_hydration_goal(value);
            println!("Hydration goal set to {} ml", goal);
        }
    }
    Ok(())
}

/// Print today's progress
pub fn show_status(app: &App, json: bool) -> Result<()> {
    let summary = app.tracker.summary();
    if json {
        let output =
            serde_json::to_string_pretty(&summary).map_err(FitbotError::Serialization)?;
        println!("{}", output);
        return Ok(());
    }

    let calories_line = format!(
        "Calories  {} {:>5.1}%  {} / {} kcal",
        progress_bar(summary.calorie_progress, BAR_WIDTH),
        summary.calorie_progress,
        summary.total_calories,
        summary.calorie_goal
    );
    if summary.over_calorie_goal {
        println!("{}", calories_line.red());
    } else {
        println!("{}", calories_line);
    }

    println!(
        "Water     {} {:>5.1}%  {} / {} ml",
        progress_bar(summary.hydration_progress, BAR_WIDTH),
        summary.hydration_progress,
        summary.water_intake,
        summary.hydration_goal
    );

    let reminders = if summary.reminders_enabled {
        format!("on, every {} min", summary.reminder_frequency_minutes).green()
    } else {
        "off".dimmed()
    };
    println!("Reminders {}", reminders);
    println!("Items     {}", summary.items);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn app() -> App {
        App::with_store(Config::default(), Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_food_add_and_remove() {
        let app = app();
        handle_food(
            &app,
            FoodCommand::Add {
                name: "Eggs".into(),
                calories: 150,
            },
        )
        .unwrap();
        let id = app.tracker.items()[0].id;

        handle_food(&app, FoodCommand::Remove { id }).unwrap();
        assert!(app.tracker.items().is_empty());
    }

    #[test]
    fn test_invalid_food_is_not_an_error() {
        let app = app();
        let result = handle_food(
            &app,
            FoodCommand::Add {
                name: "  ".into(),
                calories: 100,
            },
        );
        assert!(result.is_ok());
        assert!(app.tracker.items().is_empty());
    }

    #[test]
    fn test_goal_and_water() {
        let app = app();
        handle_goal(&app, GoalCommand::Hydration { value: 3000 }).unwrap();
        handle_water(&app, 500).unwrap();
        handle_water(&app, -800).unwrap();

        assert_eq!(app.tracker.hydration_goal(), 3000);
        assert_eq!(app.tracker.water_intake(), 0);
        assert!(show_status(&app, true).is_ok());
    }
}
