//! Schedule, exercise library, completion and quote commands

use super::print_inline_error;
use crate::app::App;
use crate::catalog::{DayPlan, DifficultyFilter, Exercise, Quote};
use crate::error::Result;
use crate::preferences::GenderMode;
use crate::quotes::QuoteRotator;
use colored::Colorize;
use prettytable::{row, Table};
use std::time::Duration;

/// Print the week, or only today's plan
pub fn show_schedule(app: &App, today_only: bool) -> Result<()> {
    if today_only {
        match app.catalog.today() {
            Some(plan) => print_day(app, plan),
            None => println!("No plan for today."),
        }
        return Ok(());
    }

    for plan in app.catalog.weekly_schedule() {
        print_day(app, plan);
    }
    Ok(())
}

fn print_day(app: &App, plan: &DayPlan) {
    let heading = format!("{} - {}", plan.day_name(), plan.focus);
    println!("{}", heading.bold());
    if plan.rest_day {
        println!("  Rest day");
        println!();
        return;
    }
    for exercise in app.catalog.exercises_for(plan) {
        let marker = if app.completion.is_completed(exercise.id) {
            "[x]".green()
        } else {
            "[ ]".normal()
        };
        println!(
            "  {} {:>2}. {} ({} x {})",
            marker, exercise.id, exercise.name, exercise.sets, exercise.reps
        );
    }
    println!();
}

/// Search and filter the exercise library, or show one exercise in full
pub fn list_exercises(app: &App, search: &str, difficulty: &str, id: Option<u32>) -> Result<()> {
    if let Some(id) = id {
        match app.catalog.exercise(id) {
            Some(exercise) => print_exercise(app, exercise),
            None => print_inline_error(&format!("No exercise with id {}", id)),
        }
        return Ok(());
    }

    let filter: DifficultyFilter = difficulty.parse()?;
    let exercises = app.catalog.filter(search, filter);
    if exercises.is_empty() {
        println!("No exercises match.");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row!["ID", "Exercise", "Sets x Reps", "Difficulty", "Done"]);
    for exercise in exercises {
        let done = if app.completion.is_completed(exercise.id) {
            "Yes"
        } else {
            ""
        };
        table.add_row(row![
            exercise.id,
            exercise.name,
            format!("{} x {}", exercise.sets, exercise.reps),
            exercise.difficulty,
            done
        ]);
    }
    table.printstd();
    Ok(())
}

fn print_exercise(app: &App, exercise: &Exercise) {
    let gender: GenderMode = app.preferences.gender_mode();
    let media = exercise.media(gender);

    println!("{} ({})", exercise.name.bold(), exercise.difficulty);
    println!("{}", exercise.description);
    println!("Sets x Reps: {} x {}", exercise.sets, exercise.reps);
    println!("Muscles:     {}", exercise.muscle_groups.join(", "));
    println!("Equipment:   {}", exercise.equipment);
    if !exercise.form_tips.is_empty() {
        println!("Form tips:");
        for tip in &exercise.form_tips {
            println!("  - {}", tip);
        }
    }
    println!("Image:       {}", media.image_url);
    println!("Video:       {}", media.video_url);
    if app.completion.is_completed(exercise.id) {
        println!("{}", "Completed".green());
    }
}

/// Toggle completion of an exercise
pub fn toggle_complete(app: &App, id: u32) -> Result<()> {
    let Some(exercise) = app.catalog.exercise(id) else {
        print_inline_error(&format!("No exercise with id {}", id));
        return Ok(());
    };

    if app.completion.toggle(id) {
        println!("Marked {} complete", exercise.name.bold());
    } else {
        println!("Marked {} not complete", exercise.name.bold());
    }
    Ok(())
}

fn print_quote(quote: Option<&Quote>) {
    match quote {
        Some(quote) => println!("\"{}\" - {}", quote.text.italic(), quote.author),
        None => println!("No quotes available."),
    }
}

/// Print a quote; with `watch`, keep rotating until Ctrl-C
pub async fn show_quote(app: App, watch: bool) -> Result<()> {
    let rotator = QuoteRotator::new(app.catalog.quotes().to_vec());
    let period = Duration::from_secs(app.config.quotes.rotation_seconds);
    drop(app);

    print_quote(rotator.current());
    if !watch {
        return Ok(());
    }

    let mut changes = rotator.subscribe();
    let rotation = rotator.spawn(period);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                print_quote(rotator.current());
            }
        }
    }

    rotation.shutdown().await;
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
    fn test_toggle_complete_known_and_unknown() {
        let app = app();
        toggle_complete(&app, 1).unwrap();
        assert!(app.completion.is_completed(1));

        toggle_complete(&app, 9999).unwrap();
        assert!(!app.completion.is_completed(9999));
    }

    #[test]
    fn test_list_exercises_rejects_unknown_difficulty() {
        let app = app();
        assert!(list_exercises(&app, "", "expert", None).is_err());
        assert!(list_exercises(&app, "squat", "all", None).is_ok());
    }

    #[test]
    fn test_show_schedule() {
        let app = app();
        assert!(show_schedule(&app, false).is_ok());
        assert!(show_schedule(&app, true).is_ok());
    }

    #[tokio::test]
    async fn test_show_single_quote() {
        let app = app();
        assert!(show_quote(app, false).await.is_ok());
    }
}
