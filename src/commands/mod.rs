/*!
Command handlers for the CLI

Each handler takes the loaded [`App`](crate::app::App) context and prints its
result. Handlers never treat a domain failure (missing key, camera denial,
failed analysis) as fatal; they report it and return `Ok`.

- `tracking`  : food log, water, goals, status
- `workouts`  : schedule, exercise library, completion, quotes
- `reminders` : hydration reminder settings and the foreground loop
- `scan`      : meal photo analysis
- `chat`      : assistant REPL and one-shot questions
- `settings`  : theme, gender mode, API key
*/

pub mod chat;
pub mod reminders;
pub mod scan;
pub mod settings;
pub mod special_commands;
pub mod tracking;
pub mod workouts;

use colored::Colorize;

/// Render a percentage as a fixed-width bar
pub(crate) fn progress_bar(percentage: f64, width: usize) -> String {
    let clamped = percentage.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    )
}

/// Print an inline error message without failing the command
pub(crate) fn print_inline_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0.0, 10), "[----------]");
        assert_eq!(progress_bar(50.0, 10), "[#####-----]");
        assert_eq!(progress_bar(250.0, 4), "[####]");
        assert_eq!(progress_bar(-5.0, 4), "[----]");
    }
}
