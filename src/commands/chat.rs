//! Assistant chat commands
//!
//! `chat` runs a readline loop over one [`ChatSession`]; `ask` sends a
//! single question and prints the reply. The chat loop does not keep the
//! store open; `/status` reopens it on demand.

use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use super::{print_inline_error, tracking};
use crate::app::App;
use crate::assistant::{ChatMessage, ChatSession, Role};
use crate::error::Result;
use crate::gateway::AiGateway;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = "you> ";

const NO_KEY_NOTICE: &str =
    "No API key configured. Run `fitbot auth login` or set GEMINI_API_KEY.";

/// Warning shown once at chat start when the gateway has no provider
fn missing_key_notice(gateway: &AiGateway) -> Option<&'static str> {
    (!gateway.is_configured()).then_some(NO_KEY_NOTICE)
}

/// Start the interactive assistant
pub async fn run_chat(app: App) -> Result<()> {
    tracing::info!("Starting assistant chat");
    let gateway = app.gateway();
    let config = app.config.clone();
    let location = app.store_location();
    drop(app);

    let notice = missing_key_notice(&gateway);
    let session = ChatSession::new(gateway);
    let mut rl = DefaultEditor::new()?;

    for message in session.messages() {
        print_message(&message);
    }
    if let Some(notice) = notice {
        print_inline_error(notice);
    }
    println!("{}", "Type /help for commands, exit to leave.".dimmed());

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_special_command(trimmed) {
                    Ok(SpecialCommand::Help) => {
                        print_help();
                        continue;
                    }
                    Ok(SpecialCommand::History) => {
                        for message in session.messages() {
                            print_message(&message);
                        }
                        continue;
                    }
                    Ok(SpecialCommand::Status) => {
                        match App::reopen(config.clone(), &location) {
                            Ok(app) => tracking::show_status(&app, false)?,
                            Err(e) => print_inline_error(&e.to_string()),
                        }
                        continue;
                    }
                    Ok(SpecialCommand::Exit) => break,
                    Ok(SpecialCommand::None) => {}
                    Err(e) => {
                        print_inline_error(&e.to_string());
                        continue;
                    }
                }

                rl.add_history_entry(trimmed)?;
                println!("{}", "FitBot is thinking...".dimmed());
                if let Some(reply) = session.send(trimmed).await {
                    print_message(&ChatMessage::model(reply));
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    tracing::debug!(messages = session.messages().len(), "Chat session ended");
    Ok(())
}

/// Ask one question
pub async fn ask(app: &App, prompt: &[String]) -> Result<()> {
    let question = prompt.join(" ");
    let session = ChatSession::new(app.gateway());
    match session.send(&question).await {
        Some(reply) => println!("{}", reply),
        None => print_inline_error("Nothing to ask"),
    }
    Ok(())
}

fn print_message(message: &ChatMessage) {
    match message.role {
        Role::User => println!("{} {}", "you>".bold(), message.text),
        Role::Model => println!("{} {}\n", "fitbot>".cyan().bold(), message.text),
    }
}
