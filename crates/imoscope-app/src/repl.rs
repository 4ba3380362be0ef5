use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use imoscope_chat::{ControllerState, ConversationController};
use imoscope_export::{export_session, ExportError};
use imoscope_types::{Role, APP_NAME};

const HELP: &str = "\
Commands:
  /image <path>   attach a PNG or JPEG image
  /new            start a new chat (asks for confirmation)
  /export [dir]   export the transcript as a PDF
  /help           show this help
  /quit           exit

Anything else is sent as a prompt about the attached image.";

/// Interactive chat loop. All session mutation goes through the controller;
/// this module only renders store state and routes user input.
pub async fn run(
    controller: &mut ConversationController,
    default_export_dir: &Path,
) -> Result<()> {
    println!(
        "{} {}",
        APP_NAME.bright_cyan().bold(),
        "- upload an image and ask a question about it.".bright_black()
    );
    println!("{}", "Type /help for commands.".bright_black());

    let mut rl = DefaultEditor::new()?;
    loop {
        let line = match rl.readline("imoscope> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(input);

        if let Some(rest) = input.strip_prefix('/') {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let command = parts.next().unwrap_or_default();
            let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());
            match command {
                "help" => println!("{}", HELP),
                "quit" | "exit" => break,
                "image" => attach(controller, arg).await,
                "new" => new_chat(controller, &mut rl)?,
                "export" => {
                    let dir = arg.map(PathBuf::from);
                    export(controller, dir.as_deref().unwrap_or(default_export_dir)).await;
                }
                other => {
                    eprintln!("{} Unknown command: /{}", "!".red(), other);
                }
            }
            continue;
        }

        submit(controller, input).await;
    }

    println!("{}", "Bye.".bright_black());
    Ok(())
}

async fn submit(controller: &mut ConversationController, prompt: &str) {
    controller.set_draft(prompt);
    match controller.state() {
        ControllerState::ActiveSession => {
            println!("{}", "Thinking...".bright_black());
            controller.submit_follow_up().await;
        }
        ControllerState::Idle => {
            println!("{}", "Analyzing image...".bright_black());
            controller.submit_initial().await;
        }
        // Unreachable in a sequential REPL; the controller rejects overlap
        // anyway.
        ControllerState::AwaitingInitialAnalysis | ControllerState::AwaitingFollowUp => return,
    }
    render_outcome(controller);
}

fn render_outcome(controller: &ConversationController) {
    let session = controller.session();
    if let Some(error) = session.error() {
        eprintln!("{} {}", "Error:".red().bold(), error.red());
        return;
    }
    if let Some(message) = session
        .messages()
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
    {
        println!("{} {}", format!("{}:", APP_NAME).green().bold(), message.text);
    }
}

async fn attach(controller: &mut ConversationController, arg: Option<&str>) {
    let Some(path) = arg else {
        eprintln!("{} Usage: /image <path>", "!".red());
        return;
    };
    if controller.attach_image(Path::new(path)).await {
        if let Some(image) = controller.session().image() {
            println!(
                "{} {} ({}, {:.1} KB)",
                "Attached".green(),
                image.file_name.cyan(),
                image.format.mime(),
                image.bytes.len() as f64 / 1024.0
            );
        }
    } else if let Some(error) = controller.session().error() {
        eprintln!("{} {}", "Error:".red().bold(), error.red());
    }
}

/// Confirmation gate for the reset. Declining leaves everything untouched,
/// including an in-flight request's eventual effect.
fn new_chat(controller: &mut ConversationController, rl: &mut DefaultEditor) -> Result<()> {
    let answer = match rl.readline("Start a new chat? The current conversation is discarded [y/N]: ")
    {
        Ok(answer) => answer,
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        controller.reset();
        println!("{}", "Started a new chat.".green());
    } else {
        println!("{}", "Keeping the current chat.".bright_black());
    }
    Ok(())
}

async fn export(controller: &ConversationController, out_dir: &Path) {
    let session = controller.session();
    match export_session(session.messages(), session.image().cloned(), out_dir).await {
        Ok(doc) => {
            println!(
                "{} {} ({} page{})",
                "Exported".green(),
                doc.path.display().to_string().cyan(),
                doc.pages,
                if doc.pages == 1 { "" } else { "s" }
            );
        }
        Err(ExportError::EmptyTranscript) => {
            println!("{} {}", "!".yellow(), ExportError::EmptyTranscript.to_string().yellow());
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e.to_string().red());
        }
    }
}
