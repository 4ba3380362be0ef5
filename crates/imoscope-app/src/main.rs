use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;

use imoscope_api::AnalysisClient;
use imoscope_chat::ConversationController;
use imoscope_export::export_session;
use imoscope_types::{Role, APP_NAME};

mod cli;
mod repl;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let backend = Arc::new(AnalysisClient::new(&cli.api_url));
    let mut controller = ConversationController::new(backend);

    if let Some(path) = &cli.image {
        if !controller.attach_image(path).await {
            let error = controller
                .session()
                .error()
                .unwrap_or("could not attach image")
                .to_string();
            bail!(error);
        }
    }

    // One-shot task mode: single analysis, print the answer, exit.
    if let Some(prompt) = &cli.prompt {
        return run_task_mode(&mut controller, prompt, &cli).await;
    }

    repl::run(&mut controller, &cli.export_dir).await
}

async fn run_task_mode(
    controller: &mut ConversationController,
    prompt: &str,
    cli: &Cli,
) -> Result<()> {
    controller.set_draft(prompt);
    controller.submit_initial().await;

    if let Some(error) = controller.session().error() {
        bail!("{}", error);
    }

    let answer = controller
        .session()
        .messages()
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .context("analysis returned no answer")?;
    println!("{} {}", format!("{}:", APP_NAME).green().bold(), answer.text);

    if cli.export {
        let session = controller.session();
        let doc = export_session(session.messages(), session.image().cloned(), &cli.export_dir)
            .await
            .context("export failed")?;
        println!("{} {}", "Exported".green(), doc.path.display());
    }
    Ok(())
}
