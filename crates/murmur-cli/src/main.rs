//! Murmur - reply and forward composer shell
//!
//! Reads commands from stdin and sends through the configured backend.

mod config;
mod history;
mod shell;

use config::AppConfig;
use murmur_bridge::{DryRunBridge, HttpBridge};
use murmur_core::{Composer, Decorator, MessageSender};
use shell::{notification, parse_command, Command, Shell};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout belongs to the shell
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("murmur=debug".parse()?))
        .init();

    info!("Starting Murmur");

    let config = AppConfig::load()?;
    let sender: Arc<dyn MessageSender> = match &config.bridge {
        Some(bridge) => {
            let bridge = HttpBridge::new(bridge)?;
            info!("Sending through {}", bridge.endpoint());
            Arc::new(bridge)
        }
        None => {
            warn!("No backend configured, messages will only be logged");
            Arc::new(DryRunBridge)
        }
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let composer = Composer::new(sender, &config.composer, event_tx);
    let mut shell = Shell::new(composer, config.roster.clone(), Decorator::new(&config.composer));

    let notifier = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Some(text) = notification(&event) {
                println!("{}", text);
            }
        }
    });

    println!(
        "Signed in as {}. Type /help for commands.",
        config.roster.self_name
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match shell.execute(command).await {
            Ok(output) => {
                for text in output {
                    println!("{}", text);
                }
            }
            Err(e) => println!("Error: {}", e),
        }
    }

    if shell.composer().reply_indicator().is_some() {
        warn!("Discarding pending reply");
    }
    info!("Session ended after {} messages", shell.history().len());

    // Dropping the shell closes the event channel and ends the notifier
    drop(shell);
    let _ = notifier.await;

    info!("Murmur stopped");
    Ok(())
}
