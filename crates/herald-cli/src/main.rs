//! Herald - in-process event bus demo

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use herald_cli::{new_order_payload, order_bus, Cli, Commands, ConfigCommands};
use herald_config::{load_config, HeraldConfig};
use herald_events::Payload;
use herald_telemetry::init_subscriber;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };

    init_subscriber(&config.telemetry);

    let result = match &cli.command {
        None | Some(Commands::Run) => {
            run_publish(&cli, &config, &config.demo.event_key, new_order_payload()).await
        }
        Some(Commands::Publish { key, payload }) => match payload {
            Some(raw) => match Payload::from_json_str(raw) {
                Ok(payload) => run_publish(&cli, &config, key, payload).await,
                Err(e) => Err(e.into()),
            },
            None => run_publish(&cli, &config, key, new_order_payload()).await,
        },
        Some(Commands::Config { command }) => run_config(command, &config),
    };

    if let Err(e) = result {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run_publish(cli: &Cli, config: &HeraldConfig, key: &str, payload: Payload) -> Result<()> {
    let bus = order_bus(&config.demo);

    let subscribers = bus.subscriber_count(key);
    if subscribers == 0 {
        println!("{} {}", "No subscribers registered for".dimmed(), key.yellow());
        bus.publish_event(key, payload);
        return Ok(());
    }

    println!(
        "{} {} to {} subscribers: {}",
        "Publishing".cyan().bold(),
        key.yellow(),
        subscribers,
        serde_json::to_string(&payload)?.dimmed()
    );
    bus.publish_event(key, payload);

    // The bus gives no completion signal, so wait long enough for the
    // slowest handler.
    let settle = cli
        .settle
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.demo.settle());
    tracing::debug!(settle_secs = settle.as_secs(), "waiting for handlers");
    tokio::time::sleep(settle).await;

    Ok(())
}

fn run_config(command: &ConfigCommands, config: &HeraldConfig) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}
