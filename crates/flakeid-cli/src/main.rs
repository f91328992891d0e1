mod config;
mod telemetry;

use anyhow::Context;
use clap::Parser;
use config::{CliArgs, CliConfig};
use flakeid::{IdGenerator, IdParts, SystemClock};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;

    let generator = IdGenerator::from_components(
        config.worker_id,
        config.datacenter_id,
        config.layout,
        config.epoch,
        SystemClock,
    )
    .context("failed to create id generator")?;

    if let Some(id) = config.decode {
        return print_parts(&generator.decode(id), config.json);
    }

    tracing::info!(
        worker_id = generator.worker_id(),
        datacenter_id = generator.datacenter_id(),
        epoch_ms = config.epoch.as_millis() as u64,
        count = config.count,
        "generating ids"
    );

    for i in 0..config.count {
        let id = generator
            .next_id()
            .with_context(|| format!("failed to generate id {i}"))?;
        println!("{i} id: {id}");
    }
    println!("id count: {}", generator.ids_generated());

    Ok(())
}

fn print_parts(parts: &IdParts, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(parts)?);
    } else {
        println!("timestamp: {}", parts.timestamp);
        println!("datacenter_id: {}", parts.datacenter_id);
        println!("worker_id: {}", parts.worker_id);
        println!("sequence: {}", parts.sequence);
    }
    Ok(())
}
