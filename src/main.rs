use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod commands;
mod config;
mod controller;
mod engine;
mod event_loop;
mod loader;
mod scene_graph;
mod scene_host;
mod showroom;

fn main() -> Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = cli::Cli::parse().into_config();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    runtime.block_on(event_loop::run(config))?;

    Ok(())
}
