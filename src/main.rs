//! Command-line driver for building off-road route legs from OSM edges.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use offroad_core::AttributeFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::PipelineConfig;

#[derive(Debug, Parser)]
#[command(name = "offroad-legs", version, about)]
struct Cli {
    /// Pipeline configuration (TOML)
    #[arg(short, long, default_value = "offroad.toml", global = true)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Concatenate county exports into the working collection
    MergeCounties,
    /// Drop edges that fail the legal-access filter
    Filter {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        /// Also check motor_vehicle
        #[arg(long)]
        motor_vehicle: bool,
        /// Also require an off-road surface
        #[arg(long)]
        surface: bool,
    },
    /// Write the raw selected edges of legs
    Select {
        /// Leg names; all legs when omitted
        legs: Vec<String>,
    },
    /// Merge and measure legs
    Legs {
        /// Leg names; all legs when omitted
        legs: Vec<String>,
    },
    /// Keep named waypoints inside the route area
    Waypoints,
    /// Run every configured step
    Run,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let load = || PipelineConfig::from_file(&cli.config);

    match cli.command {
        Command::MergeCounties => commands::merge_counties(&load()?),
        Command::Filter {
            input,
            output,
            motor_vehicle,
            surface,
        } => {
            let filter = AttributeFilter {
                access: true,
                motor_vehicle,
                surface,
            };
            let input = match input {
                Some(input) => input,
                None => load()?.input,
            };
            commands::filter_edges(&input, &output, filter)
        }
        Command::Select { legs } => commands::select_legs(&load()?, &legs),
        Command::Legs { legs } => commands::assemble_legs(&load()?, &legs),
        Command::Waypoints => commands::clean_waypoints(&load()?),
        Command::Run => commands::run_all(&load()?),
    }
}
